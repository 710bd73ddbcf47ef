use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use lumen_renderer::{ColorSpace, Frame, RenderConfig, RenderSession, Texture};

mod cli;
mod scene;

use cli::Args;
use scene::{cornell_box, default_camera, BlockMaps};

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.debug_level.into())
        .format_timestamp_millis()
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };
    args.apply(&mut config);

    info!(
        "Image resolution: {}x{}, {} threads, {}x{} samples per pixel",
        config.width, config.height, config.threads, config.sample, config.sample
    );

    let start = Instant::now();
    let maps = BlockMaps {
        texture: load_texture(args.texture.as_deref(), ColorSpace::Srgb)?,
        normal_map: load_texture(args.normal_map.as_deref(), ColorSpace::Linear)?,
    };
    let scene = cornell_box(&maps);
    let camera = default_camera(&config);
    info!("Loaded {} primitives in {:.2?}", scene.len(), start.elapsed());

    let session = RenderSession::new(&scene, &camera, config)
        .context("Invalid render configuration")?;

    let output = args.output.as_path();
    let mut last = Instant::now();
    let frame = session.run(&mut |frame: &Frame, pass: u32| {
        info!("Pass {} rendered in {:.2?}", pass, last.elapsed());
        last = Instant::now();

        if args.progressive {
            if let Err(err) = save_png(frame, output) {
                warn!("Failed to write progress image: {:#}", err);
            }
        }
        ControlFlow::Continue(())
    });

    save_png(&frame, output)?;
    info!("Saved {}", output.display());
    Ok(())
}

/// Read render settings from a JSON file; missing fields keep their defaults.
fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn load_texture(path: Option<&Path>, space: ColorSpace) -> Result<Option<Arc<Texture>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let texture = Texture::load(path, space)?;
    info!("Loaded {}x{} texture {}", texture.width, texture.height, path.display());
    Ok(Some(Arc::new(texture)))
}

/// Save a frame as an 8-bit gamma-corrected image; the format follows the
/// file extension.
fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_rgba8())
        .context("Frame size does not match its pixel data")?;
    image
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_file() {
        let dir = std::env::temp_dir().join(format!("lumen-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("render.json");
        std::fs::write(&path, r#"{ "width": 64, "threads": 4, "max_passes": 3 }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.threads, 4);
        assert_eq!(config.max_passes, Some(3));
        assert_eq!(config.height, RenderConfig::default().height);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let err = load_config(Path::new("/nonexistent/lumen.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_no_texture_path_loads_nothing() {
        assert!(load_texture(None, ColorSpace::Srgb).unwrap().is_none());
    }
}
