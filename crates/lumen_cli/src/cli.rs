use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_renderer::RenderConfig;

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments. Every render setting is optional and overrides
/// the value from `--config` (or the built-in default).
#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Bucket-parallel Monte Carlo ray tracer")]
pub struct Args {
    /// JSON file with render settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub debug_level: LogLevel,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Worker threads, one per bucket (must be a perfect square)
    #[arg(short, long)]
    pub threads: Option<u32>,

    /// Sub-pixel samples per axis
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum shading recursion depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Rays per bounce for indirect light and glossy lobes
    #[arg(long)]
    pub indirect_rays: Option<u32>,

    /// Area-light samples per axis
    #[arg(long)]
    pub light_samples: Option<u32>,

    /// Stop after this many passes
    #[arg(long)]
    pub max_passes: Option<u32>,

    /// Base random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Brighten glass with the +0.1 Fresnel floor
    #[arg(long)]
    pub legacy_fresnel: bool,

    /// Albedo texture for the tall block
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Tangent-space normal map for the tall block
    #[arg(long)]
    pub normal_map: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "lumen.png")]
    pub output: PathBuf,

    /// Rewrite the output file after every pass
    #[arg(long)]
    pub progressive: bool,
}

impl Args {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(samples) = self.samples {
            config.sample = samples;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(rays) = self.indirect_rays {
            config.indirect_rays = rays;
        }
        if let Some(samples) = self.light_samples {
            config.light_samples = samples;
        }
        if let Some(passes) = self.max_passes {
            config.max_passes = Some(passes);
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.legacy_fresnel {
            config.legacy_fresnel_floor = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_what_was_given() {
        let args = Args::parse_from(["lumen", "--width", "64", "-s", "4", "--legacy-fresnel"]);
        let mut config = RenderConfig::default();
        args.apply(&mut config);

        assert_eq!(config.width, 64);
        assert_eq!(config.sample, 4);
        assert!(config.legacy_fresnel_floor);
        assert_eq!(config.height, RenderConfig::default().height);
        assert_eq!(config.threads, RenderConfig::default().threads);
        assert_eq!(args.output, PathBuf::from("lumen.png"));
    }

    #[test]
    fn test_log_level_maps_to_filter() {
        let args = Args::parse_from(["lumen", "--debug-level", "trace"]);
        assert_eq!(LevelFilter::from(args.debug_level), LevelFilter::Trace);
    }
}
