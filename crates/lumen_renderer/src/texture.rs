//! Read-only image sources for materials.
//!
//! Textures are loaded by the scene builder and shared with materials
//! through `Arc`; the renderer only samples them.

use std::path::Path;

use lumen_math::{Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {path} has no pixels")]
    Empty { path: String },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// How stored bytes map to linear values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color images (albedo)
    Srgb,
    /// Data images (normal maps)
    Linear,
}

/// A loaded texture with linear RGB pixels in row-major order.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Vec3>,
}

impl Texture {
    /// Create a texture from pixel data.
    ///
    /// Returns None when the pixel count does not match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width * height) as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A 1x1 texture of a single color.
    pub fn solid(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
        }
    }

    /// Load an image file.
    pub fn load(path: impl AsRef<Path>, space: ColorSpace) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let decode = |value: u8| match space {
            ColorSpace::Srgb => srgb_to_linear(value),
            ColorSpace::Linear => value as f32 / 255.0,
        };
        let pixels = rgb
            .pixels()
            .map(|p| Vec3::new(decode(p[0]), decode(p[1]), decode(p[2])))
            .collect();

        let texture = Self::new(width, height, pixels).ok_or_else(|| TextureError::Empty {
            path: path.display().to_string(),
        })?;

        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);
        Ok(texture)
    }

    /// Nearest-neighbour lookup with wrapping UVs.
    ///
    /// `(0, 0)` is the top-left texel.
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
