//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::{RenderError, RenderResult};

/// Largest accepted `sample`; each worker keeps a `sample²` slot grid.
pub const MAX_SAMPLE: u32 = 1024;

/// Render configuration.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a handful of settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Worker threads; must be a perfect square (one thread per bucket)
    pub threads: u32,
    /// Sub-pixel samples per axis; a pixel converges after `sample²` passes
    pub sample: u32,
    /// Maximum recursion depth of the shading model
    pub max_depth: u32,
    /// Rays per bounce for diffuse indirect light and glossy cones
    pub indirect_rays: u32,
    /// Area-light samples per axis (soft shadow grid)
    pub light_samples: u32,
    /// Base seed; worker `i` uses `seed + i`
    pub seed: u64,
    /// Stop after this many full passes (None runs until converged)
    pub max_passes: Option<u32>,
    /// Add the historical +0.1 floor to the Fresnel reflectance
    pub legacy_fresnel_floor: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            threads: 36,
            sample: 32,
            max_depth: 10,
            indirect_rays: 1,
            light_samples: 2,
            seed: 0,
            max_passes: None,
            legacy_fresnel_floor: false,
        }
    }
}

impl RenderConfig {
    /// Number of buckets per image axis (`sqrt(threads)`).
    pub fn bucket_ratio(&self) -> u32 {
        integer_sqrt(self.threads)
    }

    /// Total number of sub-pixel passes before a bucket has converged.
    pub fn total_passes(&self) -> u32 {
        self.sample.saturating_mul(self.sample)
    }

    /// Check the configuration before starting a session.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }

        let ratio = self.bucket_ratio();
        if self.threads == 0 || ratio * ratio != self.threads {
            return Err(RenderError::ThreadCount(self.threads));
        }

        // Every bucket must own at least one pixel row and column
        if ratio > self.width || ratio > self.height {
            return Err(RenderError::BucketGrid {
                ratio,
                width: self.width,
                height: self.height,
            });
        }

        if self.sample == 0 {
            return Err(RenderError::InvalidSetting {
                name: "sample",
                reason: "at least one sample per axis is required".to_string(),
            });
        }

        if self.sample > MAX_SAMPLE {
            return Err(RenderError::InvalidSetting {
                name: "sample",
                reason: format!("at most {} samples per axis, got {}", MAX_SAMPLE, self.sample),
            });
        }

        if self.light_samples == 0 {
            return Err(RenderError::InvalidSetting {
                name: "light_samples",
                reason: "at least one light sample per axis is required".to_string(),
            });
        }

        if self.max_passes == Some(0) {
            return Err(RenderError::InvalidSetting {
                name: "max_passes",
                reason: "pass limit must be positive".to_string(),
            });
        }

        if self.indirect_rays == 0 {
            log::warn!("indirect_rays = 0 disables diffuse global illumination");
        }

        Ok(())
    }
}

fn integer_sqrt(n: u32) -> u32 {
    let n = n as u64;
    let mut root = (n as f64).sqrt() as u64;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root as u32
}
