//! Bucket-based tile rendering.
//!
//! Divides the image into a square grid of tiles (buckets). Each bucket is
//! refined one pass at a time; every pass adds one stratified sample to
//! every pixel of the bucket.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{gen_f32, render_sample, Camera, RenderConfig, Scene, Tile};
use rand::{Rng, RngCore};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the grid (row-major)
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Split an image into a `ratio × ratio` grid of buckets, row-major.
///
/// Edges are placed at `i * size / ratio`, so neighbouring buckets share
/// their boundary exactly and the grid covers every pixel once, even when
/// the image size is not a multiple of `ratio`.
pub fn generate_bucket_grid(width: u32, height: u32, ratio: u32) -> Vec<Bucket> {
    let ratio = ratio.max(1);
    let edge = |i: u32, size: u32| (i as u64 * size as u64 / ratio as u64) as u32;

    (0..ratio * ratio)
        .map(|n| {
            let (row, col) = (n / ratio, n % ratio);
            let x = edge(col, width);
            let y = edge(row, height);
            Bucket::new(
                x,
                y,
                edge(col + 1, width) - x,
                edge(row + 1, height) - y,
                n as usize,
            )
        })
        .collect()
}

/// Occupancy of the `sample × sample` sub-pixel slots of a bucket.
///
/// Every pass takes one free slot at random; once all slots are used the
/// bucket has converged.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    sample: u32,
    used: Vec<bool>,
    free: usize,
}

impl SampleGrid {
    pub fn new(sample: u32) -> Self {
        let slots = (sample * sample) as usize;
        Self {
            sample,
            used: vec![false; slots],
            free: slots,
        }
    }

    pub fn remaining(&self) -> usize {
        self.free
    }

    /// Claim a slot chosen uniformly among the free ones.
    pub fn take(&mut self, rng: &mut dyn RngCore) -> Option<(u32, u32)> {
        if self.free == 0 {
            return None;
        }

        let nth = rng.gen_range(0..self.free);
        let slot = self
            .used
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .nth(nth)
            .map(|(slot, _)| slot)?;

        self.used[slot] = true;
        self.free -= 1;

        let slot = slot as u32;
        Some((slot % self.sample, slot / self.sample))
    }
}

/// Add one sample to every pixel of a bucket.
///
/// The sample lands in sub-pixel slot `slot` of the `sample × sample` grid,
/// jittered inside the slot. Pixels are visited row by row; the pass stops
/// early once `exit` is set. Returns false if the pass was interrupted.
pub fn render_bucket_pass(
    tile: &mut Tile,
    slot: (u32, u32),
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    exit: &AtomicBool,
) -> bool {
    let bucket = tile.bucket;
    let sample = config.sample.max(1) as f32;
    let (gx, gy) = (slot.0 as f32, slot.1 as f32);

    for y in bucket.y..bucket.y + bucket.height {
        if exit.load(Ordering::Relaxed) {
            return false;
        }

        for x in bucket.x..bucket.x + bucket.width {
            if exit.load(Ordering::Relaxed) {
                return false;
            }

            let px = x as f32 - 0.5 + (gx + gen_f32(rng)) / sample;
            let py = y as f32 - 0.5 + (gy + gen_f32(rng)) / sample;
            let color = render_sample(camera, scene, config, px, py, rng);
            tile.cell_mut(x, y).add(color);
        }
    }

    true
}
