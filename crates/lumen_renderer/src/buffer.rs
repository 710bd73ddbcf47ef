//! Accumulation buffer and resolved frames.
//!
//! Each bucket owns one [`Tile`] of running color sums behind its own
//! mutex. Workers only ever lock their own tile; the controller locks all
//! of them briefly when it resolves a frame.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{Bucket, Color};
use rayon::prelude::*;

/// Running sum of color samples for one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum: Color,
    pub count: u32,
}

impl Accumulator {
    /// Add one sample. Non-finite colors still count as a sample but add
    /// nothing to the sum, so a single bad ray cannot poison the pixel.
    #[inline]
    pub fn add(&mut self, color: Color) {
        if color.is_finite() {
            self.sum += color;
        }
        self.count += 1;
    }

    /// Mean color, or black when nothing has been accumulated.
    #[inline]
    pub fn average(&self) -> Color {
        if self.count == 0 {
            return Color::ZERO;
        }
        let mean = self.sum / self.count as f32;
        if mean.is_finite() {
            mean
        } else {
            Color::ZERO
        }
    }
}

/// The accumulators of one bucket, in row-major order.
#[derive(Debug, Clone)]
pub struct Tile {
    pub bucket: Bucket,
    pub cells: Vec<Accumulator>,
}

impl Tile {
    pub fn new(bucket: Bucket) -> Self {
        Self {
            bucket,
            cells: vec![Accumulator::default(); bucket.pixel_count() as usize],
        }
    }

    /// Accumulator for the image pixel `(x, y)`, which must lie inside the bucket.
    #[inline]
    pub fn cell_mut(&mut self, x: u32, y: u32) -> &mut Accumulator {
        let local = (y - self.bucket.y) * self.bucket.width + (x - self.bucket.x);
        &mut self.cells[local as usize]
    }

    pub fn cell(&self, x: u32, y: u32) -> &Accumulator {
        let local = (y - self.bucket.y) * self.bucket.width + (x - self.bucket.x);
        &self.cells[local as usize]
    }
}

/// Shared pixel accumulation for a whole image, split by bucket.
#[derive(Debug)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Mutex<Tile>>,
    /// Tile index for every pixel, row-major
    owner: Vec<u32>,
}

impl PixelBuffer {
    /// Allocate one tile per bucket. The buckets must partition the image.
    pub fn new(width: u32, height: u32, buckets: &[Bucket]) -> Self {
        let mut owner = vec![0; (width * height) as usize];
        for (index, bucket) in buckets.iter().enumerate() {
            for y in bucket.y..bucket.y + bucket.height {
                let row = (y * width) as usize;
                for x in bucket.x..bucket.x + bucket.width {
                    owner[row + x as usize] = index as u32;
                }
            }
        }

        Self {
            width,
            height,
            tiles: buckets.iter().map(|b| Mutex::new(Tile::new(*b))).collect(),
            owner,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Lock the tile of bucket `index`.
    ///
    /// A worker that panicked mid-pass leaves partial sums behind, which
    /// are still valid sums, so a poisoned lock is recovered.
    pub fn lock_tile(&self, index: usize) -> MutexGuard<'_, Tile> {
        self.tiles[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Average every pixel into a new frame.
    pub fn resolve(&self) -> Frame {
        let guards: Vec<MutexGuard<'_, Tile>> =
            (0..self.tiles.len()).map(|i| self.lock_tile(i)).collect();

        let width = self.width as usize;
        let mut pixels = vec![Color::ZERO; width * self.height as usize];

        pixels
            .par_chunks_mut(width.max(1))
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    let tile = &guards[self.owner[y * width + x] as usize];
                    *pixel = tile.cell(x as u32, y as u32).average();
                }
            });

        Frame {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// A resolved image of linear colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Frame {
    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Convert to gamma-encoded RGBA bytes (for display or saving).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let rgba: Vec<[u8; 4]> = self.pixels.par_iter().map(|c| color_to_rgba(*c)).collect();
        bytemuck::cast_slice(&rgba).to_vec()
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let channel = |v: f32| (255.0 * linear_to_gamma(v).clamp(0.0, 1.0)) as u8;
    [channel(color.x), channel(color.y), channel(color.z), 255]
}
