//! Square area light for soft shadows.

use std::f32::consts::PI;

use crate::{
    closest_intersection_within, gen_f32, Color, Intersection, Primitive, Ray, SURFACE_EPSILON,
};
use lumen_math::Vec3;
use rand::RngCore;

/// A square emitter lying in the XZ plane.
///
/// Direct lighting treats it as a grid of virtual point lights, one
/// jittered sample per cell.
#[derive(Debug, Clone)]
pub struct AreaLight {
    /// Center of the square
    pub position: Vec3,
    /// Emitted power per color channel
    pub color: Color,
    /// Side length of the square
    pub width: f32,
}

impl AreaLight {
    pub fn new(position: Vec3, color: Color, width: f32) -> Self {
        Self {
            position,
            color,
            width: width.max(0.0),
        }
    }

    /// A light of zero extent: every sample lands on `position`.
    pub fn point(position: Vec3, color: Color) -> Self {
        Self::new(position, color, 0.0)
    }

    /// Jittered point inside cell `(cell_x, cell_z)` of a `grid × grid`
    /// subdivision of the square.
    pub fn sample_point(&self, cell_x: u32, cell_z: u32, grid: u32, rng: &mut dyn RngCore) -> Vec3 {
        let cell = self.width / grid.max(1) as f32;
        let min_x = self.position.x - self.width / 2.0;
        let min_z = self.position.z - self.width / 2.0;

        Vec3::new(
            min_x + (cell_x as f32 + gen_f32(rng)) * cell,
            self.position.y,
            min_z + (cell_z as f32 + gen_f32(rng)) * cell,
        )
    }

    /// Irradiance at `point` with surface `normal` from a virtual point
    /// light at `light_point`: `color * max(0, cosθ) / (4π r²)`.
    pub fn irradiance(&self, point: Vec3, normal: Vec3, light_point: Vec3) -> Color {
        let to_light = light_point - point;
        let r2 = to_light.length_squared();
        if r2 == 0.0 {
            return Color::ZERO;
        }

        let cos_theta = to_light.normalize().dot(normal.normalize_or_zero()).max(0.0);
        self.color * cos_theta / (4.0 * PI * r2)
    }

    /// Direct light reaching a hit, averaged over a `samples × samples`
    /// grid of shadow rays.
    ///
    /// The shadow ray starts slightly above the surface and ignores the
    /// shading primitive; a cell counts as lit when nothing lies between
    /// the point and the sampled light position.
    pub fn direct_light(
        &self,
        hit: &Intersection,
        primitives: &[Primitive],
        samples: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let samples = samples.max(1);
        let origin = hit.position + hit.normal * SURFACE_EPSILON;
        let mut total = Color::ZERO;

        for cell_z in 0..samples {
            for cell_x in 0..samples {
                let light_point = self.sample_point(cell_x, cell_z, samples, rng);

                // The light sample sits at t = 1 along this ray
                let shadow_ray = Ray::new(origin, light_point - origin);
                let occluded =
                    closest_intersection_within(&shadow_ray, primitives, Some(hit.index), 1.0)
                        .is_some();

                if !occluded {
                    total += self.irradiance(hit.position, hit.normal, light_point);
                }
            }
        }

        total / (samples * samples) as f32
    }
}
