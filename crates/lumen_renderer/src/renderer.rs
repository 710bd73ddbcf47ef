//! Core ray tracing entry points.
//!
//! Implements recursive Monte Carlo ray tracing with:
//! - Area-light soft shadows
//! - Glossy reflection and Fresnel-blended refraction
//! - Uniform hemisphere sampling for indirect light

use crate::{closest_intersection, shade, Camera, Color, Ray, RenderConfig, Scene};
use rand::RngCore;

/// Compute the color seen by a ray.
///
/// Rays that escape the scene are black; there is no sky or background.
pub fn trace(ray: &Ray, scene: &Scene, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
    match closest_intersection(ray, &scene.primitives, None) {
        Some(hit) => shade(&hit, scene, 0, config, rng),
        None => Color::ZERO,
    }
}

/// Trace one camera sample through the continuous screen position `(x, y)`.
pub fn render_sample(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    x: f32,
    y: f32,
    rng: &mut dyn RngCore,
) -> Color {
    let ray = camera.primary_ray(x, y);
    trace(&ray, scene, config, rng)
}
