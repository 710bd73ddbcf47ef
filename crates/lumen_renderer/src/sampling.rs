//! Random direction sampling.
//!
//! All mappings are closed form: each sample costs exactly two uniform
//! numbers, with no rejection loop.

use std::f32::consts::PI;

use lumen_math::{Basis, Vec3};
use rand::{Rng, RngCore};

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Direction uniformly distributed over the hemisphere around `normal`.
///
/// Uniform rather than cosine-weighted: simpler to reason about, but
/// noisier for Lambertian surfaces.
pub fn sample_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let cos_theta = gen_f32(rng);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);

    Basis::from_normal(normal).to_world(Vec3::new(
        sin_theta * phi.cos(),
        sin_theta * phi.sin(),
        cos_theta,
    ))
}

/// Unit direction jittered inside a cone around `axis`.
///
/// The tangent-plane offset is drawn uniformly from a disk of radius
/// `spread`; a spread of zero returns the axis itself without consuming
/// random numbers.
pub fn sample_cone(axis: Vec3, spread: f32, rng: &mut dyn RngCore) -> Vec3 {
    let axis = axis.normalize_or_zero();
    if spread <= 0.0 || axis == Vec3::ZERO {
        return axis;
    }

    let r = spread * gen_f32(rng).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);

    Basis::from_normal(axis)
        .to_world(Vec3::new(r * phi.cos(), r * phi.sin(), 1.0))
        .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hemisphere_samples_face_the_normal() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Vec3::new(0.2, -1.0, 0.4).normalize();

        for _ in 0..1000 {
            let d = sample_hemisphere(normal, &mut rng);
            assert!(d.dot(normal) >= 0.0);
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hemisphere_is_uniform_in_cosine() {
        // For a uniform hemisphere the mean of cos(theta) is 1/2
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let mean: f32 = (0..n)
            .map(|_| sample_hemisphere(Vec3::Y, &mut rng).y)
            .sum::<f32>()
            / n as f32;
        assert!((mean - 0.5).abs() < 0.02, "mean cos = {mean}");
    }

    #[test]
    fn test_zero_spread_cone_is_the_axis() {
        let mut rng = StdRng::seed_from_u64(3);
        let axis = Vec3::new(0.0, 3.0, 4.0);
        assert_eq!(sample_cone(axis, 0.0, &mut rng), axis.normalize());
    }

    #[test]
    fn test_cone_samples_stay_within_spread() {
        let mut rng = StdRng::seed_from_u64(5);
        let axis = Vec3::new(1.0, 1.0, 0.0).normalize();
        let spread = 0.2f32;
        let min_cos = 1.0 / (1.0 + spread * spread).sqrt();

        for _ in 0..1000 {
            let d = sample_cone(axis, spread, &mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert!(d.dot(axis) >= min_cos - 1e-5);
        }
    }
}
