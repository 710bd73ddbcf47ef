//! Sphere primitive for ray tracing.

use crate::{Material, Ray};
use lumen_math::Vec3;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Outward unit normal at a point on the surface.
    #[inline]
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize_or_zero()
    }

    /// Solve `a·t² + b·t + c = 0` for the ray parameter of the nearest hit.
    ///
    /// Prefers the smaller positive root. Returns None when there is no
    /// real root, when both roots are behind the origin, or when the hit is
    /// not strictly closer than `closest`.
    pub fn intersect(&self, ray: &Ray, closest: f32) -> Option<f32> {
        let d = ray.direction();
        let a = d.dot(d);
        if a == 0.0 {
            return None;
        }

        let s = ray.origin() - self.center;
        let b = 2.0 * s.dot(d);
        let c = s.dot(s) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let t = if discriminant == 0.0 {
            -b / (2.0 * a)
        } else {
            let sqrtd = discriminant.sqrt();
            let t1 = (-b - sqrtd) / (2.0 * a);
            let t2 = (-b + sqrtd) / (2.0 * a);
            if t1 > 0.0 {
                t1
            } else {
                t2
            }
        };

        if t <= 0.0 || t >= closest {
            return None;
        }

        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::ZERO, 1.0, Material::default())
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Material::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let t = sphere.intersect(&ray, f32::MAX).unwrap();
        assert!((t - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Material::default());

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.intersect(&ray, f32::MAX).is_none());
    }

    #[test]
    fn test_sphere_behind_origin_is_ignored() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(unit_sphere().intersect(&ray, f32::MAX).is_none());
    }

    #[test]
    fn test_inside_sphere_hits_far_side() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        let t = unit_sphere().intersect(&ray, f32::MAX).unwrap();
        // Direction is not normalized: the exit point is at t = 0.5
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_hit_must_be_closer_than_current() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let sphere = unit_sphere();
        assert!(sphere.intersect(&ray, 2.0).is_none());
        assert!(sphere.intersect(&ray, 2.5).is_some());
    }

    #[test]
    fn test_tangent_ray_single_root() {
        let ray = Ray::new(Vec3::new(-2.0, 1.0, 0.0), Vec3::X);
        let t = unit_sphere().intersect(&ray, f32::MAX).unwrap();
        assert!((t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_hit_iff_closest_approach_within_radius() {
        let sphere = unit_sphere();
        let mut rng = StdRng::seed_from_u64(42);
        let mut hits = 0;

        for _ in 0..5000 {
            let origin = Vec3::new(
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
            );
            if origin.length() < 1.05 {
                continue;
            }
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if direction.length() < 0.1 {
                continue;
            }

            // Closest approach of the ray (not the whole line) to the center
            let t_star = -origin.dot(direction) / direction.dot(direction);
            let approach = (origin + t_star * direction).length();
            if (approach - 1.0).abs() < 1e-3 {
                continue;
            }
            let expected = t_star > 0.0 && approach <= 1.0;

            let ray = Ray::new(origin, direction);
            let found = sphere.intersect(&ray, f32::MAX);
            assert_eq!(found.is_some(), expected, "origin {origin:?} dir {direction:?}");

            if let Some(t) = found {
                hits += 1;
                assert!(t > 0.0);
                assert!((ray.at(t).length() - 1.0).abs() < 1e-3);
            }
        }

        assert!(hits > 0);
    }

    #[test]
    fn test_normal_points_outward() {
        let sphere = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 2.0, Material::default());
        assert_eq!(sphere.normal_at(Vec3::new(3.0, 0.0, 0.0)), Vec3::X);
    }
}
