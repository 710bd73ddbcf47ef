//! Closest-hit search over the scene's primitives.
//!
//! A linear scan with no acceleration structure: O(n) per ray.

use crate::{Material, Primitive, Ray};
use lumen_math::{Vec2, Vec3};

/// Record of a ray-primitive intersection.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    /// Point of intersection
    pub position: Vec3,
    /// Shading normal (outward-facing as stored on the primitive)
    pub normal: Vec3,
    /// Ray parameter where the intersection occurs (always > 0)
    pub t: f32,
    /// Euclidean distance from the ray origin
    pub distance: f32,
    /// The primitive that was hit
    pub primitive: &'a Primitive,
    /// Index of the primitive in the scene collection
    pub index: usize,
    /// Barycentric weights for triangles, `(1, 0, 0)` for spheres
    pub barycentric: Vec3,
    /// The ray that produced this hit
    pub ray: Ray,
}

impl<'a> Intersection<'a> {
    pub fn material(&self) -> &'a Material {
        self.primitive.material()
    }

    /// Texture coordinate of the hit, if the primitive has UVs.
    pub fn uv(&self) -> Option<Vec2> {
        self.primitive.uv_at(self.barycentric)
    }
}

/// Find the nearest primitive hit by `ray`.
///
/// `ignore` skips one primitive by index so secondary rays do not re-hit
/// the surface they start on.
pub fn closest_intersection<'a>(
    ray: &Ray,
    primitives: &'a [Primitive],
    ignore: Option<usize>,
) -> Option<Intersection<'a>> {
    closest_intersection_within(ray, primitives, ignore, f32::MAX)
}

/// Like [`closest_intersection`], but only accepts hits with `t < t_max`.
///
/// Every accepted candidate tightens the bound, so the scan order does
/// not change the result.
pub fn closest_intersection_within<'a>(
    ray: &Ray,
    primitives: &'a [Primitive],
    ignore: Option<usize>,
    t_max: f32,
) -> Option<Intersection<'a>> {
    let mut closest = t_max;
    let mut found: Option<(usize, f32, Vec3)> = None;

    for (index, primitive) in primitives.iter().enumerate() {
        if ignore == Some(index) {
            continue;
        }

        if let Some((t, weights)) = primitive.intersect(ray, closest) {
            closest = t;
            found = Some((index, t, weights));
        }
    }

    found.map(|(index, t, barycentric)| {
        let primitive = &primitives[index];
        let position = ray.at(t);
        Intersection {
            position,
            normal: primitive.normal_at(position, barycentric),
            t,
            distance: t * ray.direction().length(),
            primitive,
            index,
            barycentric,
            ray: *ray,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, Sphere, Triangle};

    fn spheres_along_z() -> Vec<Primitive> {
        vec![
            Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, Material::default()).into(),
            Sphere::new(Vec3::new(0.0, 0.0, 4.0), 1.0, Material::default()).into(),
            Sphere::new(Vec3::new(0.0, 0.0, 7.0), 1.0, Material::default()).into(),
        ]
    }

    #[test]
    fn test_closest_hit_wins_regardless_of_order() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let mut primitives = spheres_along_z();

        let hit = closest_intersection(&ray, &primitives, None).unwrap();
        assert_eq!(hit.index, 1);
        assert!((hit.t - 3.0).abs() < 1e-5);

        primitives.reverse();
        let hit = closest_intersection(&ray, &primitives, None).unwrap();
        assert_eq!(hit.index, 1);
        assert!((hit.t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_ignore_index_skips_one_primitive() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let primitives = spheres_along_z();

        let hit = closest_intersection(&ray, &primitives, Some(1)).unwrap();
        assert_eq!(hit.index, 2);
        assert!((hit.position.z - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_no_hit_returns_none() {
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(closest_intersection(&ray, &spheres_along_z(), None).is_none());
        assert!(closest_intersection(&ray, &[], None).is_none());
    }

    #[test]
    fn test_distance_is_euclidean() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0));
        let primitives = spheres_along_z();
        let hit = closest_intersection(&ray, &primitives, None).unwrap();
        assert!((hit.t - 1.5).abs() < 1e-5);
        assert!((hit.distance - 3.0).abs() < 1e-5);
        assert!(hit.distance > 0.0);
    }

    #[test]
    fn test_within_bound_excludes_far_hits() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let primitives = spheres_along_z();
        assert!(closest_intersection_within(&ray, &primitives, None, 3.0).is_none());
        assert!(closest_intersection_within(&ray, &primitives, None, 3.5).is_some());
    }

    #[test]
    fn test_mixed_primitives() {
        let primitives: Vec<Primitive> = vec![
            Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, Material::default()).into(),
            // Facing -Z, in front of the sphere
            Triangle::new(
                Vec3::new(-1.0, -1.0, 2.0),
                Vec3::new(1.0, -1.0, 2.0),
                Vec3::new(0.0, 1.0, 2.0),
                Material::default(),
            )
            .into(),
        ];

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let hit = closest_intersection(&ray, &primitives, None).unwrap();
        assert_eq!(hit.index, 1);
        assert!((hit.normal - -Vec3::Z).length() < 1e-6);
        assert!(matches!(hit.primitive, Primitive::Triangle(_)));
    }
}
