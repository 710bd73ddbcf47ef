//! Triangle primitive for ray tracing.
//!
//! Intersection solves the 3x3 system `[-d, e1, e2]·(t, u, v) = o - v0`
//! with Cramer's rule.

use crate::{Material, Ray};
use lumen_math::{Mat3, Vec2, Vec3};

/// Result of a successful ray-triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit
    pub t: f32,
    /// Barycentric weights of (v0, v1, v2), summing to 1
    pub weights: Vec3,
}

/// A triangle primitive.
///
/// The unit normal is `normalize((v2 - v0) × (v1 - v0))` and is recomputed
/// whenever the vertices change, so it is never stale.
#[derive(Debug, Clone)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    normal: Vec3,
    uvs: Option<[Vec2; 3]>,
    material: Material,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Self {
        Self {
            v0,
            v1,
            v2,
            normal: face_normal(v0, v1, v2),
            uvs: None,
            material,
        }
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_uvs(mut self, uv0: Vec2, uv1: Vec2, uv2: Vec2) -> Self {
        self.uvs = Some([uv0, uv1, uv2]);
        self
    }

    /// Replace the vertices and recompute the normal.
    pub fn set_vertices(&mut self, v0: Vec3, v1: Vec3, v2: Vec3) {
        self.v0 = v0;
        self.v1 = v1;
        self.v2 = v2;
        self.normal = face_normal(v0, v1, v2);
    }

    /// Apply `f` to every vertex and recompute the normal.
    pub fn map_vertices(&mut self, f: impl Fn(Vec3) -> Vec3) {
        self.set_vertices(f(self.v0), f(self.v1), f(self.v2));
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn uvs(&self) -> Option<[Vec2; 3]> {
        self.uvs
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Intersect the ray with this triangle.
    ///
    /// Non-refractive triangles are culled when the ray approaches from the
    /// back (`d·N > 0`); refractive ones are hit from both sides so rays can
    /// enter and leave a transparent volume.
    pub fn intersect(&self, ray: &Ray, closest: f32) -> Option<TriangleHit> {
        let d = ray.direction();
        if !self.material.is_refractive && d.dot(self.normal) > 0.0 {
            return None;
        }

        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        let b = ray.origin() - self.v0;

        let det = Mat3::from_cols(-d, e1, e2).determinant();
        if det == 0.0 {
            return None;
        }

        let t = Mat3::from_cols(b, e1, e2).determinant() / det;
        if t <= 0.0 || t >= closest {
            return None;
        }

        let u = Mat3::from_cols(-d, b, e2).determinant() / det;
        if u < 0.0 {
            return None;
        }

        let v = Mat3::from_cols(-d, e1, b).determinant() / det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        Some(TriangleHit {
            t,
            weights: Vec3::new(1.0 - u - v, u, v),
        })
    }

    /// Interpolated texture coordinate at the given barycentric weights.
    pub fn uv_at(&self, weights: Vec3) -> Option<Vec2> {
        self.uvs
            .map(|[a, b, c]| weights.x * a + weights.y * b + weights.z * c)
    }

    /// Normal used for shading at the given barycentric weights.
    ///
    /// Equals the face normal unless the material carries a normal map and
    /// the triangle has UVs, in which case the tangent-space sample is
    /// rotated into the frame spanned by the UV gradients.
    pub fn shading_normal(&self, weights: Vec3) -> Vec3 {
        let (Some(map), Some(uv)) = (&self.material.normal_map, self.uv_at(weights)) else {
            return self.normal;
        };
        let Some((tangent, bitangent)) = self.tangent_frame() else {
            return self.normal;
        };

        let m = map.sample(uv) * 2.0 - Vec3::ONE;
        (m.x * tangent + m.y * bitangent + m.z * self.normal)
            .try_normalize()
            .unwrap_or(self.normal)
    }

    /// Tangent and bitangent aligned with the UV axes, orthogonal to the normal.
    fn tangent_frame(&self) -> Option<(Vec3, Vec3)> {
        let [uv0, uv1, uv2] = self.uvs?;
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        let duv1 = uv1 - uv0;
        let duv2 = uv2 - uv0;

        let r = duv1.x * duv2.y - duv2.x * duv1.y;
        if r == 0.0 {
            return None;
        }

        let tangent = (e1 * duv2.y - e2 * duv1.y) / r;
        let tangent = (tangent - self.normal * self.normal.dot(tangent)).try_normalize()?;
        let bitangent = self.normal.cross(tangent);
        Some((tangent, bitangent))
    }
}

/// Unit face normal; zero for degenerate (zero-area) triangles.
fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v2 - v0).cross(v1 - v0).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Texture;
    use std::sync::Arc;

    /// Triangle in the z = -1 plane facing +Z (towards the origin).
    fn facing_origin(material: Material) -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            material,
        )
    }

    #[test]
    fn test_normal_is_unit_and_faces_front() {
        let tri = facing_origin(Material::default());
        assert!((tri.normal() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_triangle_hit() {
        let tri = facing_origin(Material::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = tri.intersect(&ray, f32::MAX).unwrap();
        assert!((hit.t - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = facing_origin(Material::default());

        // Passes beside the triangle
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, -1.0));
        assert!(tri.intersect(&ray, f32::MAX).is_none());

        // Points away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.intersect(&ray, f32::MAX).is_none());
    }

    #[test]
    fn test_centroid_barycentrics() {
        let tris = [
            facing_origin(Material::default()),
            Triangle::new(
                Vec3::new(2.0, 0.5, 3.0),
                Vec3::new(-1.0, 4.0, 2.0),
                Vec3::new(0.5, -3.0, 1.0),
                Material::glass(1.5, 0.0),
            ),
        ];

        for tri in &tris {
            let origin = tri.centroid() + tri.normal() * 2.0;
            let ray = Ray::new(origin, tri.centroid() - origin);
            let hit = tri.intersect(&ray, f32::MAX).unwrap();

            let sum = hit.weights.x + hit.weights.y + hit.weights.z;
            assert!((sum - 1.0).abs() < 1e-5);
            assert!(hit.weights.min_element() >= 0.0);
            assert!((hit.weights - Vec3::splat(1.0 / 3.0)).length() < 1e-4);
        }
    }

    #[test]
    fn test_backface_culled_unless_refractive() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);

        let opaque = facing_origin(Material::default());
        assert!(opaque.intersect(&ray, f32::MAX).is_none());

        let glass = facing_origin(Material::glass(1.5, 0.0));
        let hit = glass.intersect(&ray, f32::MAX).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_parallel_ray_is_rejected() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Material::glass(1.5, 0.0),
        );
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(tri.intersect(&ray, f32::MAX).is_none());
    }

    #[test]
    fn test_respects_current_closest() {
        let tri = facing_origin(Material::default());
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(tri.intersect(&ray, 1.0).is_none());
        assert!(tri.intersect(&ray, 1.5).is_some());
    }

    #[test]
    fn test_set_vertices_recomputes_normal() {
        let mut tri = facing_origin(Material::default());
        tri.set_vertices(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        assert!((tri.normal() - Vec3::Y).length() < 1e-6);

        tri.map_vertices(|v| Vec3::new(v.x, -v.y, v.z) * 3.0);
        assert!((tri.normal().length() - 1.0).abs() < 1e-6);
        assert!((tri.normal() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_uv_interpolation() {
        let tri = facing_origin(Material::default()).with_uvs(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        );
        let uv = tri.uv_at(Vec3::new(0.5, 0.25, 0.25)).unwrap();
        assert!((uv - Vec2::new(0.25, 0.25)).length() < 1e-6);

        assert!(facing_origin(Material::default()).uv_at(Vec3::X).is_none());
    }

    #[test]
    fn test_flat_normal_map_keeps_face_normal() {
        // (0.5, 0.5, 1.0) encodes the unperturbed tangent-space normal
        let flat = Arc::new(Texture::solid(Vec3::new(0.5, 0.5, 1.0)));
        let tri = facing_origin(Material::default().with_normal_map(flat)).with_uvs(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        );

        let n = tri.shading_normal(Vec3::splat(1.0 / 3.0));
        assert!((n - tri.normal()).length() < 1e-5);
    }

    #[test]
    fn test_tilted_normal_map_perturbs_normal() {
        let tilted = Arc::new(Texture::solid(Vec3::new(1.0, 0.5, 0.5)));
        let tri = facing_origin(Material::default().with_normal_map(tilted)).with_uvs(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        );

        let n = tri.shading_normal(Vec3::splat(1.0 / 3.0));
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(n.dot(tri.normal()).abs() < 1e-5);
    }
}
