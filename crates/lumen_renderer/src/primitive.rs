//! Closed set of scene primitives.

use crate::{Material, Ray, Sphere, Triangle};
use lumen_math::{Vec2, Vec3};

/// A renderable shape. Intersection dispatch is a `match`, not a vtable.
#[derive(Debug, Clone)]
pub enum Primitive {
    Triangle(Triangle),
    Sphere(Sphere),
}

impl Primitive {
    pub fn material(&self) -> &Material {
        match self {
            Primitive::Triangle(tri) => tri.material(),
            Primitive::Sphere(sphere) => sphere.material(),
        }
    }

    /// Ray parameter and barycentric weights of a hit strictly inside
    /// `(0, closest)`. Spheres report weights `(1, 0, 0)`.
    #[inline]
    pub fn intersect(&self, ray: &Ray, closest: f32) -> Option<(f32, Vec3)> {
        match self {
            Primitive::Triangle(tri) => tri.intersect(ray, closest).map(|hit| (hit.t, hit.weights)),
            Primitive::Sphere(sphere) => sphere.intersect(ray, closest).map(|t| (t, Vec3::X)),
        }
    }

    /// Shading normal at a hit point.
    pub fn normal_at(&self, point: Vec3, weights: Vec3) -> Vec3 {
        match self {
            Primitive::Triangle(tri) => tri.shading_normal(weights),
            Primitive::Sphere(sphere) => sphere.normal_at(point),
        }
    }

    /// Texture coordinate at a hit, if the primitive carries UVs.
    pub fn uv_at(&self, weights: Vec3) -> Option<Vec2> {
        match self {
            Primitive::Triangle(tri) => tri.uv_at(weights),
            Primitive::Sphere(_) => None,
        }
    }
}

impl From<Triangle> for Primitive {
    fn from(tri: Triangle) -> Self {
        Primitive::Triangle(tri)
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}
