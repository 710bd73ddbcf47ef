//! Scene description: primitives plus the single area light.

use crate::{closest_intersection, AreaLight, Intersection, Primitive, Ray};

/// Everything a render session needs to know about the world.
///
/// Built once before rendering and shared immutably by every worker.
#[derive(Debug, Clone)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub light: AreaLight,
}

impl Scene {
    pub fn new(light: AreaLight) -> Self {
        Self {
            primitives: Vec::new(),
            light,
        }
    }

    pub fn add(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Closest hit over the whole scene.
    pub fn hit(&self, ray: &Ray, ignore: Option<usize>) -> Option<Intersection<'_>> {
        closest_intersection(ray, &self.primitives, ignore)
    }
}

impl Extend<Primitive> for Scene {
    fn extend<T: IntoIterator<Item = Primitive>>(&mut self, iter: T) {
        self.primitives.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Material, Sphere};
    use lumen_math::Vec3;

    #[test]
    fn test_add_and_hit() {
        let mut scene = Scene::new(AreaLight::point(Vec3::Y, Color::ONE));
        assert!(scene.is_empty());

        scene.add(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, Material::default()));
        scene.extend([Sphere::new(Vec3::new(0.0, 0.0, 9.0), 1.0, Material::default()).into()]);
        assert_eq!(scene.len(), 2);

        let hit = scene.hit(&Ray::new(Vec3::ZERO, Vec3::Z), None).unwrap();
        assert_eq!(hit.index, 0);
        let hit = scene.hit(&Ray::new(Vec3::ZERO, Vec3::Z), Some(0)).unwrap();
        assert_eq!(hit.index, 1);
    }
}
