//! Surface materials and the shading vectors derived from them.

use std::sync::Arc;

use lumen_math::Vec3;

use crate::Texture;

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// Surface description shared by every primitive.
///
/// The reflective and refractive flags are checked in that order by the
/// lighting model; a material with neither is Lambertian diffuse.
#[derive(Debug, Clone)]
pub struct Material {
    /// Diffuse reflectance
    pub diffuse: Color,

    pub is_reflective: bool,
    /// Weight of the reflected term; below 1 it is blended with diffuse
    pub reflect_strength: f32,
    /// Cone spread around the mirror direction (0 = perfect mirror)
    pub reflect_roughness: f32,
    /// Exponent of the specular highlight term
    pub specular_exponent: f32,

    pub is_refractive: bool,
    /// Index of refraction
    pub ior: f32,
    /// Cone spread around the refracted direction
    pub refract_roughness: f32,

    /// Albedo texture, sampled at triangle UVs
    pub texture: Option<Arc<Texture>>,
    /// Tangent-space normal map, sampled at triangle UVs
    pub normal_map: Option<Arc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Color::splat(0.75),
            is_reflective: false,
            reflect_strength: 1.0,
            reflect_roughness: 0.0,
            specular_exponent: 1.0,
            is_refractive: false,
            ior: 1.0,
            refract_roughness: 0.01,
            texture: None,
            normal_map: None,
        }
    }
}

impl Material {
    /// Lambertian material with the given color.
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse: color,
            ..Default::default()
        }
    }

    /// Reflective material.
    ///
    /// - `roughness`: 0.0 = perfect mirror, larger values blur the reflection
    pub fn mirror(color: Color, roughness: f32) -> Self {
        Self {
            diffuse: color,
            is_reflective: true,
            reflect_roughness: roughness.max(0.0),
            ..Default::default()
        }
    }

    /// Dielectric (glass) material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn glass(ior: f32, roughness: f32) -> Self {
        Self {
            diffuse: Color::ONE,
            is_refractive: true,
            ior,
            refract_roughness: roughness.max(0.0),
            ..Default::default()
        }
    }

    /// Set the specular highlight exponent.
    pub fn with_specular_exponent(mut self, exponent: f32) -> Self {
        self.specular_exponent = exponent;
        self
    }

    /// Set the reflect strength.
    pub fn with_reflect_strength(mut self, strength: f32) -> Self {
        self.reflect_strength = strength;
        self
    }

    /// Attach an albedo texture.
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Attach a normal map.
    pub fn with_normal_map(mut self, normal_map: Arc<Texture>) -> Self {
        self.normal_map = Some(normal_map);
        self
    }
}

/// Mirror `incident` about `normal`: `I - 2(N·I)N`.
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Refract `incident` through a surface with index of refraction `ior`.
///
/// The ray enters the surface when `N·I < 0` (eta = 1/ior), otherwise it
/// leaves it (eta = ior) and the normal is flipped to face the ray.
/// Returns None on total internal reflection. The result is unit length.
pub fn refract(incident: Vec3, normal: Vec3, ior: f32) -> Option<Vec3> {
    let i = incident.normalize_or_zero();
    let mut n = normal.normalize_or_zero();

    let mut cos_i = i.dot(n);
    let eta = if cos_i < 0.0 {
        cos_i = -cos_i;
        1.0 / ior
    } else {
        n = -n;
        ior
    };

    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 || !k.is_finite() {
        return None;
    }

    Some(eta * i + (eta * cos_i - k.sqrt()) * n)
}

/// Fraction of light reflected at a dielectric boundary.
///
/// Averages the parallel and perpendicular Fresnel reflectances. Returns 1
/// on total internal reflection. With `legacy_floor` the reflectance is
/// raised by 0.1 (capped at 1), which brightens glass highlights but is not
/// energy conserving.
pub fn fresnel(incident: Vec3, normal: Vec3, ior: f32, legacy_floor: bool) -> f32 {
    let mut cos_i = incident
        .normalize_or_zero()
        .dot(normal.normalize_or_zero())
        .clamp(-1.0, 1.0);

    let (mut eta_i, mut eta_t) = (1.0, ior);
    if cos_i > 0.0 {
        std::mem::swap(&mut eta_i, &mut eta_t);
    }

    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        return 1.0;
    }

    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    cos_i = cos_i.abs();

    let r_s = ((eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t)).powi(2);
    let r_p = ((eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t)).powi(2);
    let reflectance = (r_s + r_p) / 2.0;

    if !reflectance.is_finite() {
        return 1.0;
    }

    if legacy_floor {
        (reflectance + 0.1).min(1.0)
    } else {
        reflectance
    }
}
