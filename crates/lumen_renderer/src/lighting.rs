//! Recursive shading of a surface hit.
//!
//! Dispatches on the material: reflective, then refractive, then diffuse.
//! Secondary rays recurse through [`shade`] at `depth + 1`, and the walk
//! stops once `depth` exceeds the configured maximum.

use crate::{
    closest_intersection, fresnel, reflect, refract, sample_cone, sample_hemisphere, Color,
    Intersection, Material, Ray, RenderConfig, Scene, SURFACE_EPSILON,
};
use lumen_math::Vec3;
use rand::RngCore;

/// Color leaving `hit` back along its ray.
pub fn shade(
    hit: &Intersection,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if depth > config.max_depth {
        return Color::ZERO;
    }

    let material = hit.material();
    if material.is_reflective {
        let reflected = reflective(hit, material, scene, depth, config, rng);
        let strength = material.reflect_strength;
        if strength < 1.0 {
            let diffuse = diffuse(hit, material, scene, depth, config, rng);
            reflected * strength + diffuse * (1.0 - strength)
        } else {
            reflected
        }
    } else if material.is_refractive {
        refractive(hit, material, scene, depth, config, rng)
    } else {
        diffuse(hit, material, scene, depth, config, rng)
    }
}

/// Direct plus indirect light, tinted by the surface albedo.
fn diffuse(
    hit: &Intersection,
    material: &Material,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let direct = scene
        .light
        .direct_light(hit, &scene.primitives, config.light_samples, rng);
    let indirect = indirect_light(hit, scene, depth, config, rng);

    (direct + indirect) * albedo(hit, material)
}

/// Texture color at the hit UV, or the flat diffuse color.
fn albedo(hit: &Intersection, material: &Material) -> Color {
    match (&material.texture, hit.uv()) {
        (Some(texture), Some(uv)) => texture.sample(uv),
        _ => material.diffuse,
    }
}

/// Light bounced in from other surfaces, estimated with uniform
/// hemisphere samples.
fn indirect_light(
    hit: &Intersection,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if config.indirect_rays == 0 {
        return Color::ZERO;
    }

    let mut total = Color::ZERO;
    for _ in 0..config.indirect_rays {
        let direction = sample_hemisphere(hit.normal, rng);
        let ray = Ray::new(hit.position, direction);

        if let Some(next) = closest_intersection(&ray, &scene.primitives, Some(hit.index)) {
            total += shade(&next, scene, depth + 1, config, rng);
        }
    }

    total / config.indirect_rays as f32
}

/// Mirror reflection, optionally glossy, scaled by the specular lobe
/// toward the light.
fn reflective(
    hit: &Intersection,
    material: &Material,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mirror = reflect(hit.ray.direction(), hit.normal).normalize_or_zero();
    let to_light = (scene.light.position - hit.position).normalize_or_zero();
    let specular = mirror
        .dot(to_light)
        .max(0.0)
        .powf(material.specular_exponent);

    let reflected = trace_lobe(
        mirror,
        material.reflect_roughness,
        hit,
        scene,
        depth,
        config,
        rng,
    );

    reflected * specular
}

/// Fresnel blend of the refracted and reflected rays.
fn refractive(
    hit: &Intersection,
    material: &Material,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let incident = hit.ray.direction();
    let reflectance = fresnel(
        incident,
        hit.normal,
        material.ior,
        config.legacy_fresnel_floor,
    );

    let mut color = Color::ZERO;

    if reflectance < 1.0 {
        if let Some(direction) = refract(incident, hit.normal, material.ior) {
            let refracted = trace_lobe(
                direction,
                material.refract_roughness,
                hit,
                scene,
                depth,
                config,
                rng,
            );
            color += refracted * (1.0 - reflectance);
        }
    }

    if reflectance > 0.0 {
        color += reflective(hit, material, scene, depth, config, rng) * reflectance;
    }

    color
}

/// Average color along rays jittered inside a cone around `axis`.
///
/// A zero `roughness` casts exactly one ray along the axis. Each ray is
/// jittered independently around the same axis.
fn trace_lobe(
    axis: Vec3,
    roughness: f32,
    hit: &Intersection,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let rays = if roughness <= 0.0 {
        1
    } else {
        config.indirect_rays.max(1)
    };

    let mut total = Color::ZERO;
    for _ in 0..rays {
        let direction = sample_cone(axis, roughness, rng);
        // The surface may be crossed on purpose, so nothing is ignored here
        let ray = Ray::new(hit.position + direction * SURFACE_EPSILON, direction);

        if let Some(next) = closest_intersection(&ray, &scene.primitives, None) {
            total += shade(&next, scene, depth + 1, config, rng);
        }
    }

    total / rays as f32
}
