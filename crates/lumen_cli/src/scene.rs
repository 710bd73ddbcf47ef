//! The Cornell box test scene.

use std::sync::Arc;

use lumen_renderer::{
    AreaLight, Camera, Color, Material, RenderConfig, Scene, Sphere, Texture, Triangle, Vec2,
    Vec3,
};

/// Side length of the box in its modelling units.
const BOX_SIZE: f32 = 555.0;

/// Optional surface images for the tall block.
#[derive(Debug, Clone, Default)]
pub struct BlockMaps {
    pub texture: Option<Arc<Texture>>,
    pub normal_map: Option<Arc<Texture>>,
}

/// Cornell box scaled to `[-1, 1]³` with a glass, a mirror and a diffuse
/// sphere, lit by a square light just under the ceiling.
pub fn cornell_box(maps: &BlockMaps) -> Scene {
    let mut scene = Scene::new(AreaLight::new(
        Vec3::new(0.0, -0.98, 0.0),
        Color::new(1.0, 1.0, 0.9) * 15.0,
        0.5,
    ));

    let mut triangles = room();
    triangles.extend(tall_block(maps));

    // Model space has +Y up and the origin in a corner; the renderer looks
    // down +Z with +Y pointing down the screen
    for tri in &mut triangles {
        tri.map_vertices(|v| {
            let v = v * (2.0 / BOX_SIZE) - Vec3::ONE;
            Vec3::new(-v.x, -v.y, v.z)
        });
    }
    scene.extend(triangles.into_iter().map(Into::into));

    let glass = Material::glass(1.0, 0.0)
        .with_reflect_strength(1.5)
        .with_specular_exponent(0.0);
    scene.add(Sphere::new(Vec3::new(0.3, 0.7, -0.5), 0.2, glass));

    let metal = Material::mirror(Color::new(0.5, 0.5, 1.0), 0.0).with_specular_exponent(0.0);
    scene.add(Sphere::new(Vec3::new(-0.5, 0.7, -0.5), 0.3, metal));

    scene.add(Sphere::new(
        Vec3::new(0.5, 0.75, 0.3),
        0.25,
        Material::diffuse(Color::ONE),
    ));

    scene
}

/// Camera in front of the open side of the box, turned to face it.
pub fn default_camera(config: &RenderConfig) -> Camera {
    let mut camera = Camera::new(
        Vec3::new(1.75, 0.0, -4.5),
        config.height as f32 / 0.6,
        config.width,
        config.height,
    );
    camera.rotate(0.4);
    camera
}

fn room() -> Vec<Triangle> {
    let red = Material::diffuse(Color::new(0.75, 0.15, 0.15));
    let green = Material::diffuse(Color::new(0.15, 0.75, 0.15));
    let white = Material::diffuse(Color::splat(0.75));

    let l = BOX_SIZE;
    let a = Vec3::new(l, 0.0, 0.0);
    let b = Vec3::new(0.0, 0.0, 0.0);
    let c = Vec3::new(l, 0.0, l);
    let d = Vec3::new(0.0, 0.0, l);
    let e = Vec3::new(l, l, 0.0);
    let f = Vec3::new(0.0, l, 0.0);
    let g = Vec3::new(l, l, l);
    let h = Vec3::new(0.0, l, l);

    vec![
        // Floor
        Triangle::new(c, b, a, white.clone()),
        Triangle::new(c, d, b, white.clone()),
        // Left wall
        Triangle::new(a, e, c, red.clone()),
        Triangle::new(c, e, g, red),
        // Right wall
        Triangle::new(f, b, d, green.clone()),
        Triangle::new(h, f, d, green),
        // Ceiling
        Triangle::new(e, f, g, white.clone()),
        Triangle::new(f, h, g, white.clone()),
        // Back wall
        Triangle::new(g, d, c, white.clone()),
        Triangle::new(g, h, d, white.clone()),
        // Front wall, culled when seen from the camera outside
        Triangle::new(b, e, a, white.clone()),
        Triangle::new(f, e, b, white),
    ]
}

fn tall_block(maps: &BlockMaps) -> Vec<Triangle> {
    let mut blue = Material::diffuse(Color::new(0.15, 0.15, 0.75));
    blue.texture = maps.texture.clone();
    blue.normal_map = maps.normal_map.clone();

    let a = Vec3::new(423.0, 0.0, 247.0);
    let b = Vec3::new(265.0, 0.0, 296.0);
    let c = Vec3::new(472.0, 0.0, 406.0);
    let d = Vec3::new(314.0, 0.0, 456.0);
    let e = Vec3::new(423.0, 330.0, 247.0);
    let f = Vec3::new(265.0, 330.0, 296.0);
    let g = Vec3::new(472.0, 330.0, 406.0);
    let h = Vec3::new(314.0, 330.0, 456.0);

    let uv = Vec2::new;
    // Side faces map a 0.4 x 0.8 window of the texture, the top a 0.4 square
    let lower = [uv(0.0, 0.8), uv(0.4, 0.0), uv(0.0, 0.0)];
    let upper = [uv(0.0, 0.8), uv(0.4, 0.8), uv(0.4, 0.0)];

    let face = |v0, v1, v2, [t0, t1, t2]: [Vec2; 3]| {
        Triangle::new(v0, v1, v2, blue.clone()).with_uvs(t0, t1, t2)
    };

    vec![
        // Front
        face(e, b, a, lower),
        face(e, f, b, upper),
        face(f, d, b, lower),
        face(f, h, d, upper),
        // Back
        face(h, c, d, lower),
        face(h, g, c, upper),
        // Left
        face(g, e, c, [uv(0.0, 0.8), uv(0.4, 0.8), uv(0.0, 0.0)]),
        face(e, a, c, [uv(0.4, 0.8), uv(0.4, 0.0), uv(0.0, 0.0)]),
        // Top
        face(g, f, e, [uv(0.0, 0.4), uv(0.4, 0.0), uv(0.0, 0.0)]),
        face(g, h, f, [uv(0.0, 0.4), uv(0.4, 0.4), uv(0.4, 0.0)]),
    ]
}
