//! Lumen Renderer - CPU Ray Tracing
//!
//! A recursive Monte Carlo ray tracer with area-light soft shadows,
//! glossy reflection and Fresnel-blended refraction, driven by a
//! bucket-parallel renderer that refines the image pass by pass.

mod bucket;
mod buffer;
mod camera;
mod config;
mod error;
mod intersection;
mod light;
mod lighting;
mod material;
mod primitive;
mod renderer;
mod sampling;
mod scene;
mod session;
mod sphere;
mod texture;
mod triangle;

pub use bucket::{generate_bucket_grid, render_bucket_pass, Bucket, SampleGrid};
pub use buffer::{color_to_rgba, linear_to_gamma, Accumulator, Frame, PixelBuffer, Tile};
pub use camera::Camera;
pub use config::{RenderConfig, MAX_SAMPLE};
pub use error::{RenderError, RenderResult};
pub use intersection::{closest_intersection, closest_intersection_within, Intersection};
pub use light::AreaLight;
pub use lighting::shade;
pub use material::{fresnel, reflect, refract, Color, Material};
pub use primitive::Primitive;
pub use renderer::{render_sample, trace};
pub use sampling::{gen_f32, sample_cone, sample_hemisphere};
pub use scene::Scene;
pub use session::{FrameSink, PassGate, RenderSession};
pub use sphere::Sphere;
pub use texture::{ColorSpace, Texture, TextureError, TextureResult};
pub use triangle::{Triangle, TriangleHit};

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Basis, Ray, Vec2, Vec3};

/// Offset applied to secondary ray origins to avoid re-hitting the surface
/// they leave from.
pub const SURFACE_EPSILON: f32 = 1e-4;
