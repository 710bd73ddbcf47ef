//! Pinhole camera for ray generation.
//!
//! The view transform is never stored as a matrix: it is rebuilt from the
//! yaw (about Y) and pitch (about X) angles on every call.

use crate::Ray;
use lumen_math::{Mat3, Vec2, Vec3};

/// Pinhole camera with yaw/pitch orientation.
///
/// Camera space looks down +Z with +Y pointing down the screen, so pixel
/// rows grow with camera-space Y.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Distance from the pinhole to the image plane, in pixels
    pub focal_length: f32,
    /// Image size used for the screen-space projection
    pub width: u32,
    pub height: u32,
    yaw: f32,
    pitch: f32,
}

impl Camera {
    /// Create a camera at `position` looking down +Z.
    pub fn new(position: Vec3, focal_length: f32, width: u32, height: u32) -> Self {
        Self {
            position,
            focal_length,
            width,
            height,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Move by an offset expressed in camera-local axes.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += self.camera_to_world(offset, false);
    }

    /// Turn about the Y axis. Angles accumulate without wrapping.
    pub fn rotate(&mut self, delta_yaw: f32) {
        self.yaw += delta_yaw;
    }

    /// Turn about the Y axis, then tilt about the X axis.
    pub fn rotate_yaw_pitch(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.rotate(delta_yaw);
        self.pitch += delta_pitch;
    }

    /// World space to camera space: yaw first, then pitch.
    pub fn world_to_camera(&self, point: Vec3, apply_translation: bool) -> Vec3 {
        let p = if apply_translation {
            point - self.position
        } else {
            point
        };
        Mat3::from_rotation_x(self.pitch) * (Mat3::from_rotation_y(self.yaw) * p)
    }

    /// Exact inverse of [`Camera::world_to_camera`]: undo pitch, then yaw.
    pub fn camera_to_world(&self, point: Vec3, apply_translation: bool) -> Vec3 {
        let p = Mat3::from_rotation_y(-self.yaw) * (Mat3::from_rotation_x(-self.pitch) * point);
        if apply_translation {
            p + self.position
        } else {
            p
        }
    }

    /// Perspective projection to pixel coordinates.
    ///
    /// Divides by `|z|` so positions stay stable for points marginally
    /// behind the camera; callers must cull with the signed depth from
    /// [`Camera::world_to_camera`]. Returns None for points on the camera
    /// plane (`z == 0`).
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let p = self.world_to_camera(point, true);
        let depth = p.z.abs();
        if depth == 0.0 {
            return None;
        }
        Some(Vec2::new(
            self.focal_length * p.x / depth + self.width as f32 / 2.0,
            self.focal_length * p.y / depth + self.height as f32 / 2.0,
        ))
    }

    /// World-space ray through the continuous screen position `(x, y)`.
    pub fn primary_ray(&self, x: f32, y: f32) -> Ray {
        let local = Vec3::new(
            x - self.width as f32 / 2.0,
            y - self.height as f32 / 2.0,
            self.focal_length,
        );
        Ray::new(self.position, self.camera_to_world(local, false))
    }
}
