//! Camera state and matrix derivation
//!
//! Angles are in degrees. With `theta = 0` and `phi = 0` the camera looks
//! down -Z with +Y up.

use serde::{Deserialize, Serialize};
use crate::rasterizer::{Mat4, Vec3};

/// Perspective camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Yaw around +Y
    pub theta: f32,
    /// Pitch, clamped just short of straight up/down
    pub phi: f32,
    /// Vertical field of view
    pub fov_y: f32,
    /// Width / height
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            theta: 0.0,
            phi: 0.0,
            fov_y: 60.0,
            aspect: 1.0,
            z_near: 0.01,
            z_far: 100.0,
        }
    }
}

const PHI_LIMIT: f32 = 89.0;

impl Camera {
    pub fn new(position: Vec3, theta: f32, phi: f32) -> Self {
        Self {
            position,
            theta,
            phi: phi.clamp(-PHI_LIMIT, PHI_LIMIT),
            ..Default::default()
        }
    }

    pub fn with_projection(mut self, fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.z_near = z_near;
        self.z_far = z_far;
        self
    }

    /// Forward (view) direction
    pub fn direction(&self) -> Vec3 {
        let (st, ct) = self.theta.to_radians().sin_cos();
        let (sp, cp) = self.phi.to_radians().sin_cos();
        Vec3::new(st * cp, sp, -ct * cp)
    }

    pub fn right(&self) -> Vec3 {
        self.direction().cross(Vec3::UP).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to(self.position, self.direction(), Vec3::UP)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    /// Combined projection * view
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Swing the camera around the Y axis through `center`, keeping it aimed there
    pub fn orbit(&mut self, center: Vec3, dtheta: f32) {
        let (s, c) = dtheta.to_radians().sin_cos();
        let rel = self.position - center;
        self.position = center
            + Vec3::new(rel.x * c - rel.z * s, rel.y, rel.x * s + rel.z * c);
        self.theta += dtheta;
    }
}
