//! Core types for the rasterizer

use serde::{Deserialize, Serialize};
use super::math::{Vec2, Vec3, Vec4};

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert a float color (0.0-1.0 per channel), clamping out-of-range values
    pub fn from_vec3(c: Vec3) -> Self {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: to_u8(c.x),
            g: to_u8(c.y),
            b: to_u8(c.z),
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Per-vertex payload the pipeline carries from vertex shader to pixel shader.
///
/// `interpolate` must be an affine combination: with weights `[1, 0, 0]` it
/// returns `a` unchanged (up to float rounding), and likewise for `b` and `c`.
pub trait ShadingData: Clone {
    /// Object-space position fed to the vertex shader
    fn position(&self) -> Vec3;

    /// Weighted combination of three payloads; weights sum to one
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: [f32; 3]) -> Self;
}

fn mix3(a: Vec3, b: Vec3, c: Vec3, w: [f32; 3]) -> Vec3 {
    a * w[0] + b * w[1] + c * w[2]
}

/// A vertex with position, normal, texture coordinate and material colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    #[serde(default)]
    pub normal: Vec3,
    #[serde(default)]
    pub uv: Vec2,
    #[serde(default)]
    pub ambient: Vec3,
    #[serde(default = "default_diffuse")]
    pub diffuse: Vec3,
    #[serde(default)]
    pub emissive: Vec3,
}

fn default_diffuse() -> Vec3 {
    Vec3::ONE
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            emissive: Vec3::ZERO,
        }
    }

    pub fn from_pos(x: f32, y: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, y, z), Vec3::ZERO, Vec2::ZERO)
    }

    pub fn with_diffuse(mut self, diffuse: Vec3) -> Self {
        self.diffuse = diffuse;
        self
    }
}

impl ShadingData for Vertex {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn interpolate(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
        Self {
            position: mix3(a.position, b.position, c.position, w),
            normal: mix3(a.normal, b.normal, c.normal, w),
            uv: a.uv * w[0] + b.uv * w[1] + c.uv * w[2],
            ambient: mix3(a.ambient, b.ambient, c.ambient, w),
            diffuse: mix3(a.diffuse, b.diffuse, c.diffuse, w),
            emissive: mix3(a.emissive, b.emissive, c.emissive, w),
        }
    }
}

/// Vertex shader output: homogeneous position plus payload
#[derive(Debug, Clone, PartialEq)]
pub struct ClipVertex<V> {
    pub position: Vec4,
    pub data: V,
}

impl<V: ShadingData> ClipVertex<V> {
    pub fn new(position: Vec4, data: V) -> Self {
        Self { position, data }
    }

    /// Point on the segment self->other at parameter `t`
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            data: V::interpolate(&self.data, &other.data, &other.data, [1.0 - t, t, 0.0]),
        }
    }
}

/// A vertex after the homogeneous divide and viewport mapping
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenVertex<V> {
    /// Pixel-space position
    pub position: Vec2,
    /// Normalized device depth (z / w)
    pub depth: f32,
    /// 1 / w, kept for perspective-correct interpolation
    pub inv_w: f32,
    pub data: V,
}

/// A covered pixel with its interpolated depth and payload
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment<V> {
    pub x: usize,
    pub y: usize,
    pub depth: f32,
    pub data: V,
}

/// Which triangle facing to discard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    /// Rasterize both windings
    #[default]
    None,
    /// Discard triangles that are clockwise in normalized device space
    Back,
    /// Discard triangles that are counter-clockwise in normalized device space
    Front,
}

/// Rasterizer settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RasterSettings {
    /// Face culling by winding
    pub cull_mode: CullMode,
    /// Interpolate attributes with 1/w weighting instead of linearly in screen space
    pub perspective_correct: bool,
}
