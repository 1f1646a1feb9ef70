//! Clip space to screen space mapping and near-plane clipping

use serde::{Deserialize, Serialize};
use crate::error::{RasterError, Result};
use super::math::{Vec2, Vec4};
use super::types::{ClipVertex, ScreenVertex, ShadingData};

/// Smallest w a vertex may have after clipping; keeps the divide finite
pub const W_NEAR: f32 = 1e-5;

/// Target pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Homogeneous divide, then map NDC to pixels with Y pointing down
    pub fn to_screen<V>(&self, v: ClipVertex<V>) -> ScreenVertex<V> {
        let inv_w = 1.0 / v.position.w;
        let ndc_x = v.position.x * inv_w;
        let ndc_y = v.position.y * inv_w;
        let ndc_z = v.position.z * inv_w;

        ScreenVertex {
            position: Vec2::new(
                (ndc_x * 0.5 + 0.5) * self.width as f32,
                (1.0 - (ndc_y * 0.5 + 0.5)) * self.height as f32,
            ),
            depth: ndc_z,
            inv_w,
            data: v.data,
        }
    }
}

/// Signed distances to the near planes: w = W_NEAR keeps the divide
/// finite, z = -w is the projection's near plane. A vertex is kept when
/// both are non-negative.
fn near_distances(p: Vec4) -> [f32; 2] {
    [p.w - W_NEAR, p.z + p.w]
}

/// True when the vertex lies on the discarded side of either near plane
pub fn outside_near<V>(v: &ClipVertex<V>) -> bool {
    near_distances(v.position).iter().any(|d| *d < 0.0)
}

/// Clip a triangle against the near planes (Sutherland-Hodgman, one pass per
/// plane).
///
/// Returns the clipped convex polygon: empty when nothing survives,
/// otherwise 3 to 5 vertices in the original winding.
pub fn clip_near<V: ShadingData>(tri: &[ClipVertex<V>; 3]) -> Vec<ClipVertex<V>> {
    if !tri.iter().any(outside_near) {
        return tri.to_vec();
    }

    let mut polygon = tri.to_vec();
    for plane in 0..2 {
        polygon = clip_polygon(&polygon, |v| near_distances(v.position)[plane]);
        if polygon.is_empty() {
            break;
        }
    }
    polygon
}

fn clip_polygon<V, F>(polygon: &[ClipVertex<V>], dist: F) -> Vec<ClipVertex<V>>
where
    V: ShadingData,
    F: Fn(&ClipVertex<V>) -> f32,
{
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, cur) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        let dc = dist(cur);
        let dn = dist(next);

        if dc >= 0.0 {
            out.push(cur.clone());
        }
        if (dc >= 0.0) != (dn >= 0.0) {
            let t = dc / (dc - dn);
            out.push(cur.lerp(next, t));
        }
    }
    out
}

/// Split a convex polygon into a triangle fan around its first vertex
pub fn fan<V: Clone>(polygon: &[V]) -> impl Iterator<Item = [V; 3]> + '_ {
    (1..polygon.len().saturating_sub(1))
        .map(move |i| [polygon[0].clone(), polygon[i].clone(), polygon[i + 1].clone()])
}
