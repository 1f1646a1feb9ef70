//! Core rendering: triangle setup, scan conversion and the draw call
//!
//! Coverage uses edge functions sampled at pixel centres with a top-left
//! fill rule, so triangles sharing an edge never both claim a pixel.

use std::cmp::Ordering;
use std::ops::AddAssign;

use crate::error::{RasterError, Result};
use super::buffer::{check_indices, IndexBuffer, VertexBuffer};
use super::math::{edge_function, Vec2, Vec4};
use super::resource::Resource;
use super::types::{ClipVertex, CullMode, Fragment, RasterSettings, ScreenVertex, ShadingData};
use super::viewport::{clip_near, fan, outside_near, Viewport};

/// Maps an object-space position (w = 1) and its payload to clip space
pub type VertexShader<V> = Box<dyn Fn(Vec4, &V) -> (Vec4, V)>;

/// Maps interpolated payload and depth to an output color
pub type PixelShader<V, C> = Box<dyn Fn(&V, f32) -> C>;

/// Counters collected by one or more draw calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Triangles consumed from the index buffer
    pub triangles: usize,
    /// Zero-area triangles skipped
    pub degenerate: usize,
    /// Triangles discarded by the cull mode
    pub culled: usize,
    /// Triangles touched by near-plane clipping
    pub clipped: usize,
    /// Pixel shader invocations
    pub fragments: usize,
    /// Fragments that failed the depth test
    pub depth_rejected: usize,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, other: DrawStats) {
        self.triangles += other.triangles;
        self.degenerate += other.degenerate;
        self.culled += other.culled;
        self.clipped += other.clipped;
        self.fragments += other.fragments;
        self.depth_rejected += other.depth_rejected;
    }
}

/// Top-left rule: top edges are horizontal with the interior below,
/// left edges run upward on screen (for positive-area winding).
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dy < 0.0 || (dy == 0.0 && dx > 0.0)
}

/// Edge function evaluated with the endpoints in a fixed order, so an edge
/// shared by two triangles yields exactly opposite values for each of them.
fn shared_edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    if a.x < b.x || (a.x == b.x && a.y <= b.y) {
        edge_function(a, b, p)
    } else {
        -edge_function(b, a, p)
    }
}

/// A screen-space triangle ready for scan conversion
#[derive(Debug, Clone)]
pub struct TriangleSetup<V> {
    vertices: [ScreenVertex<V>; 3],
    area: f32,
    top_left: [bool; 3],
}

impl<V: ShadingData> TriangleSetup<V> {
    /// Set up a triangle, re-winding it to positive area.
    ///
    /// Returns `None` for degenerate (zero or non-finite area) triangles.
    pub fn new(vertices: [ScreenVertex<V>; 3]) -> Option<Self> {
        let [a, b, c] = vertices;
        let area = edge_function(a.position, b.position, c.position);
        if area == 0.0 || !area.is_finite() {
            return None;
        }

        let vertices = if area < 0.0 { [a, c, b] } else { [a, b, c] };
        let p = [vertices[0].position, vertices[1].position, vertices[2].position];

        Some(Self {
            vertices,
            area: area.abs(),
            // Edge i is opposite vertex i
            top_left: [
                is_top_left(p[1], p[2]),
                is_top_left(p[2], p[0]),
                is_top_left(p[0], p[1]),
            ],
        })
    }

    /// Twice the unsigned screen-space area
    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn vertices(&self) -> &[ScreenVertex<V>; 3] {
        &self.vertices
    }

    /// Normalized barycentric weights of `p`, with no coverage test
    pub fn weights_at(&self, p: Vec2) -> [f32; 3] {
        let [a, b, c] = &self.vertices;
        [
            shared_edge(b.position, c.position, p) / self.area,
            shared_edge(c.position, a.position, p) / self.area,
            shared_edge(a.position, b.position, p) / self.area,
        ]
    }

    /// Weights of `p` when it is covered under the fill rule
    pub fn coverage(&self, p: Vec2) -> Option<[f32; 3]> {
        let [a, b, c] = &self.vertices;
        let w = [
            shared_edge(b.position, c.position, p),
            shared_edge(c.position, a.position, p),
            shared_edge(a.position, b.position, p),
        ];

        let inside = w
            .iter()
            .zip(self.top_left)
            .all(|(&e, top_left)| e > 0.0 || (e == 0.0 && top_left));
        if !inside {
            return None;
        }

        Some([w[0] / self.area, w[1] / self.area, w[2] / self.area])
    }

    /// Payload and depth at the given screen-space weights
    pub fn interpolate(&self, weights: [f32; 3], perspective_correct: bool) -> (V, f32) {
        let [a, b, c] = &self.vertices;
        let depth = weights[0] * a.depth + weights[1] * b.depth + weights[2] * c.depth;

        let attr_weights = if perspective_correct {
            let pw = [weights[0] * a.inv_w, weights[1] * b.inv_w, weights[2] * c.inv_w];
            let sum = pw[0] + pw[1] + pw[2];
            if sum.abs() > f32::EPSILON {
                [pw[0] / sum, pw[1] / sum, pw[2] / sum]
            } else {
                weights
            }
        } else {
            weights
        };

        (V::interpolate(&a.data, &b.data, &c.data, attr_weights), depth)
    }

    /// Pixel rectangle `[x0, x1) x [y0, y1)` containing the triangle,
    /// clamped to a `width` x `height` target
    pub fn bounds(&self, width: usize, height: usize) -> (usize, usize, usize, usize) {
        let [a, b, c] = &self.vertices;
        let p = [a.position, b.position, c.position];
        let min_x = p[0].x.min(p[1].x).min(p[2].x);
        let max_x = p[0].x.max(p[1].x).max(p[2].x);
        let min_y = p[0].y.min(p[1].y).min(p[2].y);
        let max_y = p[0].y.max(p[1].y).max(p[2].y);

        let clamp = |v: f32, hi: usize| v.max(0.0).min(hi as f32) as usize;
        (
            clamp(min_x.floor(), width),
            clamp(max_x.ceil(), width),
            clamp(min_y.floor(), height),
            clamp(max_y.ceil(), height),
        )
    }

    /// Visit every covered pixel inside a `width` x `height` target, top row first
    pub fn for_each_fragment<F>(
        &self,
        width: usize,
        height: usize,
        perspective_correct: bool,
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(Fragment<V>) -> Result<()>,
    {
        let (x0, x1, y0, y1) = self.bounds(width, height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(weights) = self.coverage(p) else {
                    continue;
                };
                let (data, depth) = self.interpolate(weights, perspective_correct);
                f(Fragment { x, y, depth, data })?;
            }
        }
        Ok(())
    }
}

/// The rasterizer core.
///
/// Holds the bound viewport, render target, optional depth buffer, geometry
/// buffers and shader hooks. Draw calls share nothing but these bindings.
pub struct Rasterizer<V, C> {
    viewport: Option<Viewport>,
    render_target: Option<Resource<C>>,
    depth_buffer: Option<Resource<f32>>,
    vertex_buffer: Option<VertexBuffer<V>>,
    index_buffer: Option<IndexBuffer>,
    vertex_shader: Option<VertexShader<V>>,
    pixel_shader: Option<PixelShader<V, C>>,
    settings: RasterSettings,
}

impl<V, C> Default for Rasterizer<V, C> {
    fn default() -> Self {
        Self {
            viewport: None,
            render_target: None,
            depth_buffer: None,
            vertex_buffer: None,
            index_buffer: None,
            vertex_shader: None,
            pixel_shader: None,
            settings: RasterSettings::default(),
        }
    }
}

impl<V: ShadingData, C: Copy> Rasterizer<V, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) -> Result<()> {
        self.viewport = Some(Viewport::new(width, height)?);
        Ok(())
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn set_render_target(&mut self, target: Resource<C>) {
        self.render_target = Some(target);
    }

    pub fn render_target(&self) -> Option<&Resource<C>> {
        self.render_target.as_ref()
    }

    /// Unbind and return the render target
    pub fn take_render_target(&mut self) -> Option<Resource<C>> {
        self.render_target.take()
    }

    /// Bind a depth buffer, or `None` for painter's-order overwrite
    pub fn set_depth_buffer(&mut self, depth: Option<Resource<f32>>) {
        self.depth_buffer = depth;
    }

    pub fn depth_buffer(&self) -> Option<&Resource<f32>> {
        self.depth_buffer.as_ref()
    }

    pub fn take_depth_buffer(&mut self) -> Option<Resource<f32>> {
        self.depth_buffer.take()
    }

    pub fn set_vertex_buffer(&mut self, buffer: VertexBuffer<V>) {
        self.vertex_buffer = Some(buffer);
    }

    pub fn set_index_buffer(&mut self, buffer: IndexBuffer) {
        self.index_buffer = Some(buffer);
    }

    pub fn set_vertex_shader<F>(&mut self, shader: F)
    where
        F: Fn(Vec4, &V) -> (Vec4, V) + 'static,
    {
        self.vertex_shader = Some(Box::new(shader));
    }

    pub fn set_pixel_shader<F>(&mut self, shader: F)
    where
        F: Fn(&V, f32) -> C + 'static,
    {
        self.pixel_shader = Some(Box::new(shader));
    }

    pub fn set_settings(&mut self, settings: RasterSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> RasterSettings {
        self.settings
    }

    /// Fill the render target with `color` and reset depth to `f32::MAX`
    pub fn clear_render_target(&mut self, color: C) -> Result<()> {
        self.clear_render_target_with_depth(color, f32::MAX)
    }

    pub fn clear_render_target_with_depth(&mut self, color: C, depth: f32) -> Result<()> {
        let target = self
            .render_target
            .as_mut()
            .ok_or(RasterError::NotConfigured("render target"))?;
        target.fill(color);
        if let Some(depth_buffer) = self.depth_buffer.as_mut() {
            depth_buffer.fill(depth);
        }
        Ok(())
    }

    /// Rasterize `count` indices of the bound index buffer starting at `start_index`.
    ///
    /// All validation happens before the first pixel is written, so a failed
    /// call leaves the render target untouched.
    pub fn draw(&mut self, count: usize, start_index: usize) -> Result<DrawStats> {
        let viewport = self.viewport.ok_or(RasterError::NotConfigured("viewport"))?;
        let target = self
            .render_target
            .as_mut()
            .ok_or(RasterError::NotConfigured("render target"))?;
        let vertex_buffer = self
            .vertex_buffer
            .as_ref()
            .ok_or(RasterError::NotConfigured("vertex buffer"))?;
        let index_buffer = self
            .index_buffer
            .as_ref()
            .ok_or(RasterError::NotConfigured("index buffer"))?;
        let vertex_shader = self
            .vertex_shader
            .as_ref()
            .ok_or(RasterError::NotConfigured("vertex shader"))?;
        let pixel_shader = self
            .pixel_shader
            .as_ref()
            .ok_or(RasterError::NotConfigured("pixel shader"))?;

        check_dimensions(viewport, target.dimensions())?;
        if let Some(depth) = &self.depth_buffer {
            check_dimensions(viewport, depth.dimensions())?;
        }

        let indices = index_buffer.range(start_index, count)?;
        check_indices(indices, vertex_buffer.len())?;

        let mut depth_buffer = self.depth_buffer.as_mut();
        let settings = self.settings;
        let (width, height) = viewport.dimensions();
        let mut stats = DrawStats::default();

        for tri in indices.chunks_exact(3) {
            stats.triangles += 1;

            let clip = [tri[0], tri[1], tri[2]].map(|i| {
                let vertex = &vertex_buffer.as_slice()[i as usize];
                let (position, data) = vertex_shader(vertex.position().extend(1.0), vertex);
                ClipVertex::new(position, data)
            });

            if clip.iter().any(outside_near) {
                stats.clipped += 1;
            }
            let polygon = clip_near(&clip);

            for piece in fan(&polygon) {
                let screen = piece.map(|v| viewport.to_screen(v));
                let signed_area =
                    edge_function(screen[0].position, screen[1].position, screen[2].position);
                if is_culled(settings.cull_mode, signed_area) {
                    stats.culled += 1;
                    continue;
                }
                let Some(setup) = TriangleSetup::new(screen) else {
                    stats.degenerate += 1;
                    continue;
                };

                setup.for_each_fragment(width, height, settings.perspective_correct, |frag| {
                    if let Some(depth) = depth_buffer.as_deref_mut() {
                        // Unordered (NaN) depths are rejected too
                        let stored = depth.get(frag.x, frag.y)?;
                        if frag.depth.partial_cmp(&stored) != Some(Ordering::Less) {
                            stats.depth_rejected += 1;
                            return Ok(());
                        }
                        depth.set(frag.x, frag.y, frag.depth)?;
                    }
                    stats.fragments += 1;
                    target.set(frag.x, frag.y, pixel_shader(&frag.data, frag.depth))
                })?;
            }
        }

        log::debug!(
            "draw({count}, {start_index}): {} triangles, {} fragments, {} degenerate, {} culled",
            stats.triangles,
            stats.fragments,
            stats.degenerate,
            stats.culled
        );
        Ok(stats)
    }
}

fn check_dimensions(viewport: Viewport, target: (usize, usize)) -> Result<()> {
    if viewport.dimensions() != target {
        return Err(RasterError::DimensionMismatch {
            viewport: viewport.dimensions(),
            target,
        });
    }
    Ok(())
}

/// Screen space is Y-down, so positive screen area is clockwise in NDC
fn is_culled(mode: CullMode, signed_area: f32) -> bool {
    match mode {
        CullMode::None => false,
        CullMode::Back => signed_area > 0.0,
        CullMode::Front => signed_area < 0.0,
    }
}
