//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use bonnie_raster::rasterizer::{
    edge_function, Color, IndexBuffer, Rasterizer, Resource, Vec2, Vec3, Vertex, VertexBuffer,
};

/// Rasterizer with an identity vertex shader (positions are already NDC),
/// a black target and a white pixel shader that counts its invocations.
pub fn ndc_rasterizer(width: usize, height: usize) -> (Rasterizer<Vertex, Color>, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();

    let mut r = Rasterizer::new();
    r.set_viewport(width, height).unwrap();
    r.set_render_target(Resource::filled(width, height, Color::BLACK).unwrap());
    r.set_vertex_shader(|p, v: &Vertex| (p, *v));
    r.set_pixel_shader(move |_, _| {
        counter.set(counter.get() + 1);
        Color::WHITE
    });
    (r, calls)
}

/// Bind a mesh given as 2D NDC points (z = 0)
pub fn bind_mesh(r: &mut Rasterizer<Vertex, Color>, points: &[(f32, f32)], indices: Vec<u32>) {
    let vertices: Vec<Vertex> = points.iter().map(|&(x, y)| Vertex::from_pos(x, y, 0.0)).collect();
    r.set_vertex_buffer(VertexBuffer::new(vertices));
    r.set_index_buffer(IndexBuffer::new(indices));
}

pub fn vertex_at(x: f32, y: f32, z: f32) -> Vertex {
    Vertex::from_pos(x, y, z)
}

pub fn colored(x: f32, y: f32, z: f32, color: Vec3) -> Vertex {
    Vertex::from_pos(x, y, z).with_diffuse(color)
}

/// Pixels that are not the clear color
pub fn painted(target: &Resource<Color>) -> Vec<bool> {
    target.data().iter().map(|c| *c != Color::BLACK).collect()
}

pub fn to_screen(width: usize, height: usize, (x, y): (f32, f32)) -> Vec2 {
    Vec2::new(
        (x * 0.5 + 0.5) * width as f32,
        (1.0 - (y * 0.5 + 0.5)) * height as f32,
    )
}

/// Independent brute-force scan of every pixel centre.
///
/// Returns (strictly inside, inside or on an edge) counts with a small
/// tolerance; any fill rule must land between the two.
pub fn reference_coverage(width: usize, height: usize, tri: [(f32, f32); 3]) -> (usize, usize) {
    const EPS: f32 = 1e-2;
    let [a, b, c] = tri.map(|p| to_screen(width, height, p));
    let sign = if edge_function(a, b, c) < 0.0 { -1.0 } else { 1.0 };

    let mut strict = 0;
    let mut inclusive = 0;
    for y in 0..height {
        for x in 0..width {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w = [
                sign * edge_function(b, c, p),
                sign * edge_function(c, a, p),
                sign * edge_function(a, b, p),
            ];
            if w.iter().all(|&e| e > EPS) {
                strict += 1;
            }
            if w.iter().all(|&e| e >= -EPS) {
                inclusive += 1;
            }
        }
    }
    (strict, inclusive)
}
