//! Property-based tests for coverage and determinism.
#![allow(clippy::unwrap_used)]

mod common;

use bonnie_raster::rasterizer::{
    edge_function, Color, IndexBuffer, Rasterizer, Resource, Vec2, Vec3, Vertex, VertexBuffer,
};
use common::{bind_mesh, ndc_rasterizer, painted, reference_coverage};
use proptest::prelude::*;

const SIZE: usize = 24;

fn point() -> impl Strategy<Value = (f32, f32)> {
    (-1.2f32..1.2, -1.2f32..1.2)
}

fn ndc_area(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    edge_function(Vec2::new(a.0, a.1), Vec2::new(b.0, b.1), Vec2::new(c.0, c.1))
}

/// Draw one triangle alone and return its painted-pixel mask and fragment count
fn draw_alone(points: &[(f32, f32)], indices: Vec<u32>) -> (Vec<bool>, usize) {
    let (mut r, calls) = ndc_rasterizer(SIZE, SIZE);
    bind_mesh(&mut r, points, indices);
    let count = r.draw(3, 0).unwrap().fragments;
    assert_eq!(count, calls.get());
    (painted(r.render_target().unwrap()), count)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Shaded pixel count agrees with a brute-force scan of pixel centres
    #[test]
    fn coverage_matches_reference_scan(a in point(), b in point(), c in point()) {
        prop_assume!(ndc_area(a, b, c).abs() > 1e-3);

        let (_, count) = draw_alone(&[a, b, c], vec![0, 1, 2]);
        let (strict, inclusive) = reference_coverage(SIZE, SIZE, [a, b, c]);
        prop_assert!(
            strict <= count && count <= inclusive,
            "count {} outside [{}, {}]", count, strict, inclusive
        );
    }

    /// Two triangles on opposite sides of a shared edge never both claim a pixel
    #[test]
    fn shared_edge_pixels_claimed_once(a in point(), b in point(), c in point(), d in point()) {
        let (a, b) = if ndc_area(a, b, c) < 0.0 { (b, a) } else { (a, b) };
        // Reflect d through the midpoint of ab onto the other side
        let d = if ndc_area(a, b, d) > 0.0 { (a.0 + b.0 - d.0, a.1 + b.1 - d.1) } else { d };
        prop_assume!(ndc_area(a, b, c) > 1e-2);
        prop_assume!(ndc_area(a, b, d) < -1e-2);

        let points = [a, b, c, d];
        let (left, left_count) = draw_alone(&points, vec![0, 1, 2]);
        let (right, right_count) = draw_alone(&points, vec![0, 1, 3]);
        prop_assert!(left.iter().zip(&right).all(|(l, r)| !(*l && *r)));

        let (mut r, calls) = ndc_rasterizer(SIZE, SIZE);
        bind_mesh(&mut r, &points, vec![0, 1, 2, 0, 1, 3]);
        r.draw(6, 0).unwrap();
        prop_assert_eq!(calls.get(), left_count + right_count);

        let union = painted(r.render_target().unwrap());
        for i in 0..union.len() {
            prop_assert_eq!(union[i], left[i] || right[i]);
        }
    }

    /// Zero-area triangles never reach the pixel shader
    #[test]
    fn degenerate_triangles_shade_nothing(a in point(), b in point(), t in -2.0f32..2.0, dup in any::<bool>()) {
        // Either a repeated vertex or three points on one horizontal line
        let c = if dup { a } else { (a.0 + t, a.1) };
        let b = if dup { b } else { (b.0, a.1) };

        let (mut r, calls) = ndc_rasterizer(SIZE, SIZE);
        bind_mesh(&mut r, &[a, b, c], vec![0, 1, 2]);
        let stats = r.draw(3, 0).unwrap();
        prop_assert_eq!(calls.get(), 0);
        prop_assert_eq!(stats.fragments, 0);
    }

    /// Rendering the same configuration twice gives identical targets
    #[test]
    fn rendering_is_deterministic(
        tris in prop::collection::vec((point(), point(), point(), -1.0f32..1.0), 1..8)
    ) {
        let mut vertices = Vec::new();
        for (i, (a, b, c, z)) in tris.iter().enumerate() {
            let shade = Vec3::new((i % 3) as f32 / 2.0, 0.5, 1.0 - (i % 2) as f32);
            for p in [a, b, c] {
                vertices.push(Vertex::from_pos(p.0, p.1, *z).with_diffuse(shade));
            }
        }
        let indices: Vec<u32> = (0..vertices.len() as u32).collect();
        let vb = VertexBuffer::new(vertices);
        let ib = IndexBuffer::new(indices);

        let render = || {
            let mut r: Rasterizer<Vertex, Color> = Rasterizer::new();
            r.set_viewport(SIZE, SIZE).unwrap();
            r.set_render_target(Resource::new(SIZE, SIZE).unwrap());
            r.set_depth_buffer(Some(Resource::new(SIZE, SIZE).unwrap()));
            r.clear_render_target(Color::BLACK).unwrap();
            r.set_vertex_shader(|p, v: &Vertex| (p, *v));
            r.set_pixel_shader(|v: &Vertex, _| Color::from_vec3(v.diffuse));
            r.set_vertex_buffer(vb.clone());
            r.set_index_buffer(ib.clone());
            let stats = r.draw(ib.len(), 0).unwrap();
            (r.take_render_target().unwrap(), r.take_depth_buffer().unwrap(), stats)
        };

        let first = render();
        let second = render();
        prop_assert_eq!(first.0, second.0);
        prop_assert_eq!(first.2, second.2);
        prop_assert!(first.1.data().iter().zip(second.1.data()).all(|(a, b)| a.to_bits() == b.to_bits()));
    }
}
