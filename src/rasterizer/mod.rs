//! Software rasterizer
//!
//! Features:
//! - User-supplied vertex and pixel shaders
//! - Near-plane clipping in homogeneous space
//! - Edge-function scan conversion with a top-left fill rule
//! - Z-buffer or painter's order
//! - Affine or perspective-correct attribute interpolation

mod buffer;
mod math;
mod render;
mod resource;
mod types;
mod viewport;

pub use buffer::*;
pub use math::*;
pub use render::*;
pub use resource::*;
pub use types::*;
pub use viewport::*;
