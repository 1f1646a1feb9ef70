//! Bonnie Raster: CPU software rasterization pipeline
//!
//! Turns triangle meshes plus a camera into a color image without a GPU:
//! - Vertex/index buffers bound per mesh part
//! - User-supplied vertex and pixel shader closures
//! - Near-plane clipping, top-left fill rule, optional depth test
//! - OBJ / RON model loading and PNG/BMP/JPEG output

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod logging;
pub mod output;
pub mod rasterizer;
pub mod renderer;
pub mod settings;
pub mod world;

pub use error::{RasterError, Result};
pub use renderer::{RasterizationRenderer, RendererError};
pub use settings::Settings;
