//! World module - the scene side of rendering
//!
//! - Camera pose and matrix derivation
//! - Models split into parts, each with its own vertex/index buffers
//! - OBJ and RON model loading

mod camera;
mod model;
pub mod obj;

pub use camera::*;
pub use model::*;
