//! Error types for the rasterization core.

use thiserror::Error;

/// Result type alias using [`RasterError`].
pub type Result<T> = std::result::Result<T, RasterError>;

/// Errors reported synchronously by the rasterizer and its resources.
///
/// Degenerate (zero area) triangles are never an error; they are skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Pixel coordinate outside the resource.
    #[error("pixel ({x}, {y}) out of bounds for {width}x{height} resource")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Draw range not a multiple of 3 or past the end of the index buffer.
    #[error("invalid draw range: start {start} + count {count} with {len} indices bound")]
    InvalidRange { start: usize, count: usize, len: usize },

    /// Viewport and a bound resource disagree on size.
    #[error("viewport is {}x{} but bound resource is {}x{}", .viewport.0, .viewport.1, .target.0, .target.1)]
    DimensionMismatch {
        viewport: (usize, usize),
        target: (usize, usize),
    },

    /// Index references a vertex past the end of the vertex buffer.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// A required binding is missing at draw time.
    #[error("rasterizer not configured: missing {0}")]
    NotConfigured(&'static str),

    /// Zero-sized viewport or resource.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}
