//! Writing render targets to image files

use std::path::Path;

use image::RgbImage;
use thiserror::Error;

use crate::rasterizer::{Color, Resource};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("target of {width}x{height} is too large for an image")]
    Size { width: usize, height: usize },
}

/// Pack a color target into tightly packed RGB8 rows, top row first
pub fn to_rgb_bytes(target: &Resource<Color>) -> Vec<u8> {
    target.data().iter().flat_map(|c| c.to_bytes()).collect()
}

/// Build an `image` buffer from a color target
pub fn to_image(target: &Resource<Color>) -> Result<RgbImage, OutputError> {
    let (width, height) = target.dimensions();
    let size_err = || OutputError::Size { width, height };
    let w = u32::try_from(width).map_err(|_| size_err())?;
    let h = u32::try_from(height).map_err(|_| size_err())?;
    RgbImage::from_raw(w, h, to_rgb_bytes(target)).ok_or_else(size_err)
}

/// Save a color target. The format follows the file extension.
pub fn save_resource<P: AsRef<Path>>(target: &Resource<Color>, path: P) -> Result<(), OutputError> {
    let path = path.as_ref();
    to_image(target)?.save(path)?;
    log::info!(
        "Saved {}x{} image to {}",
        target.width(),
        target.height(),
        path.display()
    );
    Ok(())
}
