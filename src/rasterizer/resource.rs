//! Dense 2D resources: render targets and depth buffers

use crate::error::{RasterError, Result};

/// A width x height grid of elements stored row-major.
///
/// Pixel (x, y) lives at offset `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy + Default> Resource<T> {
    /// Allocate a resource with every cell set to `T::default()`
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, T::default())
    }
}

impl<T: Copy> Resource<T> {
    /// Allocate a resource with every cell set to `value`
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data: vec![value; width * height],
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row size in bytes
    pub fn stride(&self) -> usize {
        self.width * std::mem::size_of::<T>()
    }

    /// All elements, row-major
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.width)
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(RasterError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Result<T> {
        let idx = self.offset(x, y)?;
        Ok(self.data[idx])
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<()> {
        let idx = self.offset(x, y)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Set every cell to `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Color;

    #[test]
    fn test_new_rejects_zero_size() {
        assert_eq!(
            Resource::<u8>::new(0, 4),
            Err(RasterError::InvalidDimensions { width: 0, height: 4 })
        );
    }

    #[test]
    fn test_set_get_row_major() {
        let mut res = Resource::<Color>::new(3, 2).unwrap();
        res.set(2, 1, Color::RED).unwrap();
        assert_eq!(res.get(2, 1).unwrap(), Color::RED);
        assert_eq!(res.data()[3 + 2], Color::RED);
        assert_eq!(res.get(0, 0).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut res = Resource::<f32>::filled(2, 2, f32::MAX).unwrap();
        assert!(matches!(res.get(2, 0), Err(RasterError::OutOfBounds { x: 2, .. })));
        assert!(matches!(res.set(0, 2, 0.0), Err(RasterError::OutOfBounds { y: 2, .. })));
    }

    #[test]
    fn test_fill_and_stride() {
        let mut res = Resource::<Color>::new(5, 4).unwrap();
        res.fill(Color::BLUE);
        assert!(res.data().iter().all(|c| *c == Color::BLUE));
        assert_eq!(res.stride(), 5 * 3);
        assert_eq!(res.rows().count(), 4);
        assert_eq!(res.len(), 20);
    }
}
