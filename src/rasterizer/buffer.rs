//! Immutable geometry buffers
//!
//! Buffers are built once per mesh part and shared with the rasterizer by
//! handle; cloning a buffer never copies its contents.

use std::sync::Arc;
use crate::error::{RasterError, Result};

/// Ordered, immutable sequence of per-vertex records
#[derive(Debug)]
pub struct VertexBuffer<V> {
    data: Arc<[V]>,
}

impl<V> Clone for VertexBuffer<V> {
    fn clone(&self) -> Self {
        Self { data: Arc::clone(&self.data) }
    }
}

impl<V> VertexBuffer<V> {
    pub fn new(vertices: Vec<V>) -> Self {
        Self { data: vertices.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&V> {
        self.data.get(index)
    }

    pub fn as_slice(&self) -> &[V] {
        &self.data
    }
}

impl<V> From<Vec<V>> for VertexBuffer<V> {
    fn from(vertices: Vec<V>) -> Self {
        Self::new(vertices)
    }
}

/// Ordered, immutable sequence of vertex indices; every 3 form a triangle
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    data: Arc<[u32]>,
}

impl IndexBuffer {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { data: indices.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.data.len() / 3
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// The `count` indices starting at `start`, checked against the buffer
    /// length and the multiple-of-three rule
    pub fn range(&self, start: usize, count: usize) -> Result<&[u32]> {
        let end = start.checked_add(count);
        match end {
            Some(end) if count % 3 == 0 && end <= self.data.len() => Ok(&self.data[start..end]),
            _ => Err(RasterError::InvalidRange {
                start,
                count,
                len: self.data.len(),
            }),
        }
    }

    /// Check that every index addresses one of `vertex_count` vertices
    pub fn validate(&self, vertex_count: usize) -> Result<()> {
        check_indices(&self.data, vertex_count)
    }
}

impl From<Vec<u32>> for IndexBuffer {
    fn from(indices: Vec<u32>) -> Self {
        Self::new(indices)
    }
}

pub(crate) fn check_indices(indices: &[u32], vertex_count: usize) -> Result<()> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(RasterError::IndexOutOfRange { index, vertex_count }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_storage() {
        let vb = VertexBuffer::new(vec![1.0f32, 2.0, 3.0]);
        let other = vb.clone();
        assert!(Arc::ptr_eq(&vb.data, &other.data));
        assert_eq!(other.get(2), Some(&3.0));
    }

    #[test]
    fn test_range_checks() {
        let ib = IndexBuffer::new(vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(ib.range(0, 6).unwrap(), &[0, 1, 2, 2, 1, 3]);
        assert_eq!(ib.range(3, 3).unwrap(), &[2, 1, 3]);
        assert!(matches!(ib.range(3, 6), Err(RasterError::InvalidRange { .. })));
        assert!(matches!(ib.range(0, 4), Err(RasterError::InvalidRange { .. })));
        assert!(matches!(ib.range(usize::MAX, 3), Err(RasterError::InvalidRange { .. })));
        assert_eq!(ib.range(6, 0).unwrap(), &[] as &[u32]);
    }

    #[test]
    fn test_validate_indices() {
        let ib = IndexBuffer::new(vec![0, 1, 4]);
        assert!(ib.validate(5).is_ok());
        assert_eq!(
            ib.validate(4),
            Err(RasterError::IndexOutOfRange { index: 4, vertex_count: 4 })
        );
    }
}
