//! Meshes split into drawable parts
//!
//! Each part owns one vertex buffer / index buffer pair. Models load from
//! Wavefront OBJ or from RON files describing the parts directly.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::RasterError;
use crate::rasterizer::{IndexBuffer, Vec2, Vec3, Vertex, VertexBuffer};

/// Error type for model loading
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ parse error at line {line}: {message}")]
    Obj { line: usize, message: String },

    #[error("Parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("index buffer of part '{part}' has {len} indices, not a multiple of 3")]
    RaggedIndices { part: String, len: usize },

    #[error("part '{part}': {source}")]
    Indices {
        part: String,
        #[source]
        source: RasterError,
    },

    #[error("model has no triangles")]
    Empty,

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
}

/// One drawable piece of a model
#[derive(Debug, Clone)]
pub struct MeshPart {
    pub name: String,
    vertex_buffer: VertexBuffer<Vertex>,
    index_buffer: IndexBuffer,
}

impl MeshPart {
    /// Build a part, checking the index buffer against the vertices
    pub fn new(name: &str, vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, ModelError> {
        if indices.len() % 3 != 0 {
            return Err(ModelError::RaggedIndices {
                part: name.to_string(),
                len: indices.len(),
            });
        }
        let index_buffer = IndexBuffer::new(indices);
        index_buffer
            .validate(vertices.len())
            .map_err(|source| ModelError::Indices { part: name.to_string(), source })?;

        Ok(Self {
            name: name.to_string(),
            vertex_buffer: VertexBuffer::new(vertices),
            index_buffer,
        })
    }

    pub fn vertex_buffer(&self) -> &VertexBuffer<Vertex> {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &IndexBuffer {
        &self.index_buffer
    }

    pub fn triangle_count(&self) -> usize {
        self.index_buffer.triangle_count()
    }

    /// Calculate bounding box of this part
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let vertices = self.vertex_buffer.as_slice();
        let first = vertices.first()?.position;

        Some(vertices.iter().fold((first, first), |(mut min, mut max), v| {
            let p = v.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
            (min, max)
        }))
    }
}

/// On-disk description of a part (RON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartDesc {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// On-disk description of a model (RON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDesc {
    pub name: String,
    pub parts: Vec<PartDesc>,
}

/// A loaded model: an ordered list of mesh parts
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    parts: Vec<MeshPart>,
}

impl Model {
    pub fn new(name: &str, parts: Vec<MeshPart>) -> Self {
        Self {
            name: name.to_string(),
            parts,
        }
    }

    /// Load a model, picking the format from the file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let model = match ext.as_str() {
            "obj" => super::obj::load_obj(path)?,
            "ron" => Self::from_ron_str(&fs::read_to_string(path)?)?,
            other => return Err(ModelError::UnsupportedFormat(other.to_string())),
        };

        if model.triangle_count() == 0 {
            return Err(ModelError::Empty);
        }
        log::info!(
            "Loaded model '{}' from {}: {} parts, {} triangles",
            model.name,
            path.display(),
            model.part_count(),
            model.triangle_count()
        );
        Ok(model)
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ModelError> {
        let desc: ModelDesc = ron::from_str(s)?;
        Self::from_desc(desc)
    }

    pub fn from_desc(desc: ModelDesc) -> Result<Self, ModelError> {
        let parts = desc
            .parts
            .into_iter()
            .map(|p| MeshPart::new(&p.name, p.vertices, p.indices))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(&desc.name, parts))
    }

    pub fn to_desc(&self) -> ModelDesc {
        ModelDesc {
            name: self.name.clone(),
            parts: self
                .parts
                .iter()
                .map(|p| PartDesc {
                    name: p.name.clone(),
                    vertices: p.vertex_buffer.as_slice().to_vec(),
                    indices: p.index_buffer.as_slice().to_vec(),
                })
                .collect(),
        }
    }

    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn vertex_buffers(&self) -> impl Iterator<Item = &VertexBuffer<Vertex>> {
        self.parts.iter().map(|p| &p.vertex_buffer)
    }

    pub fn index_buffers(&self) -> impl Iterator<Item = &IndexBuffer> {
        self.parts.iter().map(|p| &p.index_buffer)
    }

    /// Total vertex count across all parts
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.vertex_buffer.len()).sum()
    }

    /// Total triangle count across all parts
    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.triangle_count()).sum()
    }

    /// Bounding box over all parts
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.parts
            .iter()
            .filter_map(MeshPart::bounds)
            .reduce(|(amin, amax), (bmin, bmax)| {
                (
                    Vec3::new(amin.x.min(bmin.x), amin.y.min(bmin.y), amin.z.min(bmin.z)),
                    Vec3::new(amax.x.max(bmax.x), amax.y.max(bmax.y), amax.z.max(bmax.z)),
                )
            })
    }

    pub fn center(&self) -> Vec3 {
        self.bounds()
            .map(|(min, max)| (min + max) * 0.5)
            .unwrap_or(Vec3::ZERO)
    }

    /// Two-triangle square spanning [-1, 1] in X and Y at z = 0
    pub fn quad() -> Self {
        let n = Vec3::new(0.0, 0.0, 1.0);
        let vertices = vec![
            Vertex::new(Vec3::new(-1.0, -1.0, 0.0), n, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(1.0, -1.0, 0.0), n, Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(1.0, 1.0, 0.0), n, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(-1.0, 1.0, 0.0), n, Vec2::new(0.0, 1.0)),
        ];
        let part = MeshPart {
            name: "quad".to_string(),
            vertex_buffer: VertexBuffer::new(vertices),
            index_buffer: IndexBuffer::new(vec![0, 1, 2, 0, 2, 3]),
        };
        Self::new("quad", vec![part])
    }

    /// Unit cube, one part per face pair, counter-clockwise from outside
    pub fn cube() -> Self {
        let positions = [
            // Front face
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            // Back face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            // Top face
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
            // Bottom face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            // Right face
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            // Left face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ];

        let faces = [
            ("front", Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.9, 0.2, 0.2)),
            ("back", Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.2, 0.9, 0.2)),
            ("top", Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.2, 0.2, 0.9)),
            ("bottom", Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.9, 0.9, 0.2)),
            ("right", Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.9, 0.2, 0.9)),
            ("left", Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.2, 0.9, 0.9)),
        ];

        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let parts = faces
            .iter()
            .enumerate()
            .map(|(face_idx, (name, normal, color))| {
                let base = face_idx * 4;
                let vertices = (0..4)
                    .map(|i| {
                        let mut v = Vertex::new(positions[base + i], *normal, uvs[i]);
                        v.diffuse = *color;
                        v.ambient = *color * 0.1;
                        v
                    })
                    .collect();
                MeshPart {
                    name: name.to_string(),
                    vertex_buffer: VertexBuffer::new(vertices),
                    index_buffer: IndexBuffer::new(vec![0, 1, 2, 0, 2, 3]),
                }
            })
            .collect();

        Self::new("cube", parts)
    }
}
