//! Wavefront OBJ / MTL reader
//!
//! Supports `v`, `vt`, `vn`, `f`, `o`, `g`, `mtllib` and `usemtl`. Each
//! object or group becomes one mesh part. Polygons are fan-triangulated and
//! faces without normals get a flat face normal.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::SplitWhitespace;

use super::model::{MeshPart, Model, ModelError};
use crate::rasterizer::{Vec2, Vec3, Vertex};

/// Colors read from an MTL `newmtl` block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub emissive: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            emissive: Vec3::ZERO,
        }
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ModelError {
    ModelError::Obj {
        line,
        message: message.into(),
    }
}

fn parse_float(token: Option<&str>, line: usize) -> Result<f32, ModelError> {
    let token = token.ok_or_else(|| parse_error(line, "missing component"))?;
    token
        .parse::<f32>()
        .map_err(|_| parse_error(line, format!("invalid number '{}'", token)))
}

fn parse_vec3(tokens: &mut SplitWhitespace, line: usize) -> Result<Vec3, ModelError> {
    Ok(Vec3::new(
        parse_float(tokens.next(), line)?,
        parse_float(tokens.next(), line)?,
        parse_float(tokens.next(), line)?,
    ))
}

/// Resolve a 1-based (or negative, relative) OBJ index into a 0-based one
fn resolve_index(token: &str, len: usize, line: usize) -> Result<usize, ModelError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| parse_error(line, format!("invalid index '{}'", token)))?;

    let resolved = match raw {
        0 => return Err(parse_error(line, "index 0 is not valid in OBJ")),
        i if i > 0 => (i - 1) as usize,
        i => {
            let back = i.unsigned_abs() as usize;
            if back > len {
                return Err(parse_error(line, format!("relative index {} before start", i)));
            }
            len - back
        }
    };

    if resolved >= len {
        return Err(parse_error(
            line,
            format!("index {} out of range ({} defined)", raw, len),
        ));
    }
    Ok(resolved)
}

/// Parse MTL source into a name -> material table
pub fn parse_mtl(source: &str) -> Result<HashMap<String, Material>, ModelError> {
    let mut materials = HashMap::new();
    let mut current: Option<(String, Material)> = None;

    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        let Some(keyword) = tokens.next() else { continue };

        match keyword {
            "newmtl" => {
                if let Some((name, mat)) = current.take() {
                    materials.insert(name, mat);
                }
                let name = tokens
                    .next()
                    .ok_or_else(|| parse_error(line, "newmtl without a name"))?;
                current = Some((name.to_string(), Material::default()));
            }
            "Ka" | "Kd" | "Ke" => {
                let (_, mat) = current
                    .as_mut()
                    .ok_or_else(|| parse_error(line, format!("{} before newmtl", keyword)))?;
                let color = parse_vec3(&mut tokens, line)?;
                match keyword {
                    "Ka" => mat.ambient = color,
                    "Kd" => mat.diffuse = color,
                    _ => mat.emissive = color,
                }
            }
            _ => {}
        }
    }

    if let Some((name, mat)) = current {
        materials.insert(name, mat);
    }
    Ok(materials)
}

/// Accumulates one part while scanning faces
struct PartBuilder {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl PartBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }
}

/// Parse OBJ source. `load_mtl` is called with each `mtllib` file name.
pub fn parse_obj_with<F>(source: &str, name: &str, mut load_mtl: F) -> Result<Model, ModelError>
where
    F: FnMut(&str) -> Result<HashMap<String, Material>, ModelError>,
{
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut texcoords: Vec<Vec2> = Vec::new();
    let mut materials: HashMap<String, Material> = HashMap::new();
    let mut material = Material::default();

    let mut finished: Vec<PartBuilder> = Vec::new();
    let mut part = PartBuilder::new(name);

    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        let Some(keyword) = tokens.next() else { continue };

        match keyword {
            "v" => positions.push(parse_vec3(&mut tokens, line)?),
            "vn" => normals.push(parse_vec3(&mut tokens, line)?),
            "vt" => {
                let u = parse_float(tokens.next(), line)?;
                let v = parse_float(tokens.next(), line)?;
                texcoords.push(Vec2::new(u, v));
            }
            "o" | "g" => {
                let group = tokens.collect::<Vec<_>>().join(" ");
                let group = if group.is_empty() { name.to_string() } else { group };
                if part.indices.is_empty() {
                    part.name = group;
                } else {
                    finished.push(std::mem::replace(&mut part, PartBuilder::new(&group)));
                }
            }
            "mtllib" => {
                for lib in tokens {
                    materials.extend(load_mtl(lib)?);
                }
            }
            "usemtl" => {
                let mat_name = tokens.next().unwrap_or_default();
                material = match materials.get(mat_name) {
                    Some(m) => *m,
                    None => {
                        log::warn!("line {}: unknown material '{}'", line, mat_name);
                        Material::default()
                    }
                };
            }
            "f" => {
                let mut corners = Vec::new();
                for corner in tokens {
                    let mut fields = corner.split('/');
                    let p = fields
                        .next()
                        .ok_or_else(|| parse_error(line, "empty face corner"))?;
                    let p = resolve_index(p, positions.len(), line)?;
                    let t = match fields.next() {
                        Some(s) if !s.is_empty() => Some(resolve_index(s, texcoords.len(), line)?),
                        _ => None,
                    };
                    let n = match fields.next() {
                        Some(s) if !s.is_empty() => Some(resolve_index(s, normals.len(), line)?),
                        _ => None,
                    };
                    corners.push((p, t, n));
                }

                if corners.len() < 3 {
                    return Err(parse_error(
                        line,
                        format!("face has {} vertices, need at least 3", corners.len()),
                    ));
                }

                let p0 = positions[corners[0].0];
                let face_normal = (positions[corners[1].0] - p0)
                    .cross(positions[corners[2].0] - p0)
                    .normalize();

                let base = part.vertices.len() as u32;
                for &(p, t, n) in &corners {
                    let mut v = Vertex::new(
                        positions[p],
                        n.map(|n| normals[n]).unwrap_or(face_normal),
                        t.map(|t| texcoords[t]).unwrap_or(Vec2::ZERO),
                    );
                    v.ambient = material.ambient;
                    v.diffuse = material.diffuse;
                    v.emissive = material.emissive;
                    part.vertices.push(v);
                }
                for k in 1..corners.len() as u32 - 1 {
                    part.indices.extend_from_slice(&[base, base + k, base + k + 1]);
                }
            }
            _ => {}
        }
    }
    finished.push(part);

    let parts = finished
        .into_iter()
        .filter(|p| !p.indices.is_empty())
        .map(|p| MeshPart::new(&p.name, p.vertices, p.indices))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Model::new(name, parts))
}

/// Parse OBJ source that references no material libraries
pub fn parse_obj(source: &str, name: &str) -> Result<Model, ModelError> {
    parse_obj_with(source, name, |lib| {
        log::warn!("ignoring material library '{}'", lib);
        Ok(HashMap::new())
    })
}

/// Load an OBJ file, resolving `mtllib` next to it. A missing MTL file is
/// logged and treated as empty.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Model, ModelError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());

    parse_obj_with(&source, &name, |lib| {
        let mtl_path = dir.join(lib);
        match fs::read_to_string(&mtl_path) {
            Ok(text) => parse_mtl(&text),
            Err(e) => {
                log::warn!("could not read {}: {}", mtl_path.display(), e);
                Ok(HashMap::new())
            }
        }
    })
}
