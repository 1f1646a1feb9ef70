//! Vector and matrix math for the pipeline
//!
//! Matrices are row-major and multiply column vectors: `m * v`.

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 2D Vector (texture coordinates, screen positions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        self.scale(1.0 / l)
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Extend to homogeneous coordinates
    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        self.scale(-1.0)
    }
}

/// Homogeneous 4D vector (clip space)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn lerp(self, other: Vec4, t: f32) -> Vec4 {
        Vec4 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
            w: self.w + (other.w - self.w) * t,
        }
    }
}

/// 4x4 matrix, row-major
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4(pub [[f32; 4]; 4]);

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub fn translation(t: Vec3) -> Self {
        Mat4([
            [1.0, 0.0, 0.0, t.x],
            [0.0, 1.0, 0.0, t.y],
            [0.0, 0.0, 1.0, t.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn scaling(s: Vec3) -> Self {
        Mat4([
            [s.x, 0.0, 0.0, 0.0],
            [0.0, s.y, 0.0, 0.0],
            [0.0, 0.0, s.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation from euler angles in degrees, applied Z * Y * X
    pub fn rotation(rot: Vec3) -> Self {
        let (sx, cx) = rot.x.to_radians().sin_cos();
        let (sy, cy) = rot.y.to_radians().sin_cos();
        let (sz, cz) = rot.z.to_radians().sin_cos();

        Mat4([
            [cy * cz, sx * sy * cz - cx * sz, cx * sy * cz + sx * sz, 0.0],
            [cy * sz, sx * sy * sz + cx * cz, cx * sy * sz - sx * cz, 0.0],
            [-sy, sx * cy, cx * cy, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed view matrix looking from `eye` along `forward`
    pub fn look_to(eye: Vec3, forward: Vec3, up: Vec3) -> Self {
        let f = forward.normalize();
        let r = f.cross(up).normalize();
        let u = r.cross(f);

        Mat4([
            [r.x, r.y, r.z, -r.dot(eye)],
            [u.x, u.y, u.z, -u.dot(eye)],
            [-f.x, -f.y, -f.z, f.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed perspective projection, depth mapped to [-1, 1]
    pub fn perspective(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y_deg.to_radians() * 0.5).tan();
        let range = near - far;

        Mat4([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (far + near) / range, 2.0 * far * near / range],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Matrix for transforming normals: the cofactor matrix of the upper
    /// 3x3, which is the inverse-transpose up to a positive scale. Callers
    /// normalize the result.
    pub fn normal_matrix(&self) -> Self {
        let m = &self.0;
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        let rows = [
            [cof(1, 2, 1, 2), -cof(1, 2, 0, 2), cof(1, 2, 0, 1)],
            [-cof(0, 2, 1, 2), cof(0, 2, 0, 2), -cof(0, 2, 0, 1)],
            [cof(0, 1, 1, 2), -cof(0, 1, 0, 2), cof(0, 1, 0, 1)],
        ];
        let det = m[0][0] * rows[0][0] + m[0][1] * rows[0][1] + m[0][2] * rows[0][2];
        // Mirroring transforms flip the cofactors; keep normals pointing out
        let sign = if det < 0.0 { -1.0 } else { 1.0 };

        let mut result = Mat4::IDENTITY;
        for (i, row) in rows.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                result.0[i][j] = cell * sign;
            }
        }
        result
    }

    pub fn transform(&self, v: Vec4) -> Vec4 {
        let m = &self.0;
        Vec4 {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3] * v.w,
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3] * v.w,
            z: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3] * v.w,
            w: m[3][0] * v.x + m[3][1] * v.y + m[3][2] * v.z + m[3][3] * v.w,
        }
    }

    /// Transform a direction (w = 0), ignoring translation
    pub fn transform_dir(&self, v: Vec3) -> Vec3 {
        self.transform(v.extend(0.0)).xyz()
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        let mut result = [[0.0; 4]; 4];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                for k in 0..4 {
                    *cell += self.0[i][k] * other.0[k][j];
                }
            }
        }
        Mat4(result)
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        self.transform(v)
    }
}

/// Signed parallelogram area of (a, b, p).
///
/// Positive when `p` lies on the interior side of the edge a->b for a
/// triangle with positive area in y-down screen space.
pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_mat4_identity_mul() {
        let t = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t * Mat4::IDENTITY, t);
        let p = t * Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(p, Vec4::new(2.0, 3.0, 4.0, 1.0));
    }

    #[test]
    fn test_perspective_maps_near_far() {
        let p = Mat4::perspective(60.0, 1.0, 0.1, 100.0);
        let near = p * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(near.z / near.w, -1.0, epsilon = 1e-4);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_look_to_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_to(eye, Vec3::new(0.0, 0.0, -1.0), Vec3::UP);
        let p = view * eye.extend(1.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-6);
        // Point in front of the camera lands on -Z
        let q = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(q.z, -5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_about_y() {
        let r = Mat4::rotation(Vec3::new(0.0, 90.0, 0.0));
        let v = r.transform_dir(Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(v.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_dir_ignores_translation() {
        let t = Mat4::translation(Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(t.transform_dir(Vec3::UP), Vec3::UP);
    }

    #[test]
    fn test_normal_matrix_keeps_normals_perpendicular() {
        // Non-uniform scale: a plain transform would tilt the normal
        let m = Mat4::rotation(Vec3::new(0.0, 0.0, 30.0)) * Mat4::scaling(Vec3::new(4.0, 1.0, 1.0));
        let tangent = m.transform_dir(Vec3::new(1.0, -1.0, 0.0));
        let normal = m.normal_matrix().transform_dir(Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(tangent.dot(normal), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_normal_matrix_of_rotation_is_rotation() {
        let r = Mat4::rotation(Vec3::new(0.0, 180.0, 0.0));
        let n = r.normal_matrix().transform_dir(Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(n.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_normal_matrix_mirror_keeps_orientation() {
        let mirror = Mat4::scaling(Vec3::new(-1.0, 1.0, 1.0));
        let n = mirror.normal_matrix().transform_dir(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(n.x, -1.0, epsilon = 1e-6);
    }
}
