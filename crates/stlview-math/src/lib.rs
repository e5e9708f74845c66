#![warn(missing_docs)]

//! Math types for the stlview mesh pipeline.
//!
//! Thin wrappers around nalgebra in single precision, matching the 32-bit
//! floats stored in STL files and uploaded to the GPU.

use nalgebra::{Matrix4, Vector4};
use serde::{Deserialize, Serialize};

/// A point in 3D model space.
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D model space.
pub type Vec3 = nalgebra::Vector3<f32>;

/// Lengths below this are treated as zero when normalizing.
pub const EPSILON: f32 = 1e-12;

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f32>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f32, dy: f32, dz: f32) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Uniform scale by `s` on all three axes.
    pub fn uniform_scale(s: f32) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = s;
        m[(1, 1)] = s;
        m[(2, 2)] = s;
        Self { matrix: m }
    }

    /// Rotation about a coordinate axis by `degrees`.
    ///
    /// Positive angles rotate counter-clockwise when looking down the axis
    /// towards the origin.
    pub fn rotation(axis: Axis, degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        let mut m = Matrix4::identity();
        match axis {
            Axis::X => {
                m[(1, 1)] = c;
                m[(1, 2)] = -s;
                m[(2, 1)] = s;
                m[(2, 2)] = c;
            }
            Axis::Y => {
                m[(0, 0)] = c;
                m[(0, 2)] = s;
                m[(2, 0)] = -s;
                m[(2, 2)] = c;
            }
            Axis::Z => {
                m[(0, 0)] = c;
                m[(0, 1)] = -s;
                m[(1, 0)] = s;
                m[(1, 1)] = c;
            }
        }
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// The resulting transform applies `other` first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Column-major element array, the layout GL and wgpu uniforms expect.
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.matrix.as_slice());
        out
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has no
/// measurable length.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len = v.norm();
    if len > EPSILON && len.is_finite() {
        v / len
    } else {
        Vec3::zeros()
    }
}
