//! Shared numeric routines used by both STL parsers.
//!
//! Everything here is either a pure function over triangle corners or the
//! [`Accumulator`], a scratch value owned by a single parse that folds each
//! vertex into running bounds and coordinate sums.

use serde::{Deserialize, Serialize};
use stlview_math::{normalize_or_zero, Vec3};

use crate::{Triangle, Vertex};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner `[min_x, min_y, min_z]`.
    pub min: [f32; 3],
    /// Maximum corner `[max_x, max_y, max_z]`.
    pub max: [f32; 3],
}

impl Bounds {
    /// Degenerate bounds enclosing a single point.
    pub fn from_point(p: Vertex) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the bounds to include `p`.
    pub fn include(&mut self, p: Vertex) {
        for i in 0..3 {
            if p[i] < self.min[i] {
                self.min[i] = p[i];
            }
            if p[i] > self.max[i] {
                self.max[i] = p[i];
            }
        }
    }

    /// Shift both corners by `delta`.
    pub fn offset(&mut self, delta: Vertex) {
        for i in 0..3 {
            self.min[i] += delta[i];
            self.max[i] += delta[i];
        }
    }

    /// Extent per axis: `max - min`.
    pub fn extents(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Largest of the three extents.
    pub fn largest_extent(&self) -> f32 {
        let [w, h, d] = self.extents();
        w.max(h).max(d)
    }

    /// Minimum X coordinate.
    pub fn min_x(&self) -> f32 {
        self.min[0]
    }

    /// Maximum X coordinate.
    pub fn max_x(&self) -> f32 {
        self.max[0]
    }

    /// Minimum Y coordinate.
    pub fn min_y(&self) -> f32 {
        self.min[1]
    }

    /// Maximum Y coordinate.
    pub fn max_y(&self) -> f32 {
        self.max[1]
    }

    /// Minimum Z coordinate.
    pub fn min_z(&self) -> f32 {
        self.min[2]
    }

    /// Maximum Z coordinate.
    pub fn max_z(&self) -> f32 {
        self.max[2]
    }
}

/// Signed volume of the tetrahedron spanned by the origin and a triangle.
///
/// Summed over a closed, consistently wound mesh this yields the enclosed
/// volume (divergence theorem). The sign follows the winding.
pub fn signed_volume(a: Vertex, b: Vertex, c: Vertex) -> f64 {
    let [x1, y1, z1] = a.map(f64::from);
    let [x2, y2, z2] = b.map(f64::from);
    let [x3, y3, z3] = c.map(f64::from);
    (-x3 * y2 * z1 + x2 * y3 * z1 + x3 * y1 * z2 - x1 * y3 * z2 - x2 * y1 * z3
        + x1 * y2 * z3)
        / 6.0
}

/// Unit normal of a counter-clockwise triangle.
///
/// Degenerate (zero-area) triangles yield `[0.0, 0.0, 0.0]` instead of NaN.
pub fn triangle_normal(a: Vertex, b: Vertex, c: Vertex) -> Vertex {
    let a = Vec3::from(a);
    let n = (Vec3::from(b) - a).cross(&(Vec3::from(c) - a));
    normalize_or_zero(n).into()
}

/// Running bounds, coordinate sums and signed volume for one parse.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    bounds: Option<Bounds>,
    sums: [f64; 3],
    vertex_count: usize,
    signed_volume: f64,
}

/// Finalized statistics produced by [`Accumulator::finish`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Bounding box of every folded vertex.
    pub bounds: Bounds,
    /// Arithmetic mean of every folded vertex.
    pub center_of_mass: Vertex,
    /// Absolute value of the summed signed volume.
    pub volume: f32,
    /// Number of folded vertices.
    pub vertex_count: usize,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one vertex into the bounds and coordinate sums.
    pub fn add_vertex(&mut self, p: Vertex) {
        match &mut self.bounds {
            Some(bounds) => bounds.include(p),
            None => self.bounds = Some(Bounds::from_point(p)),
        }
        for i in 0..3 {
            self.sums[i] += f64::from(p[i]);
        }
        self.vertex_count += 1;
    }

    /// Fold a whole triangle: its three vertices and its signed volume.
    pub fn add_triangle(&mut self, tri: &Triangle) {
        for &v in tri {
            self.add_vertex(v);
        }
        self.signed_volume += signed_volume(tri[0], tri[1], tri[2]);
    }

    /// Number of vertices folded so far.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Finalize into a [`Summary`], or `None` if no vertex was ever folded.
    pub fn finish(&self) -> Option<Summary> {
        let bounds = self.bounds?;
        if self.vertex_count == 0 {
            return None;
        }
        let n = self.vertex_count as f64;
        Some(Summary {
            bounds,
            center_of_mass: [
                (self.sums[0] / n) as f32,
                (self.sums[1] / n) as f32,
                (self.sums[2] / n) as f32,
            ],
            volume: self.signed_volume.abs() as f32,
            vertex_count: self.vertex_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_signed_volume_unit_tetrahedron() {
        let v = signed_volume([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(v, 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_signed_volume_flips_with_winding() {
        let a = signed_volume([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]);
        let b = signed_volume([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(a, -b, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_normal_ccw() {
        let n = triangle_normal([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(n, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_triangle_normal_is_unit_length() {
        let n = triangle_normal([0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 0.0, 5.0]);
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert_abs_diff_eq!(len, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(n[1], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_triangle_normal_degenerate_is_zero() {
        // Collinear points
        let n = triangle_normal([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]);
        assert_eq!(n, [0.0, 0.0, 0.0]);
        // Coincident points
        let n = triangle_normal([4.0, 4.0, 4.0], [4.0, 4.0, 4.0], [4.0, 4.0, 4.0]);
        assert!(n.iter().all(|c| !c.is_nan()));
    }

    #[test]
    fn test_bounds_initialized_from_first_vertex() {
        let mut acc = Accumulator::new();
        acc.add_vertex([5.0, -2.0, 3.0]);
        let s = acc.finish().unwrap();
        assert_eq!(s.bounds.min, [5.0, -2.0, 3.0]);
        assert_eq!(s.bounds.max, [5.0, -2.0, 3.0]);
    }

    #[test]
    fn test_accumulator_bounds_and_center() {
        let mut acc = Accumulator::new();
        acc.add_triangle(&[[0.0, 0.0, 0.0], [3.0, 0.0, -1.0], [0.0, 6.0, 4.0]]);
        let s = acc.finish().unwrap();
        assert_eq!(s.vertex_count, 3);
        assert_eq!(s.bounds.min, [0.0, 0.0, -1.0]);
        assert_eq!(s.bounds.max, [3.0, 6.0, 4.0]);
        assert_eq!(s.bounds.extents(), [3.0, 6.0, 5.0]);
        assert_abs_diff_eq!(s.center_of_mass[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(s.center_of_mass[1], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(s.center_of_mass[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_accumulator_has_no_summary() {
        assert!(Accumulator::new().finish().is_none());
    }
}
