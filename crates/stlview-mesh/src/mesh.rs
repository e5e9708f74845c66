//! The parse result: flat vertex/normal buffers plus derived statistics.

use serde::{Deserialize, Serialize};
use stlview_math::{Axis, Point3, Transform, Vec3};

use crate::geometry::{Accumulator, Bounds, Summary};
use crate::{Triangle, Vertex};

/// Rotation about X applied by [`Mesh::init_model_matrix`] (degrees).
///
/// STL data is Z-up while display space is Y-up.
pub const MODEL_ROTATION_X: f32 = -90.0;

/// Rotation about Z applied by [`Mesh::init_model_matrix`] (degrees).
pub const MODEL_ROTATION_Z: f32 = 60.0;

/// A parsed, non-indexed triangle mesh.
///
/// Every triangle contributes three consecutive vertices and three copies
/// of its normal, so `vertices().len() == normals().len() == vertex_count()`
/// and `vertex_count() % 3 == 0`.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    normals: Vec<Vertex>,
    bounds: Bounds,
    center_of_mass: Vertex,
    volume: f32,
    bound_scale: f32,
    floor_offset: f32,
    model_matrix: Transform,
}

/// Serializable snapshot of a mesh's derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    /// Number of triangles.
    pub triangle_count: usize,
    /// Number of vertices (`3 * triangle_count`).
    pub vertex_count: usize,
    /// Axis-aligned bounding box.
    pub bounds: Bounds,
    /// Width, height and depth (`max - min` per axis).
    pub extents: [f32; 3],
    /// Arithmetic mean of all vertex coordinates.
    pub center_of_mass: [f32; 3],
    /// Enclosed volume (absolute value of the signed sum).
    pub volume: f32,
    /// Offset of the lowest point below the centroid after the model transform.
    pub floor_offset: f32,
}

impl Mesh {
    pub(crate) fn from_parts(vertices: Vec<Vertex>, normals: Vec<Vertex>, summary: Summary) -> Self {
        debug_assert_eq!(vertices.len(), normals.len());
        debug_assert_eq!(vertices.len() % 3, 0);
        Self {
            vertices,
            normals,
            bounds: summary.bounds,
            center_of_mass: summary.center_of_mass,
            volume: summary.volume,
            bound_scale: 1.0,
            floor_offset: 0.0,
            model_matrix: Transform::identity(),
        }
    }

    /// Number of vertices (three per triangle).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Flat vertex positions.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Flat per-vertex normals, index-aligned with [`vertices`](Self::vertices).
    pub fn normals(&self) -> &[Vertex] {
        &self.normals
    }

    /// Iterate over triangles as corner triples.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.vertices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Raw bytes of the vertex buffer (native-endian f32 triples).
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the normal buffer (native-endian f32 triples).
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// `max_x - min_x`.
    pub fn width(&self) -> f32 {
        self.bounds.extents()[0]
    }

    /// `max_y - min_y`.
    pub fn height(&self) -> f32 {
        self.bounds.extents()[1]
    }

    /// `max_z - min_z`.
    pub fn depth(&self) -> f32 {
        self.bounds.extents()[2]
    }

    /// Arithmetic mean of all vertex coordinates.
    pub fn center_of_mass(&self) -> Vertex {
        self.center_of_mass
    }

    /// Enclosed volume, meaningful for closed, consistently wound meshes.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Offset used to rest the model on a ground plane.
    ///
    /// Zero until [`init_model_matrix`](Self::init_model_matrix) is called.
    pub fn floor_offset(&self) -> f32 {
        self.floor_offset
    }

    /// Divisor applied to model coordinates by the model matrix.
    pub fn bound_scale(&self) -> f32 {
        self.bound_scale
    }

    /// Model-space transform computed by [`init_model_matrix`](Self::init_model_matrix).
    pub fn model_matrix(&self) -> &Transform {
        &self.model_matrix
    }

    /// Snapshot of the derived statistics.
    pub fn stats(&self) -> MeshStats {
        MeshStats {
            triangle_count: self.triangle_count(),
            vertex_count: self.vertex_count(),
            bounds: self.bounds,
            extents: self.bounds.extents(),
            center_of_mass: self.center_of_mass,
            volume: self.volume,
            floor_offset: self.floor_offset,
        }
    }

    /// Fit the model into a cube of side `bound_size` and orient it Y-up.
    ///
    /// The matrix is `Rx * Rz * S * T`: it moves the center of mass to the
    /// origin, scales uniformly by `1 / bound_scale`, spins the model about its
    /// own (Z-up) vertical axis and finally tips Z-up into Y-up. `bound_scale`
    /// is the largest extent divided by `bound_size`, or `1.0` when that is
    /// zero or not finite.
    pub fn init_model_matrix(&mut self, bound_size: f32) {
        let mut bound_scale = self.bounds.largest_extent() / bound_size;
        if !(bound_scale.is_finite() && bound_scale > 0.0) {
            bound_scale = 1.0;
        }
        let [cx, cy, cz] = self.center_of_mass;

        self.model_matrix = Transform::rotation(Axis::X, MODEL_ROTATION_X)
            .then(&Transform::rotation(Axis::Z, MODEL_ROTATION_Z))
            .then(&Transform::uniform_scale(1.0 / bound_scale))
            .then(&Transform::translation(-cx, -cy, -cz));
        self.bound_scale = bound_scale;
        self.floor_offset = (self.bounds.min_z() - cz) / bound_scale;
    }

    /// Shift every vertex by `(dx, dy, 0)` in model space.
    ///
    /// Bounds and center of mass move with the geometry. The model matrix
    /// keeps the origin it was initialized with, so the shift is visible.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.offset([dx, dy, 0.0]);
    }

    /// Move the geometry so its center of mass sits at the origin.
    pub fn recenter(&mut self) {
        let [cx, cy, cz] = self.center_of_mass;
        self.offset([-cx, -cy, -cz]);
        self.center_of_mass = [0.0; 3];
    }

    /// Rotate vertices and normals about the center of mass.
    pub fn rotate(&mut self, axis: Axis, degrees: f32) {
        let rotation = Transform::rotation(axis, degrees);
        let [cx, cy, cz] = self.center_of_mass;
        let about_center = Transform::translation(cx, cy, cz)
            .then(&rotation)
            .then(&Transform::translation(-cx, -cy, -cz));

        for v in &mut self.vertices {
            *v = about_center.apply_point(&Point3::from(*v)).coords.into();
        }
        for n in &mut self.normals {
            *n = rotation.apply_vec(&Vec3::from(*n)).into();
        }
        self.refresh_stats();
    }

    /// Scale uniformly about the center of mass so the largest extent equals
    /// `bound_size`. Degenerate meshes are left unchanged.
    pub fn scale_to_bound(&mut self, bound_size: f32) {
        let largest = self.bounds.largest_extent();
        if largest <= 0.0 || !bound_size.is_finite() || bound_size <= 0.0 {
            return;
        }
        let factor = bound_size / largest;
        let c = Vec3::from(self.center_of_mass);
        for v in &mut self.vertices {
            *v = (c + (Vec3::from(*v) - c) * factor).into();
        }
        self.refresh_stats();
    }

    fn offset(&mut self, delta: Vertex) {
        for v in &mut self.vertices {
            for i in 0..3 {
                v[i] += delta[i];
            }
        }
        self.bounds.offset(delta);
        for i in 0..3 {
            self.center_of_mass[i] += delta[i];
        }
    }

    fn refresh_stats(&mut self) {
        let mut acc = Accumulator::new();
        for tri in self.triangles() {
            acc.add_triangle(&tri);
        }
        if let Some(summary) = acc.finish() {
            self.bounds = summary.bounds;
            self.center_of_mass = summary.center_of_mass;
            self.volume = summary.volume;
        }
    }
}
