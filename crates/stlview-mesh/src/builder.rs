//! Scratch state held by a parser while it reads facets.

use tracing::debug;

use crate::geometry::{triangle_normal, Accumulator};
use crate::mesh::Mesh;
use crate::{Triangle, Vertex};

/// Collects facets into flat vertex/normal buffers while folding statistics.
///
/// A builder is owned by exactly one parse and consumed by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    normals: Vec<Vertex>,
    acc: Accumulator,
    have_normals: bool,
}

impl MeshBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with room for `triangles` facets.
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(triangles * 3),
            normals: Vec::with_capacity(triangles * 3),
            ..Self::default()
        }
    }

    /// Append one facet.
    ///
    /// The normal is duplicated once per corner so that normals stay aligned
    /// with vertices.
    pub fn push_facet(&mut self, normal: Vertex, tri: Triangle) {
        if normal != [0.0; 3] {
            self.have_normals = true;
        }
        self.acc.add_triangle(&tri);
        self.vertices.extend_from_slice(&tri);
        self.normals.extend_from_slice(&[normal; 3]);
    }

    /// Number of facets pushed so far.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Whether any pushed facet carried a non-zero normal.
    pub fn have_normals(&self) -> bool {
        self.have_normals
    }

    /// Overwrite every normal with the cross-product normal of its triangle.
    pub fn recompute_normals(&mut self) {
        for (tri, normals) in self
            .vertices
            .chunks_exact(3)
            .zip(self.normals.chunks_exact_mut(3))
        {
            let n = triangle_normal(tri[0], tri[1], tri[2]);
            normals.copy_from_slice(&[n; 3]);
        }
    }

    /// Recompute normals only if no facet supplied one.
    ///
    /// Returns `true` when the fallback ran.
    pub fn recompute_missing_normals(&mut self) -> bool {
        if self.have_normals || self.vertices.is_empty() {
            return false;
        }
        debug!(
            triangles = self.triangle_count(),
            "no facet normals supplied, deriving from geometry"
        );
        self.recompute_normals();
        true
    }

    /// Finalize into a [`Mesh`].
    ///
    /// Returns `None` when fewer than three vertices were collected.
    pub fn build(self) -> Option<Mesh> {
        if self.vertices.len() < 3 {
            return None;
        }
        let summary = self.acc.finish()?;
        Some(Mesh::from_parts(self.vertices, self.normals, summary))
    }
}
