#![warn(missing_docs)]

//! Triangle mesh result and geometry accumulation for stlview.
//!
//! Parsers feed facets into a [`MeshBuilder`], which folds bounding box,
//! center of mass and signed volume as it goes, then finalizes into a
//! [`Mesh`]. The mesh keeps flat, index-aligned vertex and normal
//! buffers ready for upload to a renderer.
//!
//! # Example
//!
//! ```
//! use stlview_mesh::MeshBuilder;
//!
//! let mut builder = MeshBuilder::new();
//! builder.push_facet(
//!     [0.0, 0.0, 1.0],
//!     [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//! );
//! let mesh = builder.build().unwrap();
//! assert_eq!(mesh.vertex_count(), 3);
//! ```

pub mod builder;
pub mod geometry;
pub mod mesh;

pub use builder::MeshBuilder;
pub use geometry::{signed_volume, triangle_normal, Accumulator, Bounds, Summary};
pub use mesh::{Mesh, MeshStats, MODEL_ROTATION_X, MODEL_ROTATION_Z};

/// A vertex position or normal as stored in the flat buffers.
pub type Vertex = [f32; 3];

/// The three corners of one triangle.
pub type Triangle = [Vertex; 3];
