//! Binary STL decoder.
//!
//! Layout (all little-endian):
//!
//! | Offset     | Size | Field                          |
//! |------------|------|--------------------------------|
//! | 0          | 80   | header (ignored)               |
//! | 80         | 4    | triangle count, `u32`          |
//! | 84 + 50·i  | 12   | facet normal, 3 × `f32`        |
//! | 96 + 50·i  | 36   | vertices, 9 × `f32`            |
//! | 132 + 50·i | 2    | attribute byte count (ignored) |

use std::io::Read;

use stlview_mesh::{Mesh, MeshBuilder, Triangle, Vertex};
use tracing::{debug, warn};

use crate::error::{Result, StlError};
use crate::source::ByteReader;
use crate::ParseOptions;

/// Size of the leading header.
pub const HEADER_LEN: usize = 80;

/// Size of one triangle record.
pub const RECORD_LEN: usize = 50;

/// Default ceiling on `3 × triangle count`.
pub const MAX_VERTICES: usize = 10_000_000;

/// Most triangles reserved up front; larger meshes grow as records arrive.
const MAX_RESERVE: usize = 64 * 1024;

/// Decode a binary STL stream into a [`Mesh`].
///
/// If no record carries a non-zero normal, every normal is recomputed from
/// its triangle's geometry.
pub fn parse_binary<R: Read>(reader: &mut ByteReader<R>, options: &ParseOptions) -> Result<Mesh> {
    reader.skip(HEADER_LEN)?;
    let count = u32::from_le_bytes(reader.read_array::<4>()?);
    let triangles = check_triangle_count(count, options.max_vertices)?;
    debug!(triangles, "reading binary STL records");
    if triangles == 0 {
        return Err(StlError::EmptyModel);
    }

    let mut builder = MeshBuilder::with_capacity(triangles.min(MAX_RESERVE));
    for _ in 0..triangles {
        let record = reader.read_array::<RECORD_LEN>()?;
        let (normal, tri) = decode_record(&record);
        builder.push_facet(normal, tri);
    }

    // Only bytes already buffered are inspected; the source is not read past
    // the last record.
    if reader.has_buffered() {
        warn!(
            offset = reader.position(),
            "ignoring bytes after the declared triangle records"
        );
    }

    builder.recompute_missing_normals();
    builder.build().ok_or(StlError::EmptyModel)
}

/// Validate a declared triangle count against the vertex ceiling.
fn check_triangle_count(count: u32, max_vertices: usize) -> Result<usize> {
    let invalid = || StlError::InvalidTriangleCount {
        count,
        max_vertices,
    };
    // Counts with the top bit set are negative as a signed 32-bit integer.
    if count > i32::MAX as u32 {
        return Err(invalid());
    }
    if u64::from(count) * 3 > max_vertices as u64 {
        return Err(invalid());
    }
    Ok(count as usize)
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(raw)
}

fn read_vertex(bytes: &[u8], offset: usize) -> Vertex {
    [
        read_f32(bytes, offset),
        read_f32(bytes, offset + 4),
        read_f32(bytes, offset + 8),
    ]
}

/// Split a record into its normal and three corners.
fn decode_record(record: &[u8; RECORD_LEN]) -> (Vertex, Triangle) {
    let normal = read_vertex(record, 0);
    let tri = [
        read_vertex(record, 12),
        read_vertex(record, 24),
        read_vertex(record, 36),
    ];
    (normal, tri)
}
