//! STL writer: serializes a [`Mesh`] back to either encoding.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use stlview_mesh::Mesh;

use crate::binary::{HEADER_LEN, RECORD_LEN};
use crate::error::Result;
use crate::sniff::Format;

/// Encode `mesh` as binary STL.
///
/// `name` fills the 80-byte header (truncated, zero padded). Each record
/// stores the first of its triangle's three normals.
pub fn to_binary_bytes(mesh: &Mesh, name: &str) -> Vec<u8> {
    let triangles = mesh.triangle_count();
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + triangles * RECORD_LEN);

    let mut header = [0u8; HEADER_LEN];
    let name = name.as_bytes();
    let len = name.len().min(HEADER_LEN);
    header[..len].copy_from_slice(&name[..len]);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(triangles as u32).to_le_bytes());

    for (tri, normals) in mesh
        .vertices()
        .chunks_exact(3)
        .zip(mesh.normals().chunks_exact(3))
    {
        for v in std::iter::once(&normals[0]).chain(tri) {
            for c in v {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}

/// Encode `mesh` as ASCII STL.
///
/// Floats are printed in shortest round-trip exponential notation.
pub fn to_ascii_string(mesh: &Mesh, name: &str) -> String {
    let mut out = String::with_capacity(64 + mesh.triangle_count() * 256);
    out.push_str(&format!("solid {name}\n"));
    for (tri, normals) in mesh
        .vertices()
        .chunks_exact(3)
        .zip(mesh.normals().chunks_exact(3))
    {
        let [nx, ny, nz] = normals[0];
        out.push_str(&format!("  facet normal {nx:e} {ny:e} {nz:e}\n"));
        out.push_str("    outer loop\n");
        for [x, y, z] in tri {
            out.push_str(&format!("      vertex {x:e} {y:e} {z:e}\n"));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {name}\n"));
    out
}

/// Write `mesh` as binary STL.
pub fn write_binary<W: Write>(mesh: &Mesh, name: &str, out: &mut W) -> Result<()> {
    out.write_all(&to_binary_bytes(mesh, name))?;
    Ok(())
}

/// Write `mesh` as ASCII STL.
pub fn write_ascii<W: Write>(mesh: &Mesh, name: &str, out: &mut W) -> Result<()> {
    out.write_all(to_ascii_string(mesh, name).as_bytes())?;
    Ok(())
}

/// Write `mesh` to a file in the given encoding.
pub fn write_stl_file(
    mesh: &Mesh,
    name: &str,
    format: Format,
    path: impl AsRef<Path>,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    match format {
        Format::Ascii => write_ascii(mesh, name, &mut out)?,
        Format::Binary => write_binary(mesh, name, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
