#![warn(missing_docs)]

//! ASCII and binary STL import/export for stlview.
//!
//! Decoding is a single linear pass: the first 256 bytes are sniffed to pick
//! an encoding, then the matching parser consumes the whole stream and
//! produces a [`Mesh`] or an [`StlError`]. Nothing partial is returned.
//!
//! # Example
//!
//! ```no_run
//! use stlview_stl::{read_stl_file, write_stl_file, Format};
//!
//! let mesh = read_stl_file("part.stl").unwrap();
//! println!("{} triangles, volume {}", mesh.triangle_count(), mesh.volume());
//!
//! write_stl_file(&mesh, "part", Format::Ascii, "part_ascii.stl").unwrap();
//! ```

mod ascii;
mod binary;
mod error;
mod sniff;
mod source;
mod writer;

pub use ascii::parse_ascii;
pub use binary::{parse_binary, HEADER_LEN, MAX_VERTICES, RECORD_LEN};
pub use error::{ErrorKind, Location, Result, StlError};
pub use sniff::{classify, sniff, Format, SNIFF_LEN};
pub use source::{ByteReader, DEFAULT_BUFFER_SIZE};
pub use stlview_mesh::Mesh;
pub use writer::{to_ascii_string, to_binary_bytes, write_ascii, write_binary, write_stl_file};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Decoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Ceiling on `3 × triangle count` for binary input.
    pub max_vertices: usize,
    /// Block size for reads from the byte source.
    pub buffer_size: usize,
    /// Apply the all-zero-normal fallback to ASCII input as well.
    pub recompute_ascii_normals: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_vertices: MAX_VERTICES,
            buffer_size: DEFAULT_BUFFER_SIZE,
            recompute_ascii_normals: false,
        }
    }
}

/// Sniff the format of `reader` and decode it.
pub fn parse<R: Read>(reader: &mut ByteReader<R>, options: &ParseOptions) -> Result<Mesh> {
    match sniff(reader)? {
        Format::Ascii => parse_ascii(reader, options),
        Format::Binary => parse_binary(reader, options),
    }
}

/// Decode an STL stream with the given options.
pub fn read_stl_with<R: Read>(source: R, options: &ParseOptions) -> Result<Mesh> {
    let mut reader = ByteReader::with_capacity(options.buffer_size, source);
    parse(&mut reader, options)
}

/// Decode an STL stream with default options.
pub fn read_stl<R: Read>(source: R) -> Result<Mesh> {
    read_stl_with(source, &ParseOptions::default())
}

/// Decode STL data already held in memory.
pub fn read_stl_from_buffer(data: &[u8]) -> Result<Mesh> {
    read_stl(data)
}

/// Decode an STL file from a path.
pub fn read_stl_file(path: impl AsRef<Path>) -> Result<Mesh> {
    read_stl(File::open(path)?)
}
