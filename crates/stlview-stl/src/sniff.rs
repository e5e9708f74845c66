//! Classify a stream as ASCII or binary STL from its first bytes.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binary::HEADER_LEN;
use crate::error::Result;
use crate::source::ByteReader;

/// Number of leading bytes inspected.
pub const SNIFF_LEN: usize = 256;

/// The two STL encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable `solid ... endsolid` text.
    Ascii,
    /// 80-byte header, triangle count, 50-byte records.
    Binary,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Ascii => f.write_str("ascii"),
            Format::Binary => f.write_str("binary"),
        }
    }
}

/// Classify a prefix of an STL stream.
///
/// The prefix is text if, decoded permissively, it contains all of `solid`,
/// `facet` and `vertex` anywhere. Binary headers that happen to contain all
/// three words are misclassified; the format itself is ambiguous there.
///
/// A prefix shorter than a binary header plus triangle count that starts
/// with `solid` is the whole stream and cannot be binary, so it is text too
/// (`solid x\nendsolid x` is an empty ASCII model, not a truncated binary one).
pub fn classify(prefix: &[u8]) -> Format {
    let text = String::from_utf8_lossy(prefix);
    if text.contains("solid") && text.contains("facet") && text.contains("vertex") {
        return Format::Ascii;
    }
    if prefix.len() < HEADER_LEN + 4 && text.trim_start().starts_with("solid") {
        return Format::Ascii;
    }
    Format::Binary
}

/// Peek at the start of `reader` and classify it.
///
/// The reader is left at the position it started from.
pub fn sniff<R: Read>(reader: &mut ByteReader<R>) -> Result<Format> {
    reader.mark();
    let format = classify(reader.peek(SNIFF_LEN)?);
    reader.reset()?;
    debug!(%format, "sniffed STL format");
    Ok(format)
}
