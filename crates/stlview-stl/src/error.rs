//! Error types for STL decoding.

use thiserror::Error;

/// Errors that can occur while reading or writing STL data.
///
/// Every variant is terminal: no partially built mesh is ever returned.
#[derive(Error, Debug)]
pub enum StlError {
    /// I/O error from the underlying byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes were available than a fixed-size read requires, or the
    /// text ended inside a facet.
    #[error("truncated input at {location}: {message}")]
    TruncatedInput {
        /// Where the input ended (`byte 84`, `line 12`).
        location: Location,
        /// What the grammar still required.
        message: String,
    },

    /// A numeric token failed to parse or a coordinate triple was incomplete.
    #[error("malformed geometry at {location}: {message}")]
    MalformedGeometry {
        /// Where the problem was found.
        location: Location,
        /// Error message.
        message: String,
    },

    /// The binary triangle count is negative or exceeds the vertex ceiling.
    #[error("invalid triangle count {count} (ceiling is {max_vertices} vertices)")]
    InvalidTriangleCount {
        /// Declared count, as stored in the file.
        count: u32,
        /// Vertex ceiling in force.
        max_vertices: usize,
    },

    /// Parsing finished without producing a single triangle.
    #[error("model contains no geometry")]
    EmptyModel,
}

/// Position in the input where an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Byte offset from the start of a binary stream.
    Byte(u64),
    /// 1-based line number in an ASCII stream.
    Line(usize),
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Byte(offset) => write!(f, "byte {offset}"),
            Location::Line(line) => write!(f, "line {line}"),
        }
    }
}

/// The kind of an [`StlError`], without its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`StlError::Io`].
    Io,
    /// See [`StlError::TruncatedInput`].
    TruncatedInput,
    /// See [`StlError::MalformedGeometry`].
    MalformedGeometry,
    /// See [`StlError::InvalidTriangleCount`].
    InvalidTriangleCount,
    /// See [`StlError::EmptyModel`].
    EmptyModel,
}

impl StlError {
    /// Create a truncated-input error.
    pub fn truncated(location: Location, message: impl Into<String>) -> Self {
        Self::TruncatedInput {
            location,
            message: message.into(),
        }
    }

    /// Create a malformed-geometry error at a text line.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            location: Location::Line(line),
            message: message.into(),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Self::MalformedGeometry { .. } => ErrorKind::MalformedGeometry,
            Self::InvalidTriangleCount { .. } => ErrorKind::InvalidTriangleCount,
            Self::EmptyModel => ErrorKind::EmptyModel,
        }
    }
}

/// Result type for STL operations.
pub type Result<T> = std::result::Result<T, StlError>;
