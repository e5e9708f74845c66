#![warn(missing_docs)]

//! stlview: load STL models for display.
//!
//! Parses ASCII or binary STL from any byte source, derives bounds, center
//! of mass and volume, and computes the transform that fits the model into
//! a display cube with Y up.
//!
//! # Example
//!
//! ```rust,no_run
//! use stlview::{load_model_from_path, ModelSlot, ViewerConfig};
//!
//! let config = ViewerConfig::default();
//! let mut model = load_model_from_path("bracket.stl", &config).unwrap();
//! let floor = model.setup(config.bound_size);
//! println!("{}: volume {}, floor at {}", model.title(), model.mesh().volume(), floor);
//!
//! let mut slot = ModelSlot::new();
//! slot.replace(model);
//! ```

use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::info;

mod config;
mod model;

pub use config::{ViewerConfig, DEFAULT_BOUND_SIZE, DEFAULT_TITLE, MAX_VERTEX_CEILING};
pub use model::{Model, ModelSlot};
pub use stlview_math::{Axis, Transform};
pub use stlview_mesh::{Bounds, Mesh, MeshStats};
pub use stlview_stl::{ErrorKind, Format, ParseOptions, StlError};

/// Errors returned by configuration loading.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// An I/O error occurred reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid TOML for [`ViewerConfig`].
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Parse a model from an arbitrary byte source.
///
/// `title` falls back to [`ViewerConfig::default_title`].
pub fn load_model<R: Read>(
    source: R,
    title: Option<&str>,
    config: &ViewerConfig,
) -> Result<Model, StlError> {
    let mesh = stlview_stl::read_stl_with(source, &config.parse)?;
    let title = title.unwrap_or(&config.default_title);
    info!(
        title,
        triangles = mesh.triangle_count(),
        volume = mesh.volume(),
        "loaded model"
    );
    Ok(Model::new(title, mesh))
}

/// Parse a model from a file; the title is the file stem.
pub fn load_model_from_path(
    path: impl AsRef<Path>,
    config: &ViewerConfig,
) -> Result<Model, StlError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let title = path.file_stem().map(|s| s.to_string_lossy().into_owned());
    load_model(file, title.as_deref(), config)
}
