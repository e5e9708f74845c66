//! Viewer configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stlview_stl::ParseOptions;

use crate::ViewerError;

/// Side of the display cube models are fitted into.
pub const DEFAULT_BOUND_SIZE: f32 = 50.0;

/// Largest useful vertex ceiling: three vertices per positive `i32` count.
pub const MAX_VERTEX_CEILING: usize = 3 * i32::MAX as usize;

/// Title used when a model has no file name.
pub const DEFAULT_TITLE: &str = "Model";

/// Settings for loading and placing models.
///
/// Every field has a default, so a partial (or empty) TOML file is valid:
///
/// ```toml
/// bound_size = 80.0
///
/// [parse]
/// max_vertices = 3000000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Side of the cube the model matrix fits the model into.
    pub bound_size: f32,
    /// Title for models loaded from an anonymous stream.
    pub default_title: String,
    /// Decoder settings.
    pub parse: ParseOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            bound_size: DEFAULT_BOUND_SIZE,
            default_title: DEFAULT_TITLE.to_string(),
            parse: ParseOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ViewerError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if !(self.bound_size.is_finite() && self.bound_size > 0.0) {
            return Err(ViewerError::InvalidConfig(
                "bound_size must be a positive number".into(),
            ));
        }
        if self.parse.max_vertices == 0 || self.parse.max_vertices > MAX_VERTEX_CEILING {
            return Err(ViewerError::InvalidConfig(format!(
                "parse.max_vertices must be between 1 and {MAX_VERTEX_CEILING}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.bound_size, 50.0);
        assert_eq!(config.default_title, "Model");
        assert_eq!(config.parse.max_vertices, 10_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ViewerConfig::from_toml_str("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = ViewerConfig::from_toml_str(
            "bound_size = 80.0\n[parse]\nrecompute_ascii_normals = true\n",
        )
        .unwrap();
        assert_eq!(config.bound_size, 80.0);
        assert!(config.parse.recompute_ascii_normals);
        assert_eq!(config.parse.buffer_size, ParseOptions::default().buffer_size);
        assert_eq!(config.default_title, "Model");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ViewerConfig::from_toml_str("bound_size = -1.0"),
            Err(ViewerError::InvalidConfig(_))
        ));
        assert!(matches!(
            ViewerConfig::from_toml_str("bound_size = \"big\""),
            Err(ViewerError::Config(_))
        ));
    }

    #[test]
    fn test_vertex_ceiling_range() {
        assert!(matches!(
            ViewerConfig::from_toml_str("[parse]\nmax_vertices = 0\n"),
            Err(ViewerError::InvalidConfig(_))
        ));
        let over = format!("[parse]\nmax_vertices = {}\n", MAX_VERTEX_CEILING + 1);
        assert!(matches!(
            ViewerConfig::from_toml_str(&over),
            Err(ViewerError::InvalidConfig(_))
        ));
        let at = format!("[parse]\nmax_vertices = {MAX_VERTEX_CEILING}\n");
        assert_eq!(
            ViewerConfig::from_toml_str(&at).unwrap().parse.max_vertices,
            MAX_VERTEX_CEILING
        );
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = ViewerConfig::load("/nonexistent/stlview.toml").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }
}
