//! Extraction configuration.

use crate::error::{LaminaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables shared by the pipeline and batch orchestrator.
///
/// Defaults reproduce the reference behavior; a TOML file can override any
/// field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Resolution for page rasters handed to the layout detector. At 72 dpi
    /// image pixels coincide with page units.
    #[serde(default = "default_render_dpi")]
    pub render_dpi: u16,

    /// Displayed images with either dimension below this (in page units) are
    /// treated as decorative artifacts and dropped.
    #[serde(default = "default_min_image_size")]
    pub min_image_size: f32,

    /// Upper bound on concurrently processed files. `None` sizes the pool
    /// for I/O- and inference-bound work at `num_cpus * 2`.
    #[serde(default)]
    pub max_concurrent_extractions: Option<usize>,
}

fn default_render_dpi() -> u16 {
    72
}

fn default_min_image_size() -> f32 {
    50.0
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            render_dpi: default_render_dpi(),
            min_image_size: default_min_image_size(),
            max_concurrent_extractions: None,
        }
    }
}

impl ExtractionConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw).map_err(|e| {
            LaminaError::validation_with_source(
                format!("Invalid config file: {}", path.as_ref().display()),
                e,
            )
        })
    }
}
