//! Serialization of extraction results to disk.

use crate::error::{LaminaError, Result};
use crate::types::IngestedDocument;
use std::path::Path;

/// Writes a finished document to a target path. Implementations choose the
/// format; `extension` tells the batch layer what suffix artifacts carry.
pub trait ResultWriter: Send + Sync {
    fn write(&self, document: &IngestedDocument, path: &Path) -> Result<()>;

    fn extension(&self) -> &str {
        ".json"
    }
}

/// Pretty-printed JSON, one file per source document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonResultWriter;

impl JsonResultWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ResultWriter for JsonResultWriter {
    fn write(&self, document: &IngestedDocument, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        std::fs::write(path, json).map_err(|e| {
            LaminaError::storage_with_source(
                format!("Failed to write result to {}", path.display()),
                e,
            )
        })
    }
}
