//! Format dispatch: providers advertise which files they handle and build
//! extractors on demand, so the batch layer stays format-agnostic.

use crate::error::{LaminaError, Result};
use crate::layout::LayoutDetector;
use crate::storage::AssetStorage;
use crate::types::IngestedDocument;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// A configured extractor bound to one output storage. One instance is
/// created per input file and dropped afterwards.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<IngestedDocument>;
}

/// Factory for a single document format.
pub trait ExtractorProvider: Send + Sync {
    /// Whether this provider handles the given input file. Decided from the
    /// path alone so unsupported files are rejected before any I/O.
    fn supports(&self, path: &Path) -> bool;

    /// Build an extractor writing assets to `storage` and using `detector`
    /// for page layout.
    fn create(
        &self,
        storage: Arc<dyn AssetStorage>,
        detector: Arc<dyn LayoutDetector>,
    ) -> Arc<dyn DocumentExtractor>;
}

/// Ordered provider collection; the first provider claiming a path wins.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ExtractorProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn ExtractorProvider>) {
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First registered provider that supports `path`, or `None` when the
    /// format is unrecognized.
    pub fn provider_for(&self, path: &Path) -> Option<&Arc<dyn ExtractorProvider>> {
        self.providers.iter().find(|p| p.supports(path))
    }

    /// Like [`Self::provider_for`] but unsupported formats become an error.
    pub fn require_provider_for(&self, path: &Path) -> Result<&Arc<dyn ExtractorProvider>> {
        self.provider_for(path).ok_or_else(|| {
            LaminaError::UnsupportedFormat(path.to_string_lossy().into_owned())
        })
    }
}
