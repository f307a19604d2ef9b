//! Provider wiring the pdfium decoder into the extraction pipeline.

use super::decoder::PdfiumDecoder;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::layout::LayoutDetector;
use crate::pipeline::extract_document;
use crate::providers::{DocumentExtractor, ExtractorProvider};
use crate::storage::AssetStorage;
use crate::types::IngestedDocument;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Handles `.pdf` inputs, matched on extension case-insensitively.
pub struct PdfExtractorProvider {
    config: ExtractionConfig,
}

impl PdfExtractorProvider {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl ExtractorProvider for PdfExtractorProvider {
    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    fn create(
        &self,
        storage: Arc<dyn AssetStorage>,
        detector: Arc<dyn LayoutDetector>,
    ) -> Arc<dyn DocumentExtractor> {
        Arc::new(PdfDocumentExtractor {
            storage,
            detector,
            config: self.config.clone(),
        })
    }
}

struct PdfDocumentExtractor {
    storage: Arc<dyn AssetStorage>,
    detector: Arc<dyn LayoutDetector>,
    config: ExtractionConfig,
}

#[async_trait]
impl DocumentExtractor for PdfDocumentExtractor {
    async fn extract(&self, path: &Path) -> Result<IngestedDocument> {
        let decoder = PdfiumDecoder::open(path)?;
        extract_document(
            &decoder,
            self.detector.as_ref(),
            self.storage.as_ref(),
            &self.config,
            path,
        )
    }
}
