//! PDF-specific error type, converted to the crate error at the module
//! boundary.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PdfError {
    #[error("Invalid PDF: {0}")]
    InvalidDocument(String),

    #[error("Page {0} not found")]
    PageNotFound(u32),

    #[error("Text extraction failed: {0}")]
    TextExtractionFailed(String),

    #[error("Page rendering failed: {0}")]
    RenderingFailed(String),

    #[error("Object extraction failed: {0}")]
    ObjectExtractionFailed(String),

    #[error("Pdfium library unavailable: {0}")]
    LibraryUnavailable(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
