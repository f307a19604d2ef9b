//! PDF support backed by pdfium-render. Enabled by the `pdf` feature; the
//! rest of the crate is format-neutral and compiles without a native pdfium
//! library present.

pub mod decoder;
pub mod error;
pub mod provider;

pub use decoder::PdfiumDecoder;
pub use error::PdfError;
pub use provider::PdfExtractorProvider;
