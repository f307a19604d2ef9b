//! Lamina - Layout-Driven Document Extraction Library
//!
//! Lamina turns paginated documents into structured, typed elements: text
//! blocks in reading order, tables as CSV grids, and embedded images stored
//! as external assets. Extraction is layout-driven: each page is rasterized,
//! a layout detector proposes typed zones, and per-type extractors
//! reconstruct content from the document's own geometry.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lamina::{extract_document, ExtractionConfig, LocalAssetStorage, StructuralLayoutDetector};
//! # use lamina::decode::PageDecoder;
//!
//! # fn run(decoder: &dyn PageDecoder) -> lamina::Result<()> {
//! let config = ExtractionConfig::default();
//! let storage = LocalAssetStorage::new("out/assets");
//! let detector = StructuralLayoutDetector::new();
//! let document = extract_document(
//!     decoder,
//!     &detector,
//!     &storage,
//!     &config,
//!     std::path::Path::new("report.pdf"),
//! )?;
//! println!("Extracted {} elements", document.elements.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Decoding** (`decode`): format-neutral page access behind [`decode::PageDecoder`]
//! - **Layout** (`layout`): typed zone detection per rendered page
//! - **Extractors** (`extract`): text reconstruction, table recovery, image placement
//! - **Pipeline** (`pipeline`): per-document orchestration and reading-order assembly
//! - **Batch** (`batch`): concurrent directory processing through the provider registry

#![deny(unsafe_code)]

pub mod batch;
pub mod config;
pub mod decode;
pub mod error;
pub mod extract;
pub mod fsutil;
pub mod geometry;
pub mod layout;
pub mod pipeline;
pub mod providers;
pub mod storage;
pub mod types;
pub mod writer;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use batch::{BatchProcessor, BatchSummary};
pub use config::ExtractionConfig;
pub use error::{LaminaError, Result};
pub use geometry::BoundingBox;
pub use layout::{LayoutDetector, StructuralLayoutDetector};
pub use pipeline::extract_document;
pub use providers::{DocumentExtractor, ExtractorProvider, ProviderRegistry};
pub use storage::{AssetStorage, LocalAssetStorage};
pub use types::{
    Content, DocumentElement, DocumentMetadata, ElementType, IngestedDocument, Location,
};
pub use writer::{JsonResultWriter, ResultWriter};
