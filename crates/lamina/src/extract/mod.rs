//! Content extractors, one per content kind. Each is stateless and drives a
//! single region (or whole page) per call; the pipeline decides which one
//! handles which detected zone.

pub mod image;
pub mod table;
pub mod text;

pub use image::ImageExtractor;
pub use table::TableExtractor;
pub use text::TextReconstructor;
