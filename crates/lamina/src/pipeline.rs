//! Per-document extraction pipeline.
//!
//! One call to [`extract_document`] turns an open document into a fully
//! sorted [`IngestedDocument`]: every page is rendered, run through layout
//! detection, and each detected zone is dispatched to the extractor matching
//! its type. Table zones double as exclusion zones for text extraction, so a
//! table's cell words are never emitted twice.

use crate::config::ExtractionConfig;
use crate::decode::PageDecoder;
use crate::error::{LaminaError, Result};
use crate::extract::{ImageExtractor, TableExtractor, TextReconstructor};
use crate::geometry::BoundingBox;
use crate::layout::LayoutDetector;
use crate::storage::AssetStorage;
use crate::types::{
    DocumentElement, DocumentMetadata, ElementType, IngestedDocument, LayoutElement,
};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Extract every page of the document behind `decoder` and assemble the
/// final artifact. Pages are processed in order; within a page, detected
/// zones drive which extractor sees which region.
pub fn extract_document(
    decoder: &dyn PageDecoder,
    detector: &dyn LayoutDetector,
    storage: &dyn AssetStorage,
    config: &ExtractionConfig,
    path: &Path,
) -> Result<IngestedDocument> {
    let started = Instant::now();

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .ok_or_else(|| {
            LaminaError::validation(format!("Input path has no file name: {}", path.display()))
        })?;
    let file_stem = filename.rsplit_once('.').map_or(filename.as_str(), |(stem, _)| stem);

    let page_count = decoder.page_count();
    let mut elements: Vec<DocumentElement> = Vec::new();

    for page_number in 1..=page_count {
        let page_elements = extract_page(
            decoder,
            detector,
            storage,
            config,
            page_number,
            file_stem,
        )?;
        debug!(
            page = page_number,
            elements = page_elements.len(),
            "Page extracted"
        );
        elements.extend(page_elements);
    }

    elements.sort_by(DocumentElement::reading_order);

    let metadata = DocumentMetadata {
        filename,
        file_hash: hash_file(path)?,
        total_pages: page_count,
        processing_time_ms: started.elapsed().as_millis() as u64,
    };

    Ok(IngestedDocument::new(metadata, elements))
}

fn extract_page(
    decoder: &dyn PageDecoder,
    detector: &dyn LayoutDetector,
    storage: &dyn AssetStorage,
    config: &ExtractionConfig,
    page_number: u32,
    file_stem: &str,
) -> Result<Vec<DocumentElement>> {
    let page_size = decoder.page_size(page_number)?;
    let rendered = decoder.render(page_number, config.render_dpi)?;
    let layout = detector.detect(&rendered, page_number)?;

    // detector boxes are in rendered-pixel space; bring them back to page
    // units before comparing against glyph geometry
    let scale_x = if rendered.width > 0 {
        page_size.width / rendered.width as f32
    } else {
        1.0
    };
    let scale_y = if rendered.height > 0 {
        page_size.height / rendered.height as f32
    } else {
        1.0
    };
    let zones: Vec<LayoutElement> = layout
        .elements
        .iter()
        .map(|e| LayoutElement {
            bbox: scale_bbox(&e.bbox, scale_x, scale_y),
            ..e.clone()
        })
        .collect();

    let table_zones: Vec<BoundingBox> = zones
        .iter()
        .filter(|z| z.element_type == ElementType::Table)
        .map(|z| z.bbox)
        .collect();
    let image_zones: Vec<BoundingBox> = zones
        .iter()
        .filter(|z| z.element_type == ElementType::Image)
        .map(|z| z.bbox)
        .collect();

    let atoms = decoder.glyphs(page_number)?;
    let rulings = decoder.rulings(page_number)?;

    // figures never hold tables; image zones suppress any table candidate
    // centred inside them
    let mut elements =
        TableExtractor::new().extract(&atoms, &rulings, page_number, &table_zones, &image_zones);

    // table extraction owns its zones; everything the tables actually
    // claimed is excluded from text below
    let claimed: Vec<BoundingBox> = elements.iter().map(|e| e.location.bbox).collect();
    let exclusions: Vec<BoundingBox> =
        table_zones.iter().copied().chain(claimed).collect();

    if !image_zones.is_empty() {
        let ops = decoder.content_ops(page_number)?;
        let prefix = format!("{file_stem}_p{page_number}");
        let images = ImageExtractor::new(config.min_image_size);
        // one pass per zone: an image between two zones belongs to neither
        for region in &image_zones {
            elements.extend(images.extract(
                &ops,
                page_number,
                page_size.height,
                Some(*region),
                storage,
                &prefix,
            )?);
        }
    }

    let text = TextReconstructor::new();
    for zone in &zones {
        let hint = match zone.element_type {
            ElementType::Table | ElementType::Image => continue,
            ElementType::Text => None,
            other => Some(other),
        };
        elements.extend(text.extract(&atoms, page_number, Some(zone.bbox), &exclusions, hint));
    }

    Ok(elements)
}

fn scale_bbox(bbox: &BoundingBox, scale_x: f32, scale_y: f32) -> BoundingBox {
    BoundingBox {
        x: bbox.x * scale_x,
        y: bbox.y * scale_y,
        width: bbox.width * scale_x,
        height: bbox.height * scale_y,
    }
}

/// sha-256 of the raw input bytes, hex-encoded, read in fixed-size chunks so
/// large documents never sit in memory twice.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_file_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.bin");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            hash_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_file_missing_input() {
        assert!(hash_file(Path::new("/nonexistent/input.bin")).is_err());
    }

    #[test]
    fn test_scale_bbox() {
        let bbox = BoundingBox::new(100.0, 200.0, 300.0, 400.0).unwrap();
        let scaled = scale_bbox(&bbox, 0.5, 0.25);
        assert_eq!(scaled.x, 50.0);
        assert_eq!(scaled.y, 50.0);
        assert_eq!(scaled.width, 150.0);
        assert_eq!(scaled.height, 100.0);
    }
}
