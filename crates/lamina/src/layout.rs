//! Layout detection contract.
//!
//! The neural detection runtime is an external collaborator; the core only
//! sees the narrow [`LayoutDetector`] trait, so the model handle stays
//! mockable and swappable. Production deployments wire a YOLOv8-DocLayNet
//! ONNX model behind this trait; the label vocabulary it emits is mapped
//! through [`ElementType::from_label`].

use crate::decode::PageImage;
use crate::error::Result;
use crate::types::{ElementType, LayoutElement, PageLayout};

/// One inference call per page.
///
/// Implementations must be deterministic given identical model weights and
/// input, and fail with an `Inference` error on malformed input or runtime
/// failure. A detector handle may be shared read-only across files only if
/// its runtime supports concurrent inference; otherwise it must be exclusive
/// per worker.
pub trait LayoutDetector: Send + Sync {
    fn detect(&self, image: &PageImage, page_number: u32) -> Result<PageLayout>;
}

/// Degraded-mode detector for deployments without an inference runtime.
///
/// Proposes the full page for the structural extractors: an `Image` region
/// (the image extractor only reports actually drawn objects) and a `Text`
/// region (the reconstructor excludes whatever table extraction claimed).
/// No table zone is proposed; with none supplied, table extraction runs its
/// own page-wide detection, which only yields validated zones. Recall is
/// the structural extractors' own; only the semantic sub-typing of text
/// regions is lost.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralLayoutDetector;

impl StructuralLayoutDetector {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutDetector for StructuralLayoutDetector {
    fn detect(&self, image: &PageImage, page_number: u32) -> Result<PageLayout> {
        let full_page = crate::geometry::BoundingBox::new(
            0.0,
            0.0,
            image.width as f32,
            image.height as f32,
        )?;

        let elements = [ElementType::Image, ElementType::Text]
            .into_iter()
            .map(|element_type| LayoutElement {
                element_type,
                bbox: full_page,
                confidence: 0.0,
            })
            .collect();

        Ok(PageLayout {
            page_number,
            elements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_detector_covers_page() {
        let image = PageImage {
            width: 612,
            height: 792,
            pixels: vec![],
        };
        let layout = StructuralLayoutDetector.detect(&image, 3).unwrap();

        assert_eq!(layout.page_number, 3);
        assert_eq!(layout.elements.len(), 2);
        for element in &layout.elements {
            assert_eq!(element.bbox.width, 612.0);
            assert_eq!(element.bbox.height, 792.0);
        }
        assert!(
            layout
                .elements
                .iter()
                .any(|e| e.element_type == ElementType::Text)
        );
    }
}
