//! Embedded image extraction via content-stream replay.
//!
//! Image placement lives in the content stream, not on the image object: the
//! drawn size and position of an XObject come from the transformation matrix
//! in force at its draw operator. This extractor replays the
//! placement-relevant operators with a matrix stack to recover each image's
//! display rectangle, then persists the decoded bytes through the supplied
//! [`AssetStorage`].

use crate::decode::{ContentOp, ImageData};
use crate::geometry::{BoundingBox, Matrix};
use crate::storage::AssetStorage;
use crate::types::{Content, DocumentElement, ElementType, Location};
use crate::error::Result;

/// Stateless image extractor; the matrix stack is rebuilt per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageExtractor {
    /// Images displayed smaller than this (in page units, either axis) are
    /// treated as decoration and skipped.
    pub min_display_size: f32,
}

impl ImageExtractor {
    pub fn new(min_display_size: f32) -> Self {
        Self { min_display_size }
    }

    /// Replay `ops`, persist each displayed image, and emit one element per
    /// stored asset. `page_height` drives the flip from PDF bottom-left
    /// coordinates to the top-left space the rest of the pipeline uses.
    #[allow(clippy::too_many_arguments)]
    pub fn extract(
        &self,
        ops: &[ContentOp],
        page_number: u32,
        page_height: f32,
        region: Option<BoundingBox>,
        storage: &dyn AssetStorage,
        context_prefix: &str,
    ) -> Result<Vec<DocumentElement>> {
        let mut elements = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut stack: Vec<Matrix> = Vec::new();

        for op in ops {
            match op {
                ContentOp::Save => stack.push(ctm),
                ContentOp::Restore => {
                    // unbalanced Q in malformed streams resets to identity
                    ctm = stack.pop().unwrap_or(Matrix::IDENTITY);
                }
                ContentOp::Concat(m) => ctm = m.multiply(&ctm),
                ContentOp::SetMatrix(m) => ctm = *m,
                ContentOp::DrawImage(image) => {
                    if let Some(element) = self.place(
                        image,
                        &ctm,
                        page_number,
                        page_height,
                        region,
                        storage,
                        context_prefix,
                    )? {
                        elements.push(element);
                    }
                }
            }
        }

        Ok(elements)
    }

    #[allow(clippy::too_many_arguments)]
    fn place(
        &self,
        image: &ImageData,
        ctm: &Matrix,
        page_number: u32,
        page_height: f32,
        region: Option<BoundingBox>,
        storage: &dyn AssetStorage,
        context_prefix: &str,
    ) -> Result<Option<DocumentElement>> {
        let width = ctm.scaling_x();
        let height = ctm.scaling_y();
        if width < self.min_display_size || height < self.min_display_size {
            return Ok(None);
        }

        let x = ctm.translate_x();
        let y = page_height - ctm.translate_y() - height;
        let Ok(bbox) = BoundingBox::new(x, y, width, height) else {
            return Ok(None);
        };

        if region.is_some_and(|r| !r.intersects(&bbox)) {
            return Ok(None);
        }

        let storage_ref = storage.store(image, context_prefix)?;
        Ok(Some(DocumentElement::new(
            ElementType::Image,
            Location { page_number, bbox },
            Content::Image { storage_ref },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records stores without touching the filesystem.
    #[derive(Default)]
    struct RecordingStorage {
        stored: Mutex<Vec<String>>,
    }

    impl AssetStorage for RecordingStorage {
        fn store(&self, _image: &ImageData, context_prefix: &str) -> Result<String> {
            let mut stored = self.stored.lock().unwrap();
            let reference = format!("{context_prefix}_{}.png", stored.len());
            stored.push(reference.clone());
            Ok(reference)
        }
    }

    fn image() -> ImageData {
        ImageData {
            bytes: vec![1, 2, 3],
            suffix: "png".to_string(),
            native_width: 200,
            native_height: 100,
        }
    }

    fn draw_at(x: f32, y: f32, width: f32, height: f32) -> Vec<ContentOp> {
        vec![
            ContentOp::Save,
            ContentOp::Concat(Matrix {
                a: width,
                b: 0.0,
                c: 0.0,
                d: height,
                e: x,
                f: y,
            }),
            ContentOp::DrawImage(image()),
            ContentOp::Restore,
        ]
    }

    fn extract(ops: &[ContentOp], region: Option<BoundingBox>) -> Vec<DocumentElement> {
        let storage = RecordingStorage::default();
        ImageExtractor::new(50.0)
            .extract(ops, 1, 800.0, region, &storage, "doc_p1")
            .unwrap()
    }

    #[test]
    fn test_image_placed_with_y_flip() {
        let elements = extract(&draw_at(100.0, 200.0, 300.0, 150.0), None);
        assert_eq!(elements.len(), 1);
        let bbox = elements[0].location.bbox;
        assert_eq!(bbox.x, 100.0);
        // 800 - 200 - 150
        assert_eq!(bbox.y, 450.0);
        assert_eq!(bbox.width, 300.0);
        assert_eq!(bbox.height, 150.0);
    }

    #[test]
    fn test_y_flip_reference_case() {
        // 100x100 image at pdf-space (50, 100) on a 500-tall page
        let storage = RecordingStorage::default();
        let elements = ImageExtractor::new(50.0)
            .extract(&draw_at(50.0, 100.0, 100.0, 100.0), 1, 500.0, None, &storage, "p1")
            .unwrap();
        assert_eq!(elements[0].location.bbox.y, 300.0);
    }

    #[test]
    fn test_small_images_skipped() {
        let elements = extract(&draw_at(0.0, 0.0, 49.0, 300.0), None);
        assert!(elements.is_empty());
    }

    #[test]
    fn test_region_filter() {
        let region = BoundingBox::new(0.0, 0.0, 50.0, 50.0).unwrap();
        let elements = extract(&draw_at(500.0, 100.0, 100.0, 100.0), Some(region));
        assert!(elements.is_empty());
    }

    #[test]
    fn test_save_restore_isolates_transforms() {
        let mut ops = vec![
            ContentOp::Save,
            ContentOp::Concat(Matrix::scale(0.1, 0.1)),
            ContentOp::Restore,
        ];
        // after Q the scale is gone, so this image is full size
        ops.extend(draw_at(0.0, 0.0, 100.0, 100.0));
        let elements = extract(&ops, None);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].location.bbox.width, 100.0);
    }

    #[test]
    fn test_nested_concat_compounds() {
        let ops = vec![
            ContentOp::Concat(Matrix::scale(2.0, 2.0)),
            ContentOp::Concat(Matrix::scale(50.0, 50.0)),
            ContentOp::DrawImage(image()),
        ];
        let elements = extract(&ops, None);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].location.bbox.width, 100.0);
    }

    #[test]
    fn test_each_image_stored_once() {
        let storage = RecordingStorage::default();
        let mut ops = draw_at(0.0, 0.0, 100.0, 100.0);
        ops.extend(draw_at(0.0, 300.0, 100.0, 100.0));
        let elements = ImageExtractor::new(50.0)
            .extract(&ops, 1, 800.0, None, &storage, "doc_p1")
            .unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(storage.stored.lock().unwrap().len(), 2);
        match &elements[0].content {
            Content::Image { storage_ref } => assert_eq!(storage_ref, "doc_p1_0.png"),
            other => panic!("expected image content, got {other:?}"),
        }
    }
}
