//! [`PageDecoder`] implementation backed by pdfium-render.
//!
//! Pdfium documents borrow the `Pdfium` instance that loaded them, so the
//! decoder owns the raw bytes and reloads the document per call instead of
//! holding a borrowed document across calls. Pdfium caches parsed structures
//! internally, which keeps the reload cheap relative to actual page work.

use super::error::{PdfError, Result as PdfResult};
use crate::decode::{
    check_page_number, ContentOp, GlyphAtom, ImageData, PageDecoder, PageImage, PageSize, Ruling,
};
use crate::error::Result;
use crate::geometry::{BoundingBox, Matrix};
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::Path;

const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Path objects at most this thick (in page units) count as ruling lines.
const MAX_RULING_THICKNESS: f32 = 2.0;

pub struct PdfiumDecoder {
    pdfium: Pdfium,
    bytes: Vec<u8>,
    page_count: u32,
}

impl PdfiumDecoder {
    /// Open the PDF at `path`. Fails when pdfium cannot be bound or the file
    /// is not a readable PDF.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes).map_err(Into::into)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> PdfResult<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfError::LibraryUnavailable(e.to_string()))?;
        let pdfium = Pdfium::new(bindings);

        let page_count = {
            let document = load(&pdfium, &bytes)?;
            u32::from(document.pages().len())
        };

        Ok(Self {
            pdfium,
            bytes,
            page_count,
        })
    }

}

fn load<'a>(pdfium: &'a Pdfium, bytes: &'a [u8]) -> PdfResult<PdfDocument<'a>> {
    pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| PdfError::InvalidDocument(e.to_string()))
}

impl PageDecoder for PdfiumDecoder {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_size(&self, page_number: u32) -> Result<PageSize> {
        check_page_number(page_number, self.page_count)?;
        let document = load(&self.pdfium, &self.bytes)?;
        let page = get_page(&document, page_number)?;
        Ok(PageSize {
            width: page.width().value,
            height: page.height().value,
        })
    }

    fn glyphs(&self, page_number: u32) -> Result<Vec<GlyphAtom>> {
        check_page_number(page_number, self.page_count)?;
        let document = load(&self.pdfium, &self.bytes)?;
        let page = get_page(&document, page_number)?;
        let page_height = page.height().value;

        let text = page
            .text()
            .map_err(|e| PdfError::TextExtractionFailed(e.to_string()))?;

        let mut atoms = Vec::new();
        for ch in text.chars().iter() {
            let Some(unicode) = ch.unicode_char() else {
                continue;
            };
            let bounds = ch
                .loose_bounds()
                .map_err(|e| PdfError::TextExtractionFailed(e.to_string()))?;

            // pdfium reports bottom-left origin; flip to top-left page space
            let height = bounds.height().value;
            let y = page_height - bounds.bottom().value - height;
            let Ok(bbox) = BoundingBox::new(bounds.left().value, y, bounds.width().value, height)
            else {
                continue;
            };

            atoms.push(GlyphAtom {
                text: unicode.to_string(),
                font_size: ch.scaled_font_size().value,
                font_name: ch.font_name(),
                bbox,
            });
        }
        Ok(atoms)
    }

    fn content_ops(&self, page_number: u32) -> Result<Vec<ContentOp>> {
        check_page_number(page_number, self.page_count)?;
        let document = load(&self.pdfium, &self.bytes)?;
        let page = get_page(&document, page_number)?;

        let mut ops = Vec::new();
        for object in page.objects().iter() {
            let PdfPageObject::Image(ref image) = object else {
                continue;
            };

            let matrix = image
                .matrix()
                .map_err(|e| PdfError::ObjectExtractionFailed(e.to_string()))?;
            let decoded = image
                .get_raw_image()
                .map_err(|e| PdfError::ObjectExtractionFailed(e.to_string()))?;

            let mut bytes = Vec::new();
            decoded
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                .map_err(|e| PdfError::ObjectExtractionFailed(e.to_string()))?;

            // pdfium exposes the final matrix per object, not the stream's
            // q/cm/Q sequence, so each image replays as its own scope
            ops.push(ContentOp::Save);
            ops.push(ContentOp::SetMatrix(Matrix {
                a: matrix.a(),
                b: matrix.b(),
                c: matrix.c(),
                d: matrix.d(),
                e: matrix.e(),
                f: matrix.f(),
            }));
            ops.push(ContentOp::DrawImage(ImageData {
                native_width: decoded.width(),
                native_height: decoded.height(),
                bytes,
                suffix: "png".to_string(),
            }));
            ops.push(ContentOp::Restore);
        }
        Ok(ops)
    }

    fn rulings(&self, page_number: u32) -> Result<Vec<Ruling>> {
        check_page_number(page_number, self.page_count)?;
        let document = load(&self.pdfium, &self.bytes)?;
        let page = get_page(&document, page_number)?;
        let page_height = page.height().value;

        let mut rulings = Vec::new();
        for object in page.objects().iter() {
            let PdfPageObject::Path(ref path) = object else {
                continue;
            };
            let Ok(bounds) = path.bounds() else {
                continue;
            };

            let width = bounds.right().value - bounds.left().value;
            let height = bounds.top().value - bounds.bottom().value;
            if width > MAX_RULING_THICKNESS && height > MAX_RULING_THICKNESS {
                continue;
            }

            let y_top = page_height - bounds.top().value;
            let y_bottom = page_height - bounds.bottom().value;
            rulings.push(if width >= height {
                // horizontal: collapse thickness onto the midline
                let y = (y_top + y_bottom) / 2.0;
                Ruling {
                    x1: bounds.left().value,
                    y1: y,
                    x2: bounds.right().value,
                    y2: y,
                }
            } else {
                let x = (bounds.left().value + bounds.right().value) / 2.0;
                Ruling {
                    x1: x,
                    y1: y_top,
                    x2: x,
                    y2: y_bottom,
                }
            });
        }
        Ok(rulings)
    }

    fn render(&self, page_number: u32, dpi: u16) -> Result<PageImage> {
        check_page_number(page_number, self.page_count)?;
        let document = load(&self.pdfium, &self.bytes)?;
        let page = get_page(&document, page_number)?;

        let scale = f32::from(dpi) / PDF_POINTS_PER_INCH;
        let config = PdfRenderConfig::new()
            .set_target_width(((page.width().value * scale) as i32).max(1))
            .set_target_height(((page.height().value * scale) as i32).max(1))
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfError::RenderingFailed(e.to_string()))?;
        let rgb = bitmap.as_image().into_rgb8();

        Ok(PageImage {
            width: rgb.width(),
            height: rgb.height(),
            pixels: rgb.into_raw(),
        })
    }
}

fn get_page<'a>(document: &PdfDocument<'a>, page_number: u32) -> PdfResult<PdfPage<'a>> {
    document
        .pages()
        .get((page_number - 1) as u16)
        .map_err(|_| PdfError::PageNotFound(page_number))
}
