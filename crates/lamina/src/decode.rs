//! Page decoding collaborator contract.
//!
//! The binary document decoder lives outside the core: the pipeline only
//! depends on [`PageDecoder`], which exposes the low-level positioned
//! primitives the extractors consume. The crate ships one implementation
//! behind the `pdf` feature (see [`crate::pdf`]); tests supply in-memory
//! mocks.
//!
//! All geometry handed out by a decoder is already in top-left-origin page
//! space, except for the translation component of [`ContentOp`] matrices,
//! which stays in raw PDF space (bottom-left origin) because the image
//! extractor owns that conversion.

use crate::error::{LaminaError, Result};
use crate::geometry::{BoundingBox, Matrix};

/// One positioned glyph run: the atom of text reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphAtom {
    pub text: String,
    pub font_size: f32,
    pub font_name: String,
    pub bbox: BoundingBox,
}

impl GlyphAtom {
    /// Width of a space at this atom's font size. The 0.33 factor matches
    /// typical text-face space advances and anchors every gap heuristic in
    /// the text reconstructor.
    pub fn estimated_space_width(&self) -> f32 {
        self.font_size * 0.33
    }
}

/// A line segment drawn on the page, used by lattice table detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruling {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Ruling {
    /// Orientation tolerance: rulings are rarely pixel-perfect after
    /// coordinate conversion.
    const AXIS_TOLERANCE: f32 = 2.0;

    pub fn is_horizontal(&self) -> bool {
        (self.y2 - self.y1).abs() <= Self::AXIS_TOLERANCE
    }

    pub fn is_vertical(&self) -> bool {
        (self.x2 - self.x1).abs() <= Self::AXIS_TOLERANCE
    }

    pub fn bounds(&self) -> BoundingBox {
        let x = self.x1.min(self.x2);
        let y = self.y1.min(self.y2);
        BoundingBox {
            x,
            y,
            width: (self.x2 - self.x1).abs(),
            height: (self.y2 - self.y1).abs(),
        }
    }

    /// True when this ruling's span crosses the other's on both axes.
    pub fn crosses(&self, other: &Ruling) -> bool {
        let a = self.bounds();
        let b = other.bounds();
        a.x <= b.right() && a.right() >= b.x && a.y <= b.bottom() && a.bottom() >= b.y
    }
}

/// Raster render of one page, RGB8 row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Encoded bytes of an embedded raster image plus its native dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    /// File suffix without dot, e.g. "png".
    pub suffix: String,
    pub native_width: u32,
    pub native_height: u32,
}

/// Content-stream operators relevant to object placement.
///
/// The decoder collaborator walks the token-level stream and surfaces only
/// the graphics-state and draw operators; extractors act as visitors over
/// this sequence, so token decoding stays decoupled from geometry logic.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentOp {
    /// `q`: push the graphics state.
    Save,
    /// `Q`: pop the graphics state.
    Restore,
    /// `cm`: concatenate onto the current transformation matrix.
    Concat(Matrix),
    /// Replace the current transformation matrix outright.
    SetMatrix(Matrix),
    /// A raster image drawn under the current transformation matrix.
    DrawImage(ImageData),
}

/// Page box dimensions in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// One open document, exclusively owned by one extraction task for its
/// duration. All page numbers are 1-based; an index outside
/// `[1, page_count]` fails with a `Validation` error.
pub trait PageDecoder: Send {
    fn page_count(&self) -> u32;

    fn page_size(&self, page_number: u32) -> Result<PageSize>;

    /// Positioned glyph atoms for the whole page, unfiltered and unsorted.
    fn glyphs(&self, page_number: u32) -> Result<Vec<GlyphAtom>>;

    /// Placement-relevant content-stream operators in stream order.
    fn content_ops(&self, page_number: u32) -> Result<Vec<ContentOp>>;

    /// Drawn line segments, for ruled-line table detection.
    fn rulings(&self, page_number: u32) -> Result<Vec<Ruling>>;

    /// Rasterize the page at the given resolution.
    fn render(&self, page_number: u32, dpi: u16) -> Result<PageImage>;
}

/// Shared page-index validation for decoder implementations.
pub fn check_page_number(page_number: u32, page_count: u32) -> Result<()> {
    if page_number == 0 || page_number > page_count {
        return Err(LaminaError::validation(format!(
            "Page number must be 1-based and at most {page_count}. Received: {page_number}"
        )));
    }
    Ok(())
}
