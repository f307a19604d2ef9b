//! Text reconstruction: positioned glyph atoms to lines to blocks.
//!
//! The decoder hands over raw glyph runs with no guaranteed order; this
//! module rebuilds visual lines and paragraphs from geometry alone, then
//! emits one text element per block.
//!
//! Two distinct same-line decisions exist at different granularities and are
//! deliberately not unified:
//! - atom ordering uses a fixed absolute tolerance (`SAME_LINE_Y_TOLERANCE`,
//!   |dy| <= 1.0 unit), because atoms within one glyph run sit on an exact
//!   baseline;
//! - block and element ordering uses the relative 0.40 vertical-overlap-ratio
//!   test in [`BoundingBox::compare_reading_order`], which tolerates the
//!   looser alignment of whole regions.
//!
//! Collapsing one into the other silently changes output ordering.

use crate::decode::GlyphAtom;
use crate::geometry::BoundingBox;
use crate::types::{Content, DocumentElement, ElementType, Location};
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// Absolute y tolerance for atom-level same-line ordering.
const SAME_LINE_Y_TOLERANCE: f32 = 1.0;

/// Minimum vertical overlap ratio for an atom to extend the current line.
const VERTICAL_ALIGNMENT_THRESHOLD: f32 = 0.50;

/// A line breaks when the gap to the next atom exceeds this many estimated
/// space widths.
const MAX_CHAR_DISTANCE_FACTOR: f32 = 3.0;

/// A block breaks when the next line's vertical gap exceeds this many
/// multiples of the block's average font size.
const MAX_LINE_SPACING_FACTOR: f32 = 1.5;

/// Gaps above half an estimated space width become an explicit space when
/// joining atoms; smaller gaps are glued, rejoining words split across
/// glyph runs.
const SPACE_TOLERANCE_FACTOR: f32 = 0.5;

/// Stateless text reconstructor. Every call builds fresh accumulators, so one
/// instance is safe to share across concurrently processed files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReconstructor;

impl TextReconstructor {
    pub fn new() -> Self {
        Self
    }

    /// Reconstruct the text inside `region` (or the whole page) into one
    /// element per block.
    ///
    /// Atoms intersecting any exclusion zone are dropped; those zones are
    /// already claimed by table extraction. The element type is the supplied
    /// hint or `Text`. Empty input yields an empty vec, never an error.
    pub fn extract(
        &self,
        atoms: &[GlyphAtom],
        page_number: u32,
        region: Option<BoundingBox>,
        zones_to_exclude: &[BoundingBox],
        type_hint: Option<ElementType>,
    ) -> Vec<DocumentElement> {
        let mut filtered: Vec<GlyphAtom> = atoms
            .iter()
            .filter(|atom| !atom.text.trim().is_empty())
            .filter(|atom| region.is_none_or(|r| r.intersects(&atom.bbox)))
            .filter(|atom| !zones_to_exclude.iter().any(|z| z.intersects(&atom.bbox)))
            .map(|atom| GlyphAtom {
                text: atom.text.nfkc().collect(),
                ..atom.clone()
            })
            .collect();

        filtered.sort_by(atom_reading_order);

        let lines = form_lines(filtered);
        let mut blocks = form_blocks(lines);

        blocks.sort_by(|a, b| BoundingBox::compare_reading_order(&a.bbox, &b.bbox));

        let element_type = type_hint.unwrap_or(ElementType::Text);

        blocks
            .into_iter()
            .map(|block| {
                let bbox = block.bbox;
                DocumentElement::new(
                    element_type,
                    Location { page_number, bbox },
                    Content::Text { text: block.text() },
                )
            })
            .collect()
    }
}

/// Atom-granularity reading order: fixed-tolerance same-line test, then x,
/// otherwise y.
fn atom_reading_order(a: &GlyphAtom, b: &GlyphAtom) -> Ordering {
    let on_same_line = (a.bbox.y - b.bbox.y).abs() <= SAME_LINE_Y_TOLERANCE;

    let (lhs, rhs) = if on_same_line {
        (a.bbox.x, b.bbox.x)
    } else {
        (a.bbox.y, b.bbox.y)
    };
    lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
}

struct Line {
    atoms: Vec<GlyphAtom>,
    bbox: BoundingBox,
}

impl Line {
    fn start(atom: GlyphAtom) -> Self {
        let bbox = atom.bbox;
        Self {
            atoms: vec![atom],
            bbox,
        }
    }

    fn last(&self) -> &GlyphAtom {
        // a line always holds at least its starting atom
        self.atoms.last().expect("line cannot be empty")
    }

    /// Greedy extension test: vertically aligned, close enough, and not
    /// behind the previous atom.
    fn accepts(&self, atom: &GlyphAtom) -> bool {
        let previous = self.last();

        let aligned =
            previous.bbox.vertical_overlap_ratio(&atom.bbox) > VERTICAL_ALIGNMENT_THRESHOLD;
        let near = previous.bbox.horizontal_gap(&atom.bbox)
            < previous.estimated_space_width() * MAX_CHAR_DISTANCE_FACTOR;
        let forward = atom.bbox.x > previous.bbox.x;

        aligned && near && forward
    }

    fn push(&mut self, atom: GlyphAtom) {
        self.bbox = self.bbox.union(&atom.bbox);
        self.atoms.push(atom);
    }

    /// Join atoms, inserting a single space only across word-sized gaps.
    fn text(&self) -> String {
        let mut out = String::new();
        for (i, atom) in self.atoms.iter().enumerate() {
            if i > 0 {
                let previous = &self.atoms[i - 1];
                let gap = previous.bbox.horizontal_gap(&atom.bbox);
                if gap > previous.estimated_space_width() * SPACE_TOLERANCE_FACTOR {
                    out.push(' ');
                }
            }
            out.push_str(&atom.text);
        }
        out
    }
}

struct Block {
    lines: Vec<Line>,
    bbox: BoundingBox,
    font_size_sum: f32,
    atom_count: u32,
}

impl Block {
    fn start(line: Line) -> Self {
        let bbox = line.bbox;
        let mut block = Self {
            lines: Vec::new(),
            bbox,
            font_size_sum: 0.0,
            atom_count: 0,
        };
        block.push(line);
        block
    }

    fn push(&mut self, line: Line) {
        for atom in &line.atoms {
            self.font_size_sum += atom.font_size;
            self.atom_count += 1;
        }
        self.bbox = self.bbox.union(&line.bbox);
        self.lines.push(line);
    }

    /// Line-spacing reference for block segmentation.
    fn average_font_size(&self) -> f32 {
        if self.atom_count == 0 {
            return 0.0;
        }
        self.font_size_sum / self.atom_count as f32
    }

    fn accepts(&self, line: &Line) -> bool {
        self.bbox.vertical_gap(&line.bbox) < self.average_font_size() * MAX_LINE_SPACING_FACTOR
    }

    fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn form_lines(atoms: Vec<GlyphAtom>) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Option<Line> = None;

    for atom in atoms {
        match current.as_mut() {
            Some(line) if line.accepts(&atom) => line.push(atom),
            Some(_) => {
                lines.extend(current.take());
                current = Some(Line::start(atom));
            }
            None => current = Some(Line::start(atom)),
        }
    }

    lines.extend(current);
    lines
}

fn form_blocks(lines: Vec<Line>) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Option<Block> = None;

    for line in lines {
        match current.as_mut() {
            Some(block) if block.accepts(&line) => block.push(line),
            Some(_) => {
                blocks.extend(current.take());
                current = Some(Block::start(line));
            }
            None => current = Some(Block::start(line)),
        }
    }

    blocks.extend(current);
    blocks
}
