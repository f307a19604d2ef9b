//! Table recovery from glyph geometry and ruling lines.
//!
//! Detected table zones are refined (merged when overlapping), then each zone
//! is extracted with one of two strategies:
//! - lattice, when ruling lines cover enough of the zone to trust drawn cell
//!   borders;
//! - stream, reconstructing columns from whitespace alignment when the table
//!   is drawn without borders.
//!
//! Extracted grids that fail the noise validator are discarded rather than
//! emitted as degenerate single-cell tables.

mod lattice;
mod refine;
mod stream;
mod validate;

pub use lattice::LatticeDetector;
pub use refine::refine_zones;
pub use stream::StreamDetector;

use crate::decode::{GlyphAtom, Ruling};
use crate::geometry::BoundingBox;
use crate::types::{Content, DocumentElement, ElementType, Location};

/// Minimum fraction of a zone's area that rulings must span for the lattice
/// strategy to be trusted over stream.
const LATTICE_COVERAGE_THRESHOLD: f32 = 0.50;

/// A horizontal run of atoms glued into a single token.
#[derive(Debug, Clone)]
pub struct Word {
    pub text: String,
    pub bbox: BoundingBox,
}

/// Group reading-ordered atoms into words: atoms on the same visual line
/// whose gap stays under half an estimated space width belong to one word.
pub fn words_from_atoms(atoms: &[GlyphAtom]) -> Vec<Word> {
    let mut sorted: Vec<&GlyphAtom> = atoms.iter().filter(|a| !a.text.trim().is_empty()).collect();
    sorted.sort_by(|a, b| {
        let same_line = (a.bbox.y - b.bbox.y).abs() <= 1.0;
        let (lhs, rhs) = if same_line {
            (a.bbox.x, b.bbox.x)
        } else {
            (a.bbox.y, b.bbox.y)
        };
        lhs.partial_cmp(&rhs).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut words: Vec<Word> = Vec::new();
    for atom in sorted {
        let glue = match words.last() {
            Some(word) => {
                let same_line = word.bbox.vertical_overlap_ratio(&atom.bbox) > 0.5;
                let gap = word.bbox.horizontal_gap(&atom.bbox);
                let forward = atom.bbox.x >= word.bbox.x;
                same_line && forward && gap <= atom.estimated_space_width() * 0.5
            }
            None => false,
        };
        if glue {
            let word = words.last_mut().expect("checked non-empty above");
            word.text.push_str(&atom.text);
            word.bbox = word.bbox.union(&atom.bbox);
        } else {
            words.push(Word {
                text: atom.text.clone(),
                bbox: atom.bbox,
            });
        }
    }
    words
}

/// A rectangular grid of cell texts; rows may have differing emptiness but
/// share a common column count.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    pub cells: Vec<Vec<String>>,
}

impl TableGrid {
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// RFC 4180 serialization: cells containing a comma, quote, or newline
    /// are quoted with embedded quotes doubled. Output carries a trailing
    /// newline.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(|cell| escape_csv(cell)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

fn escape_csv(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Stateless table extractor covering zone detection, strategy selection,
/// extraction, and validation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableExtractor;

impl TableExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract tables from the detector-supplied `zones`, falling back to
    /// page-wide detection when none were supplied. A candidate zone whose
    /// centroid falls inside any of `zones_to_exclude` is skipped entirely.
    pub fn extract(
        &self,
        atoms: &[GlyphAtom],
        rulings: &[Ruling],
        page_number: u32,
        zones: &[BoundingBox],
        zones_to_exclude: &[BoundingBox],
    ) -> Vec<DocumentElement> {
        let words = words_from_atoms(atoms);

        let candidate_zones = if zones.is_empty() {
            self.detect_zones(&words, rulings)
        } else {
            refine_zones(zones.to_vec())
        };

        candidate_zones
            .into_iter()
            .filter(|zone| {
                let (cx, cy) = zone.centroid();
                !zones_to_exclude.iter().any(|ex| ex.contains_point(cx, cy))
            })
            .filter_map(|zone| {
                let grid = self.extract_zone(&words, rulings, &zone)?;
                if validate::is_noise(&grid) {
                    return None;
                }
                Some(DocumentElement::new(
                    ElementType::Table,
                    Location {
                        page_number,
                        bbox: zone,
                    },
                    Content::Table {
                        csv: grid.to_csv(),
                    },
                ))
            })
            .collect()
    }

    /// Page-wide zone detection: ruled regions first, whitespace-aligned
    /// regions second, merged together.
    pub fn detect_zones(&self, words: &[Word], rulings: &[Ruling]) -> Vec<BoundingBox> {
        let mut zones = LatticeDetector::new().detect(rulings);
        zones.extend(StreamDetector::new().detect(words));
        refine_zones(zones)
    }

    fn extract_zone(
        &self,
        words: &[Word],
        rulings: &[Ruling],
        zone: &BoundingBox,
    ) -> Option<TableGrid> {
        let zone_words: Vec<Word> = words
            .iter()
            .filter(|w| {
                let (cx, cy) = w.bbox.centroid();
                zone.contains_point(cx, cy)
            })
            .cloned()
            .collect();

        if ruling_coverage(rulings, zone) > LATTICE_COVERAGE_THRESHOLD {
            lattice::extract_grid(&zone_words, rulings, zone)
        } else {
            stream::extract_grid(&zone_words)
        }
    }
}

/// Fraction of the zone's area covered by ruled-grid candidates. Rulings
/// that form no lattice (underlines, lone separator rules) contribute
/// nothing, so a borderless table framed by horizontal rules still takes the
/// stream path.
fn ruling_coverage(rulings: &[Ruling], zone: &BoundingBox) -> f32 {
    let zone_area = zone.area();
    if zone_area <= 0.0 {
        return 0.0;
    }
    let covered: f32 = LatticeDetector::new()
        .detect(rulings)
        .iter()
        .map(|candidate| candidate.intersection_area(zone))
        .sum();
    covered / zone_area
}
