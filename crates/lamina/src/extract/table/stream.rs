//! Stream strategy: column structure recovered from whitespace alignment,
//! for tables drawn without ruling lines.

use super::{TableGrid, Word};
use crate::geometry::BoundingBox;

/// Left edges within this distance count as the same column.
const COLUMN_ALIGNMENT_TOLERANCE: f32 = 3.0;

/// Minimum aligned columns shared by consecutive rows for those rows to be
/// treated as tabular.
const MIN_SHARED_COLUMNS: usize = 2;

/// Finds borderless table zones: runs of consecutive word rows whose left
/// edges line up into at least two shared columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamDetector;

impl StreamDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, words: &[Word]) -> Vec<BoundingBox> {
        let rows = group_rows(words);

        let mut zones: Vec<BoundingBox> = Vec::new();
        let mut run: Vec<&Row> = Vec::new();

        for pair in rows.windows(2) {
            if shared_columns(&pair[0], &pair[1]) >= MIN_SHARED_COLUMNS {
                if run.is_empty() {
                    run.push(&pair[0]);
                }
                run.push(&pair[1]);
            } else {
                zones.extend(close_run(&run));
                run.clear();
            }
        }
        zones.extend(close_run(&run));
        zones
    }
}

struct Row {
    words: Vec<Word>,
    bbox: BoundingBox,
}

impl Row {
    fn left_edges(&self) -> Vec<f32> {
        self.words.iter().map(|w| w.bbox.x).collect()
    }
}

/// Rows are maximal runs of words whose boxes overlap vertically. Input
/// words arrive in reading order from `words_from_atoms`, so a row ends at
/// the first word that no longer overlaps it.
fn group_rows(words: &[Word]) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::new();
    for word in words {
        match rows.last_mut() {
            Some(row) if row.bbox.vertical_overlap_ratio(&word.bbox) > 0.5 => {
                row.bbox = row.bbox.union(&word.bbox);
                row.words.push(word.clone());
            }
            _ => rows.push(Row {
                bbox: word.bbox,
                words: vec![word.clone()],
            }),
        }
    }
    rows
}

fn shared_columns(a: &Row, b: &Row) -> usize {
    let edges_b = b.left_edges();
    a.left_edges()
        .iter()
        .filter(|edge| {
            edges_b
                .iter()
                .any(|other| (*other - **edge).abs() <= COLUMN_ALIGNMENT_TOLERANCE)
        })
        .count()
}

fn close_run(run: &[&Row]) -> Option<BoundingBox> {
    // one aligned row pair is already a two-row candidate
    if run.len() < 2 {
        return None;
    }
    run.iter()
        .map(|row| row.bbox)
        .reduce(|acc, b| acc.union(&b))
}

/// Build a grid for a borderless zone: cluster left edges across all rows
/// into column positions, then place each word in its nearest column.
pub fn extract_grid(words: &[Word]) -> Option<TableGrid> {
    let rows = group_rows(words);
    if rows.is_empty() {
        return None;
    }

    let mut edges: Vec<f32> = rows.iter().flat_map(Row::left_edges).collect();
    edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut columns: Vec<f32> = Vec::new();
    for edge in edges {
        match columns.last() {
            Some(last) if (edge - last).abs() <= COLUMN_ALIGNMENT_TOLERANCE => {}
            _ => columns.push(edge),
        }
    }
    if columns.is_empty() {
        return None;
    }

    let cells = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for word in &row.words {
                cells[nearest_column(&columns, word.bbox.x)].push(word.text.as_str());
            }
            cells.into_iter().map(|cell| cell.join(" ")).collect()
        })
        .collect();

    Some(TableGrid { cells })
}

fn nearest_column(columns: &[f32], x: f32) -> usize {
    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (x - **a)
                .abs()
                .partial_cmp(&(x - **b).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}
