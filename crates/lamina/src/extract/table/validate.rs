//! Noise filter for extracted grids. Strategy heuristics occasionally fire
//! on aligned prose or figure captions; the checks here reject grids that no
//! human would call a table.

use super::TableGrid;

const MIN_EFFECTIVE_ROWS: usize = 2;
const MIN_EFFECTIVE_COLUMNS: usize = 2;
const MIN_FILLED_CELLS: usize = 2;
const MAX_SPARSITY: f32 = 0.90;
const MAX_AVERAGE_CELL_LENGTH: f32 = 150.0;
const MAX_CELL_LENGTH: usize = 500;

/// A grid is noise when any of the following hold:
/// - fewer than two rows or two columns contain any text;
/// - fewer than two cells are filled at all;
/// - more than 90% of the effective area (non-empty rows times non-empty
///   columns) is empty; fully blank rows and columns carry no signal either
///   way, so they are left out of the ratio;
/// - the average filled cell exceeds 150 characters, or any single cell
///   exceeds 500 (paragraph text captured as a cell).
pub fn is_noise(grid: &TableGrid) -> bool {
    let effective_rows = grid
        .cells
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .count();
    if effective_rows < MIN_EFFECTIVE_ROWS {
        return true;
    }

    let columns = grid.column_count();
    let effective_columns = (0..columns)
        .filter(|&col| {
            grid.cells
                .iter()
                .any(|row| row.get(col).is_some_and(|cell| !cell.trim().is_empty()))
        })
        .count();
    if effective_columns < MIN_EFFECTIVE_COLUMNS {
        return true;
    }

    let effective_area = effective_rows * effective_columns;
    let filled: Vec<&String> = grid
        .cells
        .iter()
        .flatten()
        .filter(|cell| !cell.trim().is_empty())
        .collect();

    if filled.len() < MIN_FILLED_CELLS {
        return true;
    }
    let sparsity = 1.0 - filled.len() as f32 / effective_area as f32;
    if sparsity > MAX_SPARSITY {
        return true;
    }

    let total_len: usize = filled.iter().map(|cell| cell.chars().count()).sum();
    let average_len = total_len as f32 / filled.len() as f32;
    if average_len > MAX_AVERAGE_CELL_LENGTH {
        return true;
    }
    filled.iter().any(|cell| cell.chars().count() > MAX_CELL_LENGTH)
}
