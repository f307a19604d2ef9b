//! Lattice strategy: cell boundaries recovered from drawn ruling lines.

use super::{TableGrid, Word};
use crate::decode::Ruling;
use crate::geometry::BoundingBox;

/// Rulings within this distance snap to a single grid boundary.
const SNAP_TOLERANCE: f32 = 2.0;

/// Finds ruled table zones: groups of horizontal and vertical rulings that
/// cross each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct LatticeDetector;

impl LatticeDetector {
    pub fn new() -> Self {
        Self
    }

    /// A zone is the bounding box of a connected component of crossing
    /// rulings, kept only when it holds at least two rulings of each
    /// orientation (the minimum for one enclosed cell).
    pub fn detect(&self, rulings: &[Ruling]) -> Vec<BoundingBox> {
        let axis_aligned: Vec<&Ruling> = rulings
            .iter()
            .filter(|r| r.is_horizontal() || r.is_vertical())
            .collect();

        let components = connected_components(&axis_aligned);

        components
            .into_iter()
            .filter_map(|component| {
                let horizontal = component.iter().filter(|r| r.is_horizontal()).count();
                let vertical = component.iter().filter(|r| r.is_vertical()).count();
                if horizontal < 2 || vertical < 2 {
                    return None;
                }
                component
                    .iter()
                    .map(|r| r.bounds())
                    .reduce(|acc, b| acc.union(&b))
            })
            .collect()
    }
}

/// Union-find over rulings with crossing as the edge relation.
fn connected_components<'a>(rulings: &[&'a Ruling]) -> Vec<Vec<&'a Ruling>> {
    let n = rulings.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], i: usize) -> usize {
        let mut root = i;
        while parent[root] != root {
            root = parent[root];
        }
        let mut cursor = i;
        while parent[cursor] != root {
            let next = parent[cursor];
            parent[cursor] = root;
            cursor = next;
        }
        root
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if rulings[i].crosses(rulings[j]) {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    parent[a] = b;
                }
            }
        }
    }

    let mut groups: Vec<Vec<&Ruling>> = vec![Vec::new(); n];
    for i in 0..n {
        let root = find(&mut parent, i);
        groups[root].push(rulings[i]);
    }
    groups.retain(|g| !g.is_empty());
    groups
}

/// Build the cell grid for a ruled zone. Horizontal rulings provide the row
/// boundaries and vertical rulings the column boundaries; words are assigned
/// to the cell containing their centroid.
pub fn extract_grid(words: &[Word], rulings: &[Ruling], zone: &BoundingBox) -> Option<TableGrid> {
    // edge-inclusive: a table's outer frame lies exactly on the zone border,
    // and ruling bounds have zero thickness
    let inside: Vec<&Ruling> = rulings
        .iter()
        .filter(|r| zone.touches(&r.bounds()))
        .collect();

    let row_bounds = snap(inside.iter().filter(|r| r.is_horizontal()).map(|r| r.y1));
    let col_bounds = snap(inside.iter().filter(|r| r.is_vertical()).map(|r| r.x1));

    // n boundaries enclose n-1 cells
    if row_bounds.len() < 2 || col_bounds.len() < 2 {
        return None;
    }

    let rows = row_bounds.len() - 1;
    let cols = col_bounds.len() - 1;
    let mut cells: Vec<Vec<Vec<&Word>>> = vec![vec![Vec::new(); cols]; rows];

    for word in words {
        let (cx, cy) = word.bbox.centroid();
        let Some(row) = band_index(&row_bounds, cy) else {
            continue;
        };
        let Some(col) = band_index(&col_bounds, cx) else {
            continue;
        };
        cells[row][col].push(word);
    }

    let grid = cells
        .into_iter()
        .map(|row| row.into_iter().map(|cell| join_words(&cell)).collect())
        .collect();

    Some(TableGrid { cells: grid })
}

/// Collapse nearby coordinates into single boundaries, sorted ascending.
fn snap(coords: impl Iterator<Item = f32>) -> Vec<f32> {
    let mut sorted: Vec<f32> = coords.collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut bounds: Vec<f32> = Vec::new();
    for coord in sorted {
        match bounds.last() {
            Some(last) if (coord - last).abs() <= SNAP_TOLERANCE => {}
            _ => bounds.push(coord),
        }
    }
    bounds
}

/// Index of the band `[bounds[i], bounds[i+1])` containing `value`.
fn band_index(bounds: &[f32], value: f32) -> Option<usize> {
    if bounds.len() < 2 {
        return None;
    }
    bounds
        .windows(2)
        .position(|pair| value >= pair[0] && value < pair[1])
}

fn join_words(cell: &[&Word]) -> String {
    let mut sorted: Vec<&&Word> = cell.iter().collect();
    sorted.sort_by(|a, b| {
        let same_line = (a.bbox.y - b.bbox.y).abs() <= 1.0;
        let (lhs, rhs) = if same_line {
            (a.bbox.x, b.bbox.x)
        } else {
            (a.bbox.y, b.bbox.y)
        };
        lhs.partial_cmp(&rhs).unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal(y: f32, x1: f32, x2: f32) -> Ruling {
        Ruling { x1, y1: y, x2, y2: y }
    }

    fn vertical(x: f32, y1: f32, y2: f32) -> Ruling {
        Ruling { x1: x, y1, x2: x, y2 }
    }

    fn word(text: &str, x: f32, y: f32) -> Word {
        Word {
            text: text.to_string(),
            bbox: BoundingBox::new(x, y, 20.0, 10.0).unwrap(),
        }
    }

    /// 2x2 grid: three boundaries in each orientation.
    fn grid_rulings() -> Vec<Ruling> {
        vec![
            horizontal(0.0, 0.0, 100.0),
            horizontal(50.0, 0.0, 100.0),
            horizontal(100.0, 0.0, 100.0),
            vertical(0.0, 0.0, 100.0),
            vertical(50.0, 0.0, 100.0),
            vertical(100.0, 0.0, 100.0),
        ]
    }

    #[test]
    fn test_detect_finds_ruled_grid() {
        let zones = LatticeDetector::new().detect(&grid_rulings());
        assert_eq!(zones.len(), 1);
        let zone = zones[0];
        assert_eq!(zone.x, 0.0);
        assert_eq!(zone.width, 100.0);
        assert_eq!(zone.height, 100.0);
    }

    #[test]
    fn test_detect_ignores_lone_rulings() {
        // a single underline crosses nothing
        let zones = LatticeDetector::new().detect(&[horizontal(10.0, 0.0, 50.0)]);
        assert!(zones.is_empty());
    }

    #[test]
    fn test_detect_requires_both_orientations() {
        // stacked horizontal separators without verticals are not a lattice
        let rulings = vec![
            horizontal(0.0, 0.0, 100.0),
            horizontal(20.0, 0.0, 100.0),
            horizontal(40.0, 0.0, 100.0),
        ];
        assert!(LatticeDetector::new().detect(&rulings).is_empty());
    }

    #[test]
    fn test_extract_grid_assigns_by_centroid() {
        let rulings = grid_rulings();
        let zone = BoundingBox::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let words = vec![
            word("a", 5.0, 10.0),
            word("b", 55.0, 10.0),
            word("c", 5.0, 60.0),
            word("d", 55.0, 60.0),
        ];
        let grid = extract_grid(&words, &rulings, &zone).unwrap();
        assert_eq!(
            grid.cells,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ]
        );
    }

    #[test]
    fn test_extract_grid_joins_multiple_words_per_cell() {
        let rulings = grid_rulings();
        let zone = BoundingBox::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let words = vec![word("unit", 5.0, 10.0), word("price", 27.0, 10.0)];
        let grid = extract_grid(&words, &rulings, &zone).unwrap();
        assert_eq!(grid.cells[0][0], "unit price");
    }

    #[test]
    fn test_extract_grid_keeps_frame_on_zone_border() {
        // only the outer frame, every ruling exactly on the zone edge
        let zone = BoundingBox::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let rulings = vec![
            horizontal(0.0, 0.0, 100.0),
            horizontal(100.0, 0.0, 100.0),
            vertical(0.0, 0.0, 100.0),
            vertical(100.0, 0.0, 100.0),
        ];
        let grid = extract_grid(&[word("only", 40.0, 45.0)], &rulings, &zone).unwrap();
        assert_eq!(grid.cells, vec![vec!["only".to_string()]]);
    }

    #[test]
    fn test_extract_grid_needs_enclosing_boundaries() {
        let zone = BoundingBox::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let rulings = vec![horizontal(0.0, 0.0, 100.0), vertical(0.0, 0.0, 100.0)];
        assert!(extract_grid(&[], &rulings, &zone).is_none());
    }

    #[test]
    fn test_snap_merges_near_coordinates() {
        let bounds = snap(vec![0.0, 1.0, 50.0, 51.5, 100.0].into_iter());
        assert_eq!(bounds, vec![0.0, 50.0, 100.0]);
    }
}
