//! Zone refinement: overlapping table candidates collapse into one zone so
//! the same region is never extracted twice.

use crate::geometry::BoundingBox;
use std::cmp::Ordering;

/// Merge intersecting zones with a single sweep over zones sorted by top
/// edge, then left edge. Sorting first makes one pass sufficient: any zone
/// that can merge with the current accumulator starts no higher than it.
pub fn refine_zones(mut zones: Vec<BoundingBox>) -> Vec<BoundingBox> {
    zones.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut merged: Vec<BoundingBox> = Vec::new();
    for zone in zones {
        match merged.last_mut() {
            Some(last) if last.intersects(&zone) => *last = last.union(&zone),
            _ => merged.push(zone),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f32, y: f32, width: f32, height: f32) -> BoundingBox {
        BoundingBox::new(x, y, width, height).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(refine_zones(Vec::new()).is_empty());
    }

    #[test]
    fn test_disjoint_zones_kept_apart() {
        let zones = refine_zones(vec![bbox(0.0, 0.0, 50.0, 50.0), bbox(0.0, 100.0, 50.0, 50.0)]);
        assert_eq!(zones.len(), 2);
    }

    #[test]
    fn test_overlapping_zones_merge() {
        let zones = refine_zones(vec![bbox(0.0, 0.0, 60.0, 60.0), bbox(40.0, 40.0, 60.0, 60.0)]);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0], bbox(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_merge_is_transitive_through_sweep() {
        // a bridges b and c
        let zones = refine_zones(vec![
            bbox(0.0, 0.0, 30.0, 30.0),
            bbox(25.0, 10.0, 30.0, 30.0),
            bbox(50.0, 20.0, 30.0, 30.0),
        ]);
        assert_eq!(zones.len(), 1);
    }

    #[test]
    fn test_output_sorted_by_position() {
        let zones = refine_zones(vec![bbox(0.0, 100.0, 10.0, 10.0), bbox(0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(zones[0].y, 0.0);
        assert_eq!(zones[1].y, 100.0);
    }
}
