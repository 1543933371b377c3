use std::collections::HashMap;

use crate::map::geometry::Bounds;

/// Spatial index over country polygons using conservative approximation.
/// Each polygon's bounding box is registered in every grid cell it overlaps,
/// guaranteeing no false negatives while allowing false positives, which the
/// exact point-in-polygon test downstream eliminates.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<u16>>,
    cell_size: f64,
}

impl FeatureGrid {
    /// Create a grid with the given cell size in degrees.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        (
            (lon / self.cell_size).floor() as i32,
            (lat / self.cell_size).floor() as i32,
        )
    }

    /// Register a feature index in every cell its bounding box touches.
    pub fn insert(&mut self, bounds: &Bounds, idx: u16) {
        let min_cell = self.to_cell(bounds.min_lon, bounds.min_lat);
        let max_cell = self.to_cell(bounds.max_lon, bounds.max_lat);
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                let entry = self.cells.entry((x, y)).or_default();
                if entry.last() != Some(&idx) {
                    entry.push(idx);
                }
            }
        }
    }

    /// Candidate feature indices for the cell containing the point.
    pub fn candidates(&self, lon: f64, lat: f64) -> &[u16] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::geometry::{Bounds, Ring};

    fn bounds(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Bounds {
        let ring: Ring = vec![(min_lon, min_lat), (max_lon, max_lat)];
        Bounds::of_ring(&ring)
    }

    #[test]
    fn test_candidates_cover_the_bbox() {
        let mut grid = FeatureGrid::new(5.0);
        grid.insert(&bounds(-10.0, 40.0, 10.0, 55.0), 0);
        grid.insert(&bounds(100.0, -40.0, 120.0, -20.0), 1);

        assert_eq!(grid.candidates(0.0, 48.0), &[0]);
        assert_eq!(grid.candidates(110.0, -30.0), &[1]);
        assert!(grid.candidates(0.0, -30.0).is_empty());
    }

    #[test]
    fn test_false_positives_inside_bbox_cells_are_allowed() {
        let mut grid = FeatureGrid::new(5.0);
        grid.insert(&bounds(0.0, 0.0, 9.0, 9.0), 7);
        // Corner cell overlaps the bbox even where the polygon may not reach.
        assert_eq!(grid.candidates(8.0, 8.0), &[7]);
    }

    #[test]
    fn test_overlapping_features_stack_in_order() {
        let mut grid = FeatureGrid::new(5.0);
        grid.insert(&bounds(0.0, 0.0, 4.0, 4.0), 0);
        grid.insert(&bounds(1.0, 1.0, 3.0, 3.0), 1);
        assert_eq!(grid.candidates(2.0, 2.0), &[0, 1]);
    }
}
