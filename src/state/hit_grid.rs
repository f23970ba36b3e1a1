//! HitGrid for coordinate-to-component lookup.
//!
//! Each cell holds the registry slot of the component painted on top at
//! that position. Later registrations cover earlier ones, matching render
//! order. The grid is rebuilt from the registry whenever a region changes,
//! so a mouse event costs one array lookup.

use crate::types::Region;

const EMPTY: usize = usize::MAX;

/// Screen-sized grid of registry slots.
#[derive(Debug, Clone)]
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<usize>,
}

impl HitGrid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize the grid, clearing all contents.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells = vec![EMPTY; usize::from(width) * usize::from(height)];
    }

    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Mark `region` (clipped to the grid) as belonging to `slot`.
    pub fn fill_region(&mut self, region: &Region, slot: usize) {
        let Some(area) = region.intersect(&Region::new(0, 0, self.width, self.height)) else {
            return;
        };
        let width = usize::from(self.width);
        for y in usize::from(area.y)..usize::from(area.y) + usize::from(area.height) {
            let row = y * width;
            self.cells[row + usize::from(area.x)..row + usize::from(area.x) + usize::from(area.width)].fill(slot);
        }
    }

    /// Rebuild from regions in paint order; slot = position in the iterator.
    pub fn rebuild<'a>(&mut self, regions: impl IntoIterator<Item = &'a Region>) {
        self.clear();
        for (slot, region) in regions.into_iter().enumerate() {
            self.fill_region(region, slot);
        }
    }

    /// Slot of the topmost component at a position.
    pub fn get(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let value = self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)];
        (value != EMPTY).then_some(value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_grid_fill_region() {
        let mut grid = HitGrid::new(10, 10);
        assert_eq!(grid.get(5, 5), None);

        grid.fill_region(&Region::new(2, 2, 4, 4), 42);

        // Inside
        assert_eq!(grid.get(2, 2), Some(42));
        assert_eq!(grid.get(5, 5), Some(42));

        // Outside
        assert_eq!(grid.get(1, 2), None);
        assert_eq!(grid.get(6, 2), None);
    }

    #[test]
    fn test_rebuild_later_slots_on_top() {
        let mut grid = HitGrid::new(10, 4);
        let regions = [Region::new(0, 0, 10, 4), Region::new(3, 1, 2, 2)];
        grid.rebuild(&regions);
        assert_eq!(grid.get(0, 0), Some(0));
        assert_eq!(grid.get(3, 1), Some(1));
        assert_eq!(grid.get(5, 1), Some(0));
    }

    #[test]
    fn test_hit_grid_resize_and_bounds() {
        let mut grid = HitGrid::new(10, 10);
        grid.fill_region(&Region::new(0, 0, 50, 50), 1);
        assert_eq!(grid.get(9, 9), Some(1));
        assert_eq!(grid.get(10, 5), None);

        grid.resize(20, 20);
        assert_eq!(grid.get(2, 2), None);
        assert_eq!((grid.width(), grid.height()), (20, 20));
    }
}
