//! MiniGrid - a re-centerable viewport mirroring a window of another grid.

use tracing::debug;

use crate::cell::{Cell, OccupantId};
use crate::coords::{Coord, PixelFrame, Viewport};
use crate::error::GridError;

use super::{Grid, GridId, GridKind};

#[derive(Debug, Clone)]
pub struct MiniGrid {
    grid: Grid,
    attached: GridId,
    center: Option<Coord>,
}

impl MiniGrid {
    /// A minimap of `width` x `height` cells attached to `parent`. Its cells read
    /// as off-map until the first `calibrate`.
    pub fn new(
        id: GridId,
        parent: &Grid,
        width: u32,
        height: u32,
        frame: PixelFrame,
    ) -> Result<Self, GridError> {
        let mut grid = Grid::new(id, GridKind::Minimap, width, height, frame);
        grid.create_cells()?;
        for cell in grid.cells_mut() {
            cell.reset_off_map();
        }
        Ok(Self {
            grid,
            attached: parent.id(),
            center: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn attached(&self) -> GridId {
        self.attached
    }

    pub fn center(&self) -> Option<Coord> {
        self.center
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.center
            .map(|center| Viewport::new(self.grid.bounds(), center))
    }

    /// Re-centers on parent cell (center_x, center_y) and mirrors the window.
    /// Returns the occupants now shown so their images can be refreshed.
    pub fn calibrate(&mut self, parent: &Grid, center_x: i32, center_y: i32) -> Vec<OccupantId> {
        self.center = Some(Coord::new(center_x, center_y));
        self.resync(parent)
    }

    /// Copies the current window from the parent again, e.g. after the parent
    /// changed under an unmoved viewport.
    pub fn resync(&mut self, parent: &Grid) -> Vec<OccupantId> {
        assert_eq!(
            parent.id(),
            self.attached,
            "minimap synchronised against a grid it is not attached to"
        );
        let Some(viewport) = self.viewport() else {
            return Vec::new();
        };
        let mut shown = Vec::new();
        let mut off_map = 0;
        for cell in self.grid.cells_mut() {
            let source = viewport.to_parent(cell.x(), cell.y());
            match parent.cell_at(source) {
                Some(parent_cell) => {
                    cell.copy_state_from(parent_cell);
                    shown.extend_from_slice(parent_cell.occupants());
                }
                None => {
                    cell.reset_off_map();
                    off_map += 1;
                }
            }
        }
        debug!(center = ?viewport.center, off_map, "minimap calibrated");
        shown
    }

    /// Parent coordinate shown at local (x, y), if calibrated and in range.
    pub fn get_main_grid_coordinates(&self, mini_x: i32, mini_y: i32) -> Option<Coord> {
        if !self.grid.bounds().contains(mini_x, mini_y) {
            return None;
        }
        self.viewport()
            .map(|viewport| viewport.to_parent(mini_x, mini_y))
    }

    /// Local coordinate showing parent (x, y), if it is inside the viewport.
    pub fn get_mini_grid_coordinates(&self, main_x: i32, main_y: i32) -> Option<Coord> {
        self.viewport()
            .and_then(|viewport| viewport.to_local(main_x, main_y))
    }

    pub fn is_on_mini_grid(&self, main_x: i32, main_y: i32) -> bool {
        self.get_mini_grid_coordinates(main_x, main_y).is_some()
    }

    /// The minimap cell mirroring parent (x, y).
    pub fn mirrored_cell(&self, main_x: i32, main_y: i32) -> Option<&Cell> {
        self.get_mini_grid_coordinates(main_x, main_y)
            .and_then(|local| self.grid.cell_at(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{Building, BuildingKind};
    use crate::terrain::{ResourceKind, TerrainKind};

    fn parent(width: u32, height: u32) -> Grid {
        let mut grid = Grid::new(
            GridId(0),
            GridKind::Strategic,
            width,
            height,
            PixelFrame::new(0, 0, 320, 300),
        );
        grid.create_cells().unwrap();
        let terrains = TerrainKind::LAND;
        for cell in grid.cells_mut() {
            let terrain = terrains[((cell.x() + cell.y()) as usize) % terrains.len()];
            cell.set_terrain(terrain, Some(1));
            cell.set_visibility((cell.x() + cell.y()) % 2 == 0);
        }
        grid
    }

    fn minimap(parent: &Grid, extent: u32) -> MiniGrid {
        MiniGrid::new(GridId(1), parent, extent, extent, PixelFrame::new(0, 0, 50, 50)).unwrap()
    }

    #[test]
    fn test_uncalibrated_minimap_is_off_map() {
        let parent = parent(16, 15);
        let mini = minimap(&parent, 5);
        assert_eq!(mini.center(), None);
        assert_eq!(mini.get_main_grid_coordinates(2, 2), None);
        assert!(!mini.is_on_mini_grid(0, 0));
        assert!(mini
            .grid()
            .cells()
            .iter()
            .all(|cell| cell.terrain() == TerrainKind::None && cell.visible()));
    }

    #[test]
    fn test_center_cell_maps_to_center() {
        let parent = parent(20, 20);
        let mut mini = minimap(&parent, 5);
        mini.calibrate(&parent, 10, 10);
        assert_eq!(mini.get_main_grid_coordinates(2, 2), Some(Coord::new(10, 10)));
        assert_eq!(mini.get_mini_grid_coordinates(10, 10), Some(Coord::new(2, 2)));
        for px in 8..=12 {
            for py in 8..=12 {
                let local = mini.get_mini_grid_coordinates(px, py).unwrap();
                assert_eq!(
                    mini.get_main_grid_coordinates(local.x, local.y),
                    Some(Coord::new(px, py))
                );
            }
        }
        assert!(mini.is_on_mini_grid(12, 8));
        assert!(!mini.is_on_mini_grid(13, 10));
        assert!(!mini.is_on_mini_grid(10, 7));
    }

    #[test]
    fn test_calibrate_mirrors_parent_cells() {
        let mut parent = parent(16, 15);
        parent
            .find_cell_mut(7, 6)
            .unwrap()
            .set_resource(ResourceKind::Gold);
        parent
            .find_cell_mut(7, 6)
            .unwrap()
            .add_building(Building::new(BuildingKind::Resource))
            .unwrap();
        parent
            .find_cell_mut(8, 7)
            .unwrap()
            .add_occupant(OccupantId(3));

        let mut mini = minimap(&parent, 5);
        let shown = mini.calibrate(&parent, 8, 7);
        assert_eq!(shown, vec![OccupantId(3)]);

        for local in mini.grid().cells() {
            let source = mini.get_main_grid_coordinates(local.x(), local.y()).unwrap();
            let original = parent.cell_at(source).unwrap();
            assert_eq!(local.terrain(), original.terrain());
            assert_eq!(local.resource(), original.resource());
            assert_eq!(local.visible(), original.visible());
            assert_eq!(local.occupants(), original.occupants());
        }
        assert!(mini
            .mirrored_cell(7, 6)
            .unwrap()
            .has_building(BuildingKind::Resource));
    }

    #[test]
    fn test_partially_off_map_calibration() {
        let parent = parent(16, 15);
        let mut mini = minimap(&parent, 5);
        mini.calibrate(&parent, 0, 14);

        for local in mini.grid().cells() {
            let source = mini.get_main_grid_coordinates(local.x(), local.y()).unwrap();
            match parent.cell_at(source) {
                Some(original) => {
                    assert_eq!(local.terrain(), original.terrain());
                    assert_eq!(local.resource(), original.resource());
                    assert_eq!(local.visible(), original.visible());
                }
                None => {
                    assert_eq!(local.terrain(), TerrainKind::None);
                    assert_eq!(local.resource(), ResourceKind::None);
                    assert!(local.visible());
                    assert!(!local.has_any_building());
                }
            }
        }
        // Two columns on the left and two rows on the top fall off the map.
        let off_map = mini
            .grid()
            .cells()
            .iter()
            .filter(|cell| cell.terrain() == TerrainKind::None)
            .count();
        assert_eq!(off_map, 25 - 9);
    }

    #[test]
    fn test_recalibration_clears_stale_state() {
        let mut parent = parent(16, 15);
        parent
            .find_cell_mut(15, 14)
            .unwrap()
            .add_occupant(OccupantId(9));
        let mut mini = minimap(&parent, 5);
        mini.calibrate(&parent, 15, 14);
        assert!(mini.mirrored_cell(15, 14).unwrap().occupants().contains(&OccupantId(9)));

        mini.calibrate(&parent, 2, 2);
        assert!(mini
            .grid()
            .cells()
            .iter()
            .all(|cell| cell.terrain() != TerrainKind::None && cell.occupants().is_empty()));
    }

    #[test]
    fn test_even_extent_uses_rounded_half() {
        let parent = parent(16, 15);
        let mut mini = minimap(&parent, 4);
        mini.calibrate(&parent, 8, 8);
        assert_eq!(mini.get_main_grid_coordinates(2, 2), Some(Coord::new(8, 8)));
        assert_eq!(mini.get_main_grid_coordinates(0, 0), Some(Coord::new(6, 6)));
        assert_eq!(mini.get_main_grid_coordinates(3, 3), Some(Coord::new(9, 9)));
    }

    #[test]
    #[should_panic(expected = "not attached")]
    fn test_foreign_parent_panics() {
        let parent_a = parent(8, 8);
        let mut parent_b = Grid::new(GridId(7), GridKind::Strategic, 8, 8, PixelFrame::new(0, 0, 8, 8));
        parent_b.create_cells().unwrap();
        let mut mini = minimap(&parent_a, 3);
        mini.calibrate(&parent_b, 4, 4);
    }
}
