//! AbstractGrid - a single off-map location such as a European port.

use crate::cell::Cell;
use crate::coords::PixelFrame;
use crate::error::GridError;
use crate::snapshot::{CellRecord, GridRecord};
use crate::terrain::TerrainKind;

use super::{Grid, GridId, GridKind};

#[derive(Debug, Clone)]
pub struct AbstractGrid {
    grid: Grid,
    name: String,
    image_id: String,
}

impl AbstractGrid {
    pub fn new(
        id: GridId,
        name: impl Into<String>,
        image_id: impl Into<String>,
        frame: PixelFrame,
    ) -> Result<Self, GridError> {
        let mut grid = Grid::new(id, GridKind::Abstract, 1, 1, frame);
        grid.create_cells()?;
        let mut abstract_grid = Self {
            grid,
            name: name.into(),
            image_id: image_id.into(),
        };
        let cell = abstract_grid.cell_mut();
        cell.set_terrain(TerrainKind::None, Some(0));
        cell.set_visibility(true);
        Ok(abstract_grid)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self) -> &Cell {
        &self.grid.cells()[0]
    }

    pub fn cell_mut(&mut self) -> &mut Cell {
        &mut self.grid.cells_mut()[0]
    }

    pub fn to_record(&self) -> GridRecord {
        GridRecord {
            name: Some(self.name.clone()),
            image_id: Some(self.image_id.clone()),
            ..self.grid.to_record()
        }
    }

    /// Restores the single cell; it stays visible whatever the record says.
    pub fn load_cells(&mut self, records: &[CellRecord]) -> Result<(), GridError> {
        self.grid.load_cells(records)?;
        self.cell_mut().set_visibility(true);
        Ok(())
    }
}
