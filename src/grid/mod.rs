//! Grid - dense (x, y) table of cells.
//!
//! Construction happens in two explicit phases: `allocate` creates every cell,
//! then `link_adjacency` fills each cell's neighbour table. Neighbours are
//! stored as coordinates and resolved through the grid.

pub mod abstract_grid;
pub mod generation;
pub mod mini;

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::coords::{Coord, GridBounds, PixelFrame};
use crate::error::GridError;
use crate::snapshot::{CellRecord, GridRecord};
use crate::terrain::{ResourceKind, TerrainKind};

pub use abstract_grid::AbstractGrid;
pub use generation::{GenerationReport, GenerationStage};
pub use mini::MiniGrid;

/// Handle a cell or minimap uses to name a grid it does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    Strategic,
    Minimap,
    Abstract,
}

impl GridKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GridKind::Strategic => "strategic",
            GridKind::Minimap => "minimap",
            GridKind::Abstract => "abstract",
        }
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for `Grid::choose_cell`.
#[derive(Debug, Clone)]
pub struct CellFilter {
    pub allowed_terrains: Vec<TerrainKind>,
    /// Allow cells in the coastal row y = 0.
    pub ocean_allowed: bool,
    /// Allow cells that have, or border, a building.
    pub nearby_buildings_allowed: bool,
}

impl CellFilter {
    pub fn land() -> Self {
        Self {
            allowed_terrains: TerrainKind::LAND.to_vec(),
            ocean_allowed: false,
            nearby_buildings_allowed: false,
        }
    }

    pub fn terrains(allowed_terrains: impl Into<Vec<TerrainKind>>) -> Self {
        Self {
            allowed_terrains: allowed_terrains.into(),
            ..Self::land()
        }
    }

    pub fn with_ocean(mut self, allowed: bool) -> Self {
        self.ocean_allowed = allowed;
        self
    }

    pub fn with_nearby_buildings(mut self, allowed: bool) -> Self {
        self.nearby_buildings_allowed = allowed;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    id: GridId,
    kind: GridKind,
    bounds: GridBounds,
    frame: PixelFrame,
    cells: Vec<Cell>,
    linked: bool,
    stage: GenerationStage,
}

impl Grid {
    /// An empty grid; call `create_cells` (or `allocate` and `link_adjacency`)
    /// before use.
    pub fn new(id: GridId, kind: GridKind, width: u32, height: u32, frame: PixelFrame) -> Self {
        Self {
            id,
            kind,
            bounds: GridBounds::new(width, height),
            frame,
            cells: Vec::new(),
            linked: false,
            stage: GenerationStage::Empty,
        }
    }

    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.bounds.width
    }

    pub fn height(&self) -> u32 {
        self.bounds.height
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn frame(&self) -> PixelFrame {
        self.frame
    }

    pub fn stage(&self) -> GenerationStage {
        self.stage
    }

    pub fn is_allocated(&self) -> bool {
        self.bounds.cell_count() > 0 && self.cells.len() == self.bounds.cell_count()
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Phase one: creates width x height cells of clear terrain with no resource.
    pub fn allocate(&mut self) -> Result<(), GridError> {
        if !self.cells.is_empty() {
            return Err(GridError::AlreadyAllocated);
        }
        let bounds = self.bounds;
        if bounds.cell_count() == 0 {
            return Err(GridError::EmptyGrid {
                width: bounds.width,
                height: bounds.height,
            });
        }
        let id = self.id;
        self.cells = (0..bounds.cell_count())
            .filter_map(|index| bounds.coord_of(index))
            .map(|coord| Cell::new(id, coord))
            .collect();
        Ok(())
    }

    /// Phase two: links every cell to its orthogonal neighbours.
    pub fn link_adjacency(&mut self) -> Result<(), GridError> {
        debug_assert!(
            self.is_allocated(),
            "link_adjacency called before every cell of the grid exists"
        );
        if !self.is_allocated() {
            return Err(GridError::NotAllocated);
        }
        let bounds = self.bounds;
        for cell in &mut self.cells {
            cell.find_adjacent_cells(bounds);
        }
        self.linked = true;
        Ok(())
    }

    pub fn create_cells(&mut self) -> Result<(), GridError> {
        self.allocate()?;
        self.link_adjacency()
    }

    /// Bounds-checked lookup; out-of-range coordinates are simply `None`.
    pub fn find_cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.bounds
            .index_of(x, y)
            .and_then(|index| self.cells.get(index))
    }

    pub fn find_cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.bounds
            .index_of(x, y)
            .and_then(|index| self.cells.get_mut(index))
    }

    pub fn cell_at(&self, coord: Coord) -> Option<&Cell> {
        self.find_cell(coord.x, coord.y)
    }

    pub fn cell_at_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        self.find_cell_mut(coord.x, coord.y)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Every coordinate in row-major order, row 0 first.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(Cell::coord)
    }

    pub fn row(&self, y: i32) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |cell| cell.y() == y)
    }

    /// Orthogonal neighbour cells of `coord`.
    pub fn neighbours(&self, coord: Coord) -> impl Iterator<Item = &Cell> {
        self.cell_at(coord)
            .into_iter()
            .flat_map(|cell| cell.adjacent_cells())
            .filter_map(move |neighbour| self.cell_at(neighbour))
    }

    pub fn count_terrain(&self, terrain: TerrainKind) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.terrain() == terrain)
            .count()
    }

    /// Top-left pixel of a cell inside this grid's frame.
    pub fn convert_to_pixel(&self, x: i32, y: i32) -> (i32, i32) {
        self.frame.grid_to_pixel(self.bounds, x, y)
    }

    /// Cell under a pixel, if any.
    pub fn cell_under_pixel(&self, px: i32, py: i32) -> Option<&Cell> {
        self.frame
            .pixel_to_grid(self.bounds, px, py)
            .and_then(|coord| self.cell_at(coord))
    }

    fn touches_building(&self, cell: &Cell) -> bool {
        cell.has_any_building()
            || self
                .neighbours(cell.coord())
                .any(|neighbour| neighbour.has_any_building())
    }

    fn matches(&self, cell: &Cell, filter: &CellFilter) -> bool {
        filter.allowed_terrains.contains(&cell.terrain())
            && (filter.ocean_allowed || cell.y() != 0)
            && (filter.nearby_buildings_allowed || !self.touches_building(cell))
    }

    /// Uniformly random cell passing every filter, or `None` if none qualifies.
    pub fn choose_cell<R: Rng + ?Sized>(&self, filter: &CellFilter, rng: &mut R) -> Option<Coord> {
        let candidates: Vec<Coord> = self
            .cells
            .iter()
            .filter(|cell| self.matches(cell, filter))
            .map(Cell::coord)
            .collect();
        candidates.choose(rng).copied()
    }

    pub fn to_record(&self) -> GridRecord {
        GridRecord {
            grid_type: self.kind,
            coordinate_width: self.bounds.width,
            coordinate_height: self.bounds.height,
            name: None,
            image_id: None,
            cell_list: self.cells.iter().map(CellRecord::from).collect(),
        }
    }

    /// Restores per-cell state from persisted records instead of generating it.
    /// Allocates and links the grid first when needed. Every record is checked
    /// before any cell changes: each cell must appear exactly once, and natives
    /// records must carry their village.
    pub fn load_cells(&mut self, records: &[CellRecord]) -> Result<(), GridError> {
        if records.len() != self.bounds.cell_count() {
            return Err(GridError::RecordCount {
                expected: self.bounds.cell_count(),
                actual: records.len(),
            });
        }
        let bounds = self.bounds;
        let mut seen = vec![false; bounds.cell_count()];
        let mut targets = Vec::with_capacity(records.len());
        for record in records {
            let (x, y) = record.coordinates;
            let index = bounds
                .index_of(x, y)
                .ok_or(GridError::RecordOutOfBounds {
                    x,
                    y,
                    width: bounds.width,
                    height: bounds.height,
                })?;
            if std::mem::replace(&mut seen[index], true) {
                return Err(GridError::DuplicateRecord { x, y });
            }
            if record.resource == ResourceKind::Natives && record.village().is_none() {
                return Err(GridError::MissingVillage { x, y });
            }
            targets.push(index);
        }

        if !self.is_allocated() {
            self.allocate()?;
        }
        for (record, index) in records.iter().zip(targets) {
            record.apply_to(&mut self.cells[index]);
        }
        if !self.linked {
            self.link_adjacency()?;
        }
        self.stage = GenerationStage::Restored;
        Ok(())
    }
}
