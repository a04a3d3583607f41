//! Cell - one addressable map location and its links to neighbours.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::building::{Building, BuildingKind};
use crate::coords::{Coord, GridBounds};
use crate::error::GridError;
use crate::grid::GridId;
use crate::terrain::{ResourceKind, TerrainKind};
use crate::village::Village;

/// Mobile unit standing on a cell. Units themselves are owned elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OccupantId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn slot(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(-1, 1), (1, 1), (-1, -1), (1, -1)];

#[derive(Debug, Clone)]
pub struct Cell {
    grid: GridId,
    coord: Coord,
    pub(crate) terrain: TerrainKind,
    pub(crate) terrain_variant: u8,
    pub(crate) terrain_features: BTreeMap<String, bool>,
    pub(crate) resource: ResourceKind,
    pub(crate) village: Option<Village>,
    pub(crate) visible: bool,
    pub(crate) buildings: BTreeMap<BuildingKind, Building>,
    pub(crate) occupants: Vec<OccupantId>,
    pub(crate) inventory: BTreeMap<String, i64>,
    adjacent: [Option<Coord>; 4],
    diagonal: Vec<Coord>,
}

impl Cell {
    pub fn new(grid: GridId, coord: Coord) -> Self {
        Self {
            grid,
            coord,
            terrain: TerrainKind::Clear,
            terrain_variant: 0,
            terrain_features: BTreeMap::new(),
            resource: ResourceKind::None,
            village: None,
            visible: false,
            buildings: BTreeMap::new(),
            occupants: Vec::new(),
            inventory: BTreeMap::new(),
            adjacent: [None; 4],
            diagonal: Vec::new(),
        }
    }

    pub fn grid(&self) -> GridId {
        self.grid
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn x(&self) -> i32 {
        self.coord.x
    }

    pub fn y(&self) -> i32 {
        self.coord.y
    }

    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    pub fn terrain_variant(&self) -> u8 {
        self.terrain_variant
    }

    pub fn terrain_features(&self) -> &BTreeMap<String, bool> {
        &self.terrain_features
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn village(&self) -> Option<&Village> {
        self.village.as_ref()
    }

    pub fn has_village(&self) -> bool {
        self.village.is_some()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn occupants(&self) -> &[OccupantId] {
        &self.occupants
    }

    pub fn inventory(&self) -> &BTreeMap<String, i64> {
        &self.inventory
    }

    pub fn is_water(&self) -> bool {
        self.terrain.is_water()
    }

    /// Ocean cell on the southern edge of the map.
    pub fn is_coastal(&self) -> bool {
        self.is_water() && self.coord.y == 0
    }

    pub fn set_terrain(&mut self, terrain: TerrainKind, variant: Option<u8>) {
        self.terrain = terrain;
        if let Some(variant) = variant {
            self.terrain_variant = variant;
        }
    }

    pub fn set_terrain_feature(&mut self, feature: impl Into<String>, present: bool) {
        self.terrain_features.insert(feature.into(), present);
    }

    pub fn has_terrain_feature(&self, feature: &str) -> bool {
        self.terrain_features.get(feature).copied().unwrap_or(false)
    }

    /// Sets the resource. Any village is dropped unless the resource stays `natives`.
    pub fn set_resource(&mut self, resource: ResourceKind) {
        self.resource = resource;
        if resource != ResourceKind::Natives {
            self.village = None;
        }
    }

    /// Attaches a village and marks the cell as `natives`.
    pub fn attach_village(&mut self, village: Village) {
        self.resource = ResourceKind::Natives;
        self.village = Some(village);
    }

    pub fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_inventory(&mut self, commodity: impl Into<String>, amount: i64) {
        self.inventory.insert(commodity.into(), amount);
    }

    pub fn add_occupant(&mut self, occupant: OccupantId) {
        if !self.occupants.contains(&occupant) {
            self.occupants.push(occupant);
        }
    }

    pub fn remove_occupant(&mut self, occupant: OccupantId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|id| *id != occupant);
        self.occupants.len() != before
    }

    pub fn has_building(&self, kind: BuildingKind) -> bool {
        self.buildings.contains_key(&kind)
    }

    pub fn has_any_building(&self) -> bool {
        !self.buildings.is_empty()
    }

    pub fn get_building(&self, kind: BuildingKind) -> Option<&Building> {
        self.buildings.get(&kind)
    }

    pub fn get_building_mut(&mut self, kind: BuildingKind) -> Option<&mut Building> {
        self.buildings.get_mut(&kind)
    }

    /// The building of `kind`, unless it is damaged.
    pub fn get_intact_building(&self, kind: BuildingKind) -> Option<&Building> {
        self.get_building(kind).filter(|building| !building.damaged)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn add_building(&mut self, building: Building) -> Result<(), GridError> {
        let kind = building.kind;
        if self.has_building(kind) {
            return Err(GridError::DuplicateBuilding {
                x: self.coord.x,
                y: self.coord.y,
                kind,
            });
        }
        if self.is_water() && !kind.allowed_on_water() {
            return Err(GridError::BuildingOnWater {
                x: self.coord.x,
                y: self.coord.y,
                kind,
            });
        }
        self.buildings.insert(kind, building);
        Ok(())
    }

    pub fn remove_building(&mut self, kind: BuildingKind) -> Option<Building> {
        self.buildings.remove(&kind)
    }

    /// Fills the neighbour table from the grid's bounds. Every cell of the grid
    /// must already exist.
    pub fn find_adjacent_cells(&mut self, bounds: GridBounds) {
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            let target = self.coord.offset(dx, dy);
            self.adjacent[direction.slot()] = bounds.contains(target.x, target.y).then_some(target);
        }
        self.diagonal = DIAGONAL_OFFSETS
            .iter()
            .map(|(dx, dy)| self.coord.offset(*dx, *dy))
            .filter(|target| bounds.contains(target.x, target.y))
            .collect();
    }

    pub fn adjacent(&self, direction: Direction) -> Option<Coord> {
        self.adjacent[direction.slot()]
    }

    /// Orthogonal neighbours in up, down, left, right order.
    pub fn adjacent_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.adjacent.iter().flatten().copied()
    }

    pub fn diagonal_cells(&self) -> &[Coord] {
        &self.diagonal
    }

    pub fn is_adjacent_to(&self, coord: Coord) -> bool {
        self.adjacent.contains(&Some(coord))
    }

    /// Whether a land unit can step between this cell and an adjacent one.
    pub fn has_walking_connection(&self, other: &Cell) -> bool {
        match (self.is_water(), other.is_water()) {
            (false, false) => true,
            (true, true) => false,
            (true, false) => self.bridge_reaches(other.coord),
            (false, true) => other.bridge_reaches(self.coord),
        }
    }

    fn bridge_reaches(&self, land: Coord) -> bool {
        self.get_intact_building(BuildingKind::Infrastructure)
            .is_some_and(|building| building.is_bridge() && building.connects(land))
    }

    /// Overwrites this cell's state with `other`'s, keeping identity and links.
    pub fn copy_state_from(&mut self, other: &Cell) {
        self.terrain = other.terrain;
        self.terrain_variant = other.terrain_variant;
        self.terrain_features.clone_from(&other.terrain_features);
        self.resource = other.resource;
        self.village.clone_from(&other.village);
        self.visible = other.visible;
        self.buildings.clone_from(&other.buildings);
        self.occupants.clone_from(&other.occupants);
        self.inventory.clone_from(&other.inventory);
    }

    /// Blank state for a minimap cell that maps past the edge of the world.
    pub fn reset_off_map(&mut self) {
        self.terrain = TerrainKind::None;
        self.terrain_variant = 0;
        self.terrain_features.clear();
        self.resource = ResourceKind::None;
        self.village = None;
        self.visible = true;
        self.buildings.clear();
        self.occupants.clear();
        self.inventory.clear();
    }
}
