use thiserror::Error;

use crate::building::BuildingKind;
use crate::grid::{GenerationStage, GridKind};
use crate::terrain::TerrainKind;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid cells were already allocated")]
    AlreadyAllocated,
    #[error("a grid needs at least one cell, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
    #[error("grid cells must be allocated before adjacency can be linked")]
    NotAllocated,
    #[error("generation step '{step}' expected stage {expected:?} but grid is at {actual:?}")]
    StageOrder {
        step: &'static str,
        expected: GenerationStage,
        actual: GenerationStage,
    },
    #[error("no resource distribution configured for terrain '{0}'")]
    MissingResourceDistribution(TerrainKind),
    #[error("resource distribution for terrain '{terrain}' is unusable: {reason}")]
    InvalidResourceDistribution {
        terrain: TerrainKind,
        reason: String,
    },
    #[error(
        "could not place {rivers} river sources at least {separation} columns apart on a grid {width} wide after {attempts} attempts"
    )]
    RiverPlacement {
        rivers: usize,
        separation: u32,
        width: u32,
        attempts: u32,
    },
    #[error("cell record at ({x}, {y}) lies outside a {width}x{height} grid")]
    RecordOutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("grid record has {actual} cells, expected {expected}")]
    RecordCount { expected: usize, actual: usize },
    #[error("cell ({x}, {y}) appears more than once in the grid record")]
    DuplicateRecord { x: i32, y: i32 },
    #[error("cell record at ({x}, {y}) is natives but carries no village")]
    MissingVillage { x: i32, y: i32 },
    #[error("snapshot has no {0} grid record")]
    MissingGridRecord(GridKind),
    #[error("cell ({x}, {y}) already has a {kind} building")]
    DuplicateBuilding { x: i32, y: i32, kind: BuildingKind },
    #[error("a {kind} building cannot stand on water at ({x}, {y})")]
    BuildingOnWater { x: i32, y: i32, kind: BuildingKind },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("map dimensions must be positive, got {width}x{height}")]
    EmptyMap { width: u32, height: u32 },
    #[error("{what} range is empty: min {min} > max {max}")]
    InvertedRange { what: &'static str, min: u32, max: u32 },
    #[error("worm terrain list is empty")]
    NoWormTerrains,
    #[error("terrain '{0}' cannot be painted by terrain worms")]
    UnpaintableTerrain(TerrainKind),
    #[error("no resource distribution configured for terrain '{0}'")]
    MissingDistribution(TerrainKind),
    #[error("resource distribution for terrain '{0}' has no positive weight")]
    ZeroWeightDistribution(TerrainKind),
    #[error("minimap extent must be positive, got {width}x{height}")]
    EmptyMinimap { width: u32, height: u32 },
    #[error("river placement attempts must be at least 1")]
    NoRiverAttempts,
}
