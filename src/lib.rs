pub mod building;
pub mod cell;
pub mod config;
pub mod coords;
pub mod error;
pub mod grid;
pub mod rng;
pub mod snapshot;
pub mod terrain;
pub mod village;
pub mod world;

pub use cell::{Cell, Direction, OccupantId};
pub use config::{MapConfig, MapLoader};
pub use error::{ConfigError, GridError};
pub use grid::{AbstractGrid, CellFilter, Grid, GridId, GridKind, MiniGrid};
pub use rng::RngManager;
pub use snapshot::{MapSnapshot, SnapshotWriter};
pub use terrain::{ResourceKind, TerrainKind};
pub use world::World;
