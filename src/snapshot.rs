//! Persisted map state: per-cell and per-grid records and JSON snapshot files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::coords::Coord;
use crate::grid::GridKind;
use crate::terrain::{ResourceKind, TerrainKind};
use crate::village::Village;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub coordinates: (i32, i32),
    pub visible: bool,
    pub terrain: TerrainKind,
    pub terrain_variant: u8,
    #[serde(default)]
    pub terrain_features: BTreeMap<String, bool>,
    pub resource: ResourceKind,
    #[serde(default)]
    pub inventory: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village_population: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village_aggressiveness: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village_available_workers: Option<u32>,
}

impl From<&Cell> for CellRecord {
    fn from(cell: &Cell) -> Self {
        let village = cell.village();
        Self {
            coordinates: (cell.x(), cell.y()),
            visible: cell.visible(),
            terrain: cell.terrain(),
            terrain_variant: cell.terrain_variant(),
            terrain_features: cell.terrain_features().clone(),
            resource: cell.resource(),
            inventory: cell.inventory().clone(),
            village_name: village.map(|v| v.name.clone()),
            village_population: village.map(|v| v.population),
            village_aggressiveness: village.map(|v| v.aggressiveness),
            village_available_workers: village.map(|v| v.available_workers),
        }
    }
}

impl CellRecord {
    pub fn coord(&self) -> Coord {
        Coord::from(self.coordinates)
    }

    /// The village described by the `village_*` fields, when the cell holds natives.
    pub fn village(&self) -> Option<Village> {
        if self.resource != ResourceKind::Natives {
            return None;
        }
        let name = self.village_name.clone()?;
        Some(Village {
            name,
            population: self.village_population.unwrap_or(0),
            aggressiveness: self.village_aggressiveness.unwrap_or(0),
            available_workers: self.village_available_workers.unwrap_or(0),
        })
    }

    pub(crate) fn apply_to(&self, cell: &mut Cell) {
        cell.set_terrain(self.terrain, Some(self.terrain_variant));
        cell.terrain_features.clone_from(&self.terrain_features);
        cell.inventory.clone_from(&self.inventory);
        cell.set_visibility(self.visible);
        match self.village() {
            Some(village) => cell.attach_village(village),
            None => cell.set_resource(self.resource),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRecord {
    pub grid_type: GridKind,
    pub coordinate_width: u32,
    pub coordinate_height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    pub cell_list: Vec<CellRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub map_name: String,
    pub seed: u64,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub minimap_center: Option<Coord>,
    pub grids: Vec<GridRecord>,
}

impl MapSnapshot {
    pub fn grid(&self, kind: GridKind) -> Option<&GridRecord> {
        self.grids.iter().find(|grid| grid.grid_type == kind)
    }

    pub fn grids_of(&self, kind: GridKind) -> impl Iterator<Item = &GridRecord> {
        self.grids.iter().filter(move |grid| grid.grid_type == kind)
    }
}

pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, map_name: &str) -> PathBuf {
        self.output_dir.join(format!("{map_name}.json"))
    }

    pub fn write(&self, snapshot: &MapSnapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create snapshot directory {}",
                self.output_dir.display()
            )
        })?;
        let path = self.path_for(&snapshot.map_name);
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<MapSnapshot> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        Ok(snapshot)
    }
}
