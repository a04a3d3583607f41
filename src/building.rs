//! The slice of building state the map needs: kind, damage, and the cells a
//! bridge joins. Construction and upkeep rules live with the building systems.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Resource,
    Port,
    Infrastructure,
    Fort,
    Slums,
    TradingPost,
}

impl BuildingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildingKind::Resource => "resource",
            BuildingKind::Port => "port",
            BuildingKind::Infrastructure => "infrastructure",
            BuildingKind::Fort => "fort",
            BuildingKind::Slums => "slums",
            BuildingKind::TradingPost => "trading_post",
        }
    }

    /// Whether this kind may stand on a water cell.
    pub fn allowed_on_water(self) -> bool {
        matches!(self, BuildingKind::Port | BuildingKind::Infrastructure)
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureKind {
    Road,
    Railroad,
    RoadBridge,
    RailroadBridge,
    Ferry,
}

impl InfrastructureKind {
    pub fn is_bridge(self) -> bool {
        matches!(
            self,
            InfrastructureKind::RoadBridge | InfrastructureKind::RailroadBridge
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub damaged: bool,
    pub infrastructure: Option<InfrastructureKind>,
    /// Land cells a bridge or ferry joins across its water cell.
    pub connected_cells: Vec<Coord>,
}

impl Building {
    pub fn new(kind: BuildingKind) -> Self {
        Self {
            kind,
            damaged: false,
            infrastructure: None,
            connected_cells: Vec::new(),
        }
    }

    pub fn infrastructure(infrastructure: InfrastructureKind) -> Self {
        Self {
            infrastructure: Some(infrastructure),
            ..Self::new(BuildingKind::Infrastructure)
        }
    }

    pub fn bridge(infrastructure: InfrastructureKind, connected_cells: Vec<Coord>) -> Self {
        Self {
            connected_cells,
            ..Self::infrastructure(infrastructure)
        }
    }

    pub fn is_bridge(&self) -> bool {
        self.infrastructure.is_some_and(InfrastructureKind::is_bridge)
    }

    pub fn connects(&self, coord: Coord) -> bool {
        self.connected_cells.contains(&coord)
    }
}
