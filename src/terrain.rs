//! Terrain and resource vocabulary shared by every grid.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Clear,
    Savannah,
    Mountain,
    Hills,
    Jungle,
    Swamp,
    Desert,
    Water,
    /// Placeholder terrain of off-map and abstract cells.
    None,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 9] = [
        TerrainKind::Clear,
        TerrainKind::Savannah,
        TerrainKind::Mountain,
        TerrainKind::Hills,
        TerrainKind::Jungle,
        TerrainKind::Swamp,
        TerrainKind::Desert,
        TerrainKind::Water,
        TerrainKind::None,
    ];

    pub const LAND: [TerrainKind; 7] = [
        TerrainKind::Clear,
        TerrainKind::Savannah,
        TerrainKind::Mountain,
        TerrainKind::Hills,
        TerrainKind::Jungle,
        TerrainKind::Swamp,
        TerrainKind::Desert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TerrainKind::Clear => "clear",
            TerrainKind::Savannah => "savannah",
            TerrainKind::Mountain => "mountain",
            TerrainKind::Hills => "hills",
            TerrainKind::Jungle => "jungle",
            TerrainKind::Swamp => "swamp",
            TerrainKind::Desert => "desert",
            TerrainKind::Water => "water",
            TerrainKind::None => "none",
        }
    }

    pub fn is_water(self) -> bool {
        self == TerrainKind::Water
    }

    pub fn is_land(self) -> bool {
        !matches!(self, TerrainKind::Water | TerrainKind::None)
    }

    /// Number of visual variants available for this terrain.
    ///
    /// Water reserves variant 0 for the coastal ocean tile; the remaining
    /// variants are inland river tiles.
    pub fn variant_count(self) -> u8 {
        match self {
            TerrainKind::Clear | TerrainKind::Savannah | TerrainKind::Mountain => 2,
            TerrainKind::Hills | TerrainKind::Jungle | TerrainKind::Swamp | TerrainKind::Desert => 3,
            TerrainKind::Water => 3,
            TerrainKind::None => 1,
        }
    }

    /// Picks a variant suited to a cell of this terrain in row `y`.
    pub fn random_variant<R: Rng + ?Sized>(self, y: i32, rng: &mut R) -> u8 {
        match self {
            TerrainKind::Water if y == 0 => COASTAL_WATER_VARIANT,
            TerrainKind::Water => rng.gen_range(1..self.variant_count()),
            _ => rng.gen_range(0..self.variant_count()),
        }
    }
}

pub const COASTAL_WATER_VARIANT: u8 = 0;

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    None,
    Natives,
    Ivory,
    Coffee,
    Copper,
    Diamond,
    ExoticWood,
    Fruit,
    Gold,
    Iron,
    Rubber,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::None => "none",
            ResourceKind::Natives => "natives",
            ResourceKind::Ivory => "ivory",
            ResourceKind::Coffee => "coffee",
            ResourceKind::Copper => "copper",
            ResourceKind::Diamond => "diamond",
            ResourceKind::ExoticWood => "exotic_wood",
            ResourceKind::Fruit => "fruit",
            ResourceKind::Gold => "gold",
            ResourceKind::Iron => "iron",
            ResourceKind::Rubber => "rubber",
        }
    }

    pub fn is_none(self) -> bool {
        self == ResourceKind::None
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
