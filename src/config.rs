//! Map configuration: dimensions, generation knobs and resource frequencies.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::coords::PixelFrame;
use crate::error::{ConfigError, GridError};
use crate::terrain::{ResourceKind, TerrainKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    /// Leave the southern row as generated instead of flooding it with ocean.
    #[serde(default)]
    pub open_ocean: bool,
    #[serde(default = "default_worm_length")]
    pub worm_length: LengthRange,
    #[serde(default = "default_worm_terrains")]
    pub worm_terrains: Vec<TerrainKind>,
    #[serde(default)]
    pub rivers: RiverConfig,
    #[serde(default)]
    pub minimap: MinimapConfig,
    #[serde(default = "default_pixel_frame")]
    pub pixel_frame: PixelFrame,
    #[serde(default)]
    pub abstract_grids: Vec<AbstractGridConfig>,
    pub resource_frequencies: ResourceFrequencies,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverConfig {
    #[serde(default = "default_min_rivers")]
    pub min: u32,
    #[serde(default = "default_max_rivers")]
    pub max: u32,
    #[serde(default = "default_river_separation")]
    pub min_separation: u32,
    #[serde(default = "default_river_attempts")]
    pub max_placement_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimapConfig {
    #[serde(default = "default_minimap_extent")]
    pub width: u32,
    #[serde(default = "default_minimap_extent")]
    pub height: u32,
    #[serde(default = "default_minimap_frame")]
    pub pixel_frame: PixelFrame,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractGridConfig {
    pub name: String,
    pub image_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_worm_length() -> LengthRange {
    LengthRange { min: 5, max: 10 }
}

fn default_worm_terrains() -> Vec<TerrainKind> {
    TerrainKind::LAND.to_vec()
}

fn default_min_rivers() -> u32 {
    2
}

fn default_max_rivers() -> u32 {
    3
}

fn default_river_separation() -> u32 {
    3
}

fn default_river_attempts() -> u32 {
    1_000
}

fn default_minimap_extent() -> u32 {
    5
}

fn default_pixel_frame() -> PixelFrame {
    PixelFrame::new(0, 0, 640, 600)
}

fn default_minimap_frame() -> PixelFrame {
    PixelFrame::new(660, 420, 180, 180)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            min: default_min_rivers(),
            max: default_max_rivers(),
            min_separation: default_river_separation(),
            max_placement_attempts: default_river_attempts(),
        }
    }
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            width: default_minimap_extent(),
            height: default_minimap_extent(),
            pixel_frame: default_minimap_frame(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl MapConfig {
    /// The built-in 16x15 colonial map.
    pub fn colony() -> Self {
        Self {
            name: "colony".to_string(),
            seed: 1885,
            width: 16,
            height: 15,
            open_ocean: false,
            worm_length: default_worm_length(),
            worm_terrains: default_worm_terrains(),
            rivers: RiverConfig::default(),
            minimap: MinimapConfig::default(),
            pixel_frame: default_pixel_frame(),
            abstract_grids: vec![
                AbstractGridConfig {
                    name: "Europe".to_string(),
                    image_id: "locations/europe".to_string(),
                },
                AbstractGridConfig {
                    name: "Slave traders".to_string(),
                    image_id: "locations/slave_traders".to_string(),
                },
            ],
            resource_frequencies: ResourceFrequencies::colony(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: MapConfig =
            serde_yaml::from_str(text).context("Failed to parse map configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write map configuration {}", path.display()))?;
        Ok(())
    }

    /// Terrains a freshly generated strategic grid can contain.
    pub fn generated_terrains(&self) -> Vec<TerrainKind> {
        let mut terrains = vec![TerrainKind::Clear, TerrainKind::Water];
        for terrain in &self.worm_terrains {
            if !terrains.contains(terrain) {
                terrains.push(*terrain);
            }
        }
        terrains
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyMap {
                width: self.width,
                height: self.height,
            });
        }
        if self.minimap.width == 0 || self.minimap.height == 0 {
            return Err(ConfigError::EmptyMinimap {
                width: self.minimap.width,
                height: self.minimap.height,
            });
        }
        if self.worm_length.min > self.worm_length.max {
            return Err(ConfigError::InvertedRange {
                what: "worm length",
                min: self.worm_length.min,
                max: self.worm_length.max,
            });
        }
        if self.rivers.min > self.rivers.max {
            return Err(ConfigError::InvertedRange {
                what: "river count",
                min: self.rivers.min,
                max: self.rivers.max,
            });
        }
        if self.rivers.max_placement_attempts == 0 {
            return Err(ConfigError::NoRiverAttempts);
        }
        if self.worm_terrains.is_empty() {
            return Err(ConfigError::NoWormTerrains);
        }
        if self.worm_terrains.contains(&TerrainKind::None) {
            return Err(ConfigError::UnpaintableTerrain(TerrainKind::None));
        }
        for terrain in self.generated_terrains() {
            let weights = self
                .resource_frequencies
                .weights(terrain)
                .ok_or(ConfigError::MissingDistribution(terrain))?;
            if weights.values().all(|weight| *weight == 0) {
                return Err(ConfigError::ZeroWeightDistribution(terrain));
            }
        }
        Ok(())
    }
}

/// Terrain -> resource -> integer weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceFrequencies(pub BTreeMap<TerrainKind, BTreeMap<ResourceKind, u32>>);

impl ResourceFrequencies {
    pub fn colony() -> Self {
        use ResourceKind::*;
        let table = [
            (TerrainKind::Clear, vec![(None, 135), (Ivory, 5), (Natives, 20)]),
            (
                TerrainKind::Savannah,
                vec![(None, 125), (Ivory, 15), (Fruit, 5), (Natives, 15)],
            ),
            (
                TerrainKind::Hills,
                vec![(None, 125), (Copper, 10), (Gold, 5), (Natives, 20)],
            ),
            (
                TerrainKind::Mountain,
                vec![(None, 135), (Iron, 10), (Diamond, 5), (Natives, 10)],
            ),
            (
                TerrainKind::Jungle,
                vec![(None, 120), (Rubber, 15), (ExoticWood, 10), (Coffee, 5), (Natives, 10)],
            ),
            (
                TerrainKind::Swamp,
                vec![(None, 140), (Rubber, 5), (Natives, 15)],
            ),
            (
                TerrainKind::Desert,
                vec![(None, 150), (Diamond, 5), (Natives, 5)],
            ),
            (TerrainKind::Water, vec![(None, 1)]),
        ];
        Self(
            table
                .into_iter()
                .map(|(terrain, weights)| (terrain, weights.into_iter().collect()))
                .collect(),
        )
    }

    pub fn weights(&self, terrain: TerrainKind) -> Option<&BTreeMap<ResourceKind, u32>> {
        self.0.get(&terrain)
    }

    pub fn set_weight(&mut self, terrain: TerrainKind, resource: ResourceKind, weight: u32) {
        self.0.entry(terrain).or_default().insert(resource, weight);
    }

    /// Ordered (resource, cumulative weight) pairs for one terrain.
    pub fn cumulative(&self, terrain: TerrainKind) -> Option<Vec<(ResourceKind, u32)>> {
        let weights = self.weights(terrain)?;
        let mut running = 0;
        Some(
            weights
                .iter()
                .map(|(resource, weight)| {
                    running += weight;
                    (*resource, running)
                })
                .collect(),
        )
    }

    pub fn distribution(&self, terrain: TerrainKind) -> Result<ResourceDistribution, GridError> {
        let weights = self
            .weights(terrain)
            .ok_or(GridError::MissingResourceDistribution(terrain))?;
        ResourceDistribution::new(terrain, weights)
    }
}

/// Sampler over one terrain's resource weights.
#[derive(Debug, Clone)]
pub struct ResourceDistribution {
    resources: Vec<ResourceKind>,
    index: WeightedIndex<u32>,
}

impl ResourceDistribution {
    pub fn new(
        terrain: TerrainKind,
        weights: &BTreeMap<ResourceKind, u32>,
    ) -> Result<Self, GridError> {
        let index = WeightedIndex::new(weights.values().copied()).map_err(|err| {
            GridError::InvalidResourceDistribution {
                terrain,
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            resources: weights.keys().copied().collect(),
            index,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ResourceKind {
        self.resources[self.index.sample(rng)]
    }
}

pub struct MapLoader {
    base_dir: PathBuf,
}

impl MapLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<MapConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read map file {}", path.display()))?;
        let config: MapConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid map configuration in {}", path.display()))?;
        Ok(config)
    }
}
