//! Procedural generation of the strategic grid.
//!
//! Stages run strictly in order:
//! `Empty -> TerrainWormsApplied -> OceanRowSet -> RiversApplied -> ResourcesAssigned`.
//! A grid restored from a snapshot sits at `Restored` and is never generated.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::Direction;
use crate::config::{LengthRange, MapConfig, ResourceDistribution, ResourceFrequencies, RiverConfig};
use crate::coords::Coord;
use crate::error::{ConfigError, GridError};
use crate::rng::{RngManager, PLACEMENT_STREAM, RESOURCE_STREAM, RIVER_STREAM, TERRAIN_STREAM};
use crate::terrain::{ResourceKind, TerrainKind};
use crate::village::VillageFounder;

use super::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Empty,
    TerrainWormsApplied,
    OceanRowSet,
    RiversApplied,
    ResourcesAssigned,
    Restored,
}

/// Summary of one full generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub worms: usize,
    pub river_columns: Vec<i32>,
    pub villages: usize,
}

/// One terrain worm per this many cells.
pub const CELLS_PER_WORM: u32 = 5;

/// Row rivers spring from, just inland of the coast.
const RIVER_SOURCE_ROW: i32 = 1;

pub fn worm_count(width: u32, height: u32) -> usize {
    (width as usize * height as usize) / CELLS_PER_WORM as usize
}

/// Picks `count` distinct river source columns in `[0, width)` that are pairwise
/// at least `separation` apart, re-rolling the whole set on conflict.
pub fn choose_river_columns<R: Rng + ?Sized>(
    width: u32,
    count: usize,
    separation: u32,
    max_attempts: u32,
    rng: &mut R,
) -> Result<Vec<i32>, GridError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let failure = GridError::RiverPlacement {
        rivers: count,
        separation,
        width,
        attempts: max_attempts,
    };
    if width == 0 {
        return Err(failure);
    }
    for _ in 0..max_attempts {
        let columns: Vec<i32> = (0..count)
            .map(|_| rng.gen_range(0..width) as i32)
            .collect();
        let separated = columns.iter().enumerate().all(|(i, a)| {
            columns[i + 1..]
                .iter()
                .all(|b| a.abs_diff(*b) >= separation)
        });
        if separated {
            return Ok(columns);
        }
    }
    Err(failure)
}

/// North four times in six, east or west once each, never south.
fn river_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    match rng.gen_range(1..=6) {
        1..=4 => Direction::Up,
        5 => Direction::Right,
        _ => Direction::Left,
    }
}

fn check_range(what: &'static str, min: u32, max: u32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { what, min, max });
    }
    Ok(())
}

fn river_length_range(height: u32) -> (u32, u32) {
    let min = (height as f64 * 0.75).round() as u32;
    let max = (height as f64 * 1.25).round() as u32;
    (min, max.max(min))
}

impl Grid {
    fn expect_stage(&self, step: &'static str, expected: GenerationStage) -> Result<(), GridError> {
        if !self.is_linked() {
            return Err(GridError::NotAllocated);
        }
        if self.stage != expected {
            return Err(GridError::StageOrder {
                step,
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    /// Paints `terrain` along a random walk of `length` steps from a random cell.
    /// Steps that would leave the grid are spent in place. Returns the visited
    /// cells in order, start included.
    pub fn paint_terrain_worm<R: Rng + ?Sized>(
        &mut self,
        terrain: TerrainKind,
        length: u32,
        rng: &mut R,
    ) -> Vec<Coord> {
        let start = Coord::new(
            rng.gen_range(0..self.width()) as i32,
            rng.gen_range(0..self.height()) as i32,
        );
        self.walk(start, terrain, length, rng, |rng| {
            Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
        })
    }

    fn walk<R: Rng + ?Sized>(
        &mut self,
        start: Coord,
        terrain: TerrainKind,
        length: u32,
        rng: &mut R,
        mut choose: impl FnMut(&mut R) -> Direction,
    ) -> Vec<Coord> {
        let mut path = Vec::with_capacity(length as usize + 1);
        let mut current = start;
        self.paint(current, terrain, rng);
        path.push(current);
        for _ in 0..length {
            let (dx, dy) = choose(&mut *rng).offset();
            let next = current.offset(dx, dy);
            if self.bounds().contains(next.x, next.y) {
                current = next;
            }
            self.paint(current, terrain, rng);
            path.push(current);
        }
        path
    }

    fn paint<R: Rng + ?Sized>(&mut self, at: Coord, terrain: TerrainKind, rng: &mut R) {
        let variant = terrain.random_variant(at.y, rng);
        if let Some(cell) = self.cell_at_mut(at) {
            cell.set_terrain(terrain, Some(variant));
        }
    }

    /// Seeds biome patches: floor(width * height / 5) worms of random terrain.
    pub fn apply_terrain_worms<R: Rng + ?Sized>(
        &mut self,
        terrains: &[TerrainKind],
        length: LengthRange,
        rng: &mut R,
    ) -> Result<usize, GridError> {
        self.expect_stage("terrain worms", GenerationStage::Empty)?;
        check_range("worm length", length.min, length.max)?;
        let worms = if terrains.is_empty() {
            0
        } else {
            worm_count(self.width(), self.height())
        };
        for _ in 0..worms {
            let terrain = terrains[rng.gen_range(0..terrains.len())];
            let steps = rng.gen_range(length.min..=length.max);
            self.paint_terrain_worm(terrain, steps, rng);
        }
        self.stage = GenerationStage::TerrainWormsApplied;
        debug!(grid = self.id().0, worms, "terrain worms applied");
        Ok(worms)
    }

    /// Floods row 0 with ocean unless the map uses open ocean.
    pub fn set_ocean_row(&mut self, open_ocean: bool) -> Result<(), GridError> {
        self.expect_stage("ocean row", GenerationStage::TerrainWormsApplied)?;
        if !open_ocean {
            for cell in self.cells_mut().iter_mut().filter(|cell| cell.y() == 0) {
                cell.set_terrain(
                    TerrainKind::Water,
                    Some(crate::terrain::COASTAL_WATER_VARIANT),
                );
            }
        }
        self.stage = GenerationStage::OceanRowSet;
        debug!(grid = self.id().0, open_ocean, "ocean row set");
        Ok(())
    }

    /// Carves one river north from `(start_x, 1)`.
    pub fn paint_river<R: Rng + ?Sized>(&mut self, start_x: i32, length: u32, rng: &mut R) -> Vec<Coord> {
        let start_y = RIVER_SOURCE_ROW.min(self.height() as i32 - 1);
        self.walk(
            Coord::new(start_x, start_y),
            TerrainKind::Water,
            length,
            rng,
            |rng| river_direction(rng),
        )
    }

    /// Carves 2-3 (per config) well separated rivers. Returns their source columns.
    pub fn apply_rivers<R: Rng + ?Sized>(
        &mut self,
        rivers: &RiverConfig,
        rng: &mut R,
    ) -> Result<Vec<i32>, GridError> {
        self.expect_stage("rivers", GenerationStage::OceanRowSet)?;
        check_range("river count", rivers.min, rivers.max)?;
        let count = rng.gen_range(rivers.min..=rivers.max) as usize;
        let columns = choose_river_columns(
            self.width(),
            count,
            rivers.min_separation,
            rivers.max_placement_attempts,
            rng,
        )?;
        let (min_len, max_len) = river_length_range(self.height());
        for column in &columns {
            let length = rng.gen_range(min_len..=max_len);
            self.paint_river(*column, length, rng);
        }
        self.stage = GenerationStage::RiversApplied;
        debug!(grid = self.id().0, ?columns, "rivers applied");
        Ok(columns)
    }

    /// Draws one resource per cell from its terrain's distribution and founds a
    /// village wherever natives are drawn. Fails before touching any cell if a
    /// terrain on the grid has no usable distribution.
    pub fn assign_resources<R: Rng>(
        &mut self,
        frequencies: &ResourceFrequencies,
        founder: &mut dyn VillageFounder,
        rng: &mut R,
    ) -> Result<usize, GridError> {
        self.expect_stage("resources", GenerationStage::RiversApplied)?;
        let mut distributions: BTreeMap<TerrainKind, ResourceDistribution> = BTreeMap::new();
        for cell in self.cells() {
            let terrain = cell.terrain();
            if terrain != TerrainKind::None && !distributions.contains_key(&terrain) {
                distributions.insert(terrain, frequencies.distribution(terrain)?);
            }
        }

        let mut villages = 0;
        for cell in self.cells_mut() {
            let Some(distribution) = distributions.get(&cell.terrain()) else {
                continue;
            };
            let resource = distribution.sample(rng);
            if resource == ResourceKind::Natives {
                let village = founder.found(cell.coord(), rng);
                cell.attach_village(village);
                villages += 1;
            } else {
                cell.set_resource(resource);
            }
        }
        self.stage = GenerationStage::ResourcesAssigned;
        debug!(grid = self.id().0, villages, "resources assigned");
        Ok(villages)
    }

    /// Runs every generation stage with the config's settings. Rivers are
    /// carved whether or not the coast row is left as open ocean.
    pub fn generate(
        &mut self,
        config: &MapConfig,
        rngs: &mut RngManager,
        founder: &mut dyn VillageFounder,
    ) -> Result<GenerationReport, GridError> {
        config.validate()?;
        let worms = self.apply_terrain_worms(
            &config.worm_terrains,
            config.worm_length,
            &mut rngs.stream(TERRAIN_STREAM),
        )?;
        self.set_ocean_row(config.open_ocean)?;
        let river_columns = self.apply_rivers(&config.rivers, &mut rngs.stream(RIVER_STREAM))?;
        let villages = self.assign_resources(
            &config.resource_frequencies,
            founder,
            &mut rngs.stream(RESOURCE_STREAM),
        )?;
        Ok(GenerationReport {
            worms,
            river_columns,
            villages,
        })
    }

    /// Reveals a random land cell off the coast, as at the start of a game.
    pub fn reveal_landing_site(&mut self, rngs: &mut RngManager) -> Option<Coord> {
        let filter = super::CellFilter::land();
        let site = self.choose_cell(&filter, &mut rngs.stream(PLACEMENT_STREAM))?;
        let neighbours: Vec<Coord> = self
            .cell_at(site)
            .map(|cell| cell.adjacent_cells().collect())
            .unwrap_or_default();
        for coord in std::iter::once(site).chain(neighbours) {
            if let Some(cell) = self.cell_at_mut(coord) {
                cell.set_visibility(true);
            }
        }
        Some(site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::PixelFrame;
    use crate::grid::{GridId, GridKind};
    use crate::village::RandomVillages;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn blank_grid(width: u32, height: u32) -> Grid {
        let mut grid = Grid::new(
            GridId(0),
            GridKind::Strategic,
            width,
            height,
            PixelFrame::new(0, 0, 100, 100),
        );
        grid.create_cells().unwrap();
        grid
    }

    #[test]
    fn test_worm_of_length_five_touches_at_most_six_cells() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = blank_grid(10, 10);
            let path = grid.paint_terrain_worm(TerrainKind::Desert, 5, &mut rng);
            assert_eq!(path.len(), 6);

            let distinct: HashSet<Coord> = path.iter().copied().collect();
            assert!(distinct.len() <= 6);
            assert_eq!(grid.count_terrain(TerrainKind::Desert), distinct.len());
            for coord in &distinct {
                assert_eq!(grid.cell_at(*coord).unwrap().terrain(), TerrainKind::Desert);
            }
            for pair in path.windows(2) {
                assert!(pair[0].distance(pair[1]) <= 1);
            }
        }
    }

    #[test]
    fn test_worm_count_is_area_over_five() {
        assert_eq!(worm_count(16, 15), 48);
        assert_eq!(worm_count(10, 10), 20);
        assert_eq!(worm_count(2, 2), 0);
    }

    #[test]
    fn test_ocean_row_only_touches_row_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut grid = blank_grid(8, 6);
        grid.apply_terrain_worms(&[TerrainKind::Jungle], LengthRange { min: 3, max: 6 }, &mut rng)
            .unwrap();
        let before: Vec<TerrainKind> = grid
            .cells()
            .iter()
            .filter(|cell| cell.y() != 0)
            .map(|cell| cell.terrain())
            .collect();

        grid.set_ocean_row(false).unwrap();

        assert!(grid.row(0).all(|cell| cell.terrain() == TerrainKind::Water));
        assert!(grid.row(0).all(|cell| cell.is_coastal()));
        let after: Vec<TerrainKind> = grid
            .cells()
            .iter()
            .filter(|cell| cell.y() != 0)
            .map(|cell| cell.terrain())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_open_ocean_leaves_row_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut grid = blank_grid(8, 6);
        grid.apply_terrain_worms(&[TerrainKind::Hills], LengthRange { min: 1, max: 1 }, &mut rng)
            .unwrap();
        grid.set_ocean_row(true).unwrap();
        assert_eq!(grid.stage(), GenerationStage::OceanRowSet);
        assert_eq!(grid.count_terrain(TerrainKind::Water), 0);
    }

    #[test]
    fn test_river_columns_are_separated() {
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let columns = choose_river_columns(10, 3, 3, 1_000, &mut rng).unwrap();
            assert_eq!(columns.len(), 3);
            for (i, a) in columns.iter().enumerate() {
                assert!((0..10).contains(a));
                for b in &columns[i + 1..] {
                    assert!(a.abs_diff(*b) >= 3, "columns {:?} too close", columns);
                }
            }
        }
    }

    #[test]
    fn test_impossible_river_separation_fails_loudly() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = choose_river_columns(4, 3, 3, 500, &mut rng);
        assert!(matches!(
            result,
            Err(GridError::RiverPlacement { rivers: 3, attempts: 500, .. })
        ));
    }

    #[test]
    fn test_rivers_never_flow_south() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut grid = blank_grid(12, 10);
        for _ in 0..20 {
            let path = grid.paint_river(5, 12, &mut rng);
            assert_eq!(path[0], Coord::new(5, 1));
            for pair in path.windows(2) {
                assert!(pair[1].y >= pair[0].y);
            }
        }
        assert!(grid.row(0).all(|cell| cell.terrain() == TerrainKind::Clear));
        let river = grid.find_cell(5, 1).unwrap();
        assert!(river.is_water());
        assert_ne!(river.terrain_variant(), crate::terrain::COASTAL_WATER_VARIANT);
    }

    #[test]
    fn test_stages_must_run_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut grid = blank_grid(6, 6);
        assert!(matches!(
            grid.set_ocean_row(false),
            Err(GridError::StageOrder {
                expected: GenerationStage::TerrainWormsApplied,
                actual: GenerationStage::Empty,
                ..
            })
        ));
        assert!(grid.apply_rivers(&RiverConfig::default(), &mut rng).is_err());

        grid.apply_terrain_worms(&TerrainKind::LAND, LengthRange { min: 2, max: 4 }, &mut rng)
            .unwrap();
        assert!(grid
            .apply_terrain_worms(&TerrainKind::LAND, LengthRange { min: 2, max: 4 }, &mut rng)
            .is_err());
    }

    #[test]
    fn test_inverted_ranges_return_errors() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut grid = blank_grid(6, 6);
        assert!(matches!(
            grid.apply_terrain_worms(&TerrainKind::LAND, LengthRange { min: 9, max: 3 }, &mut rng),
            Err(GridError::Config(ConfigError::InvertedRange { what: "worm length", .. }))
        ));
        assert_eq!(grid.stage(), GenerationStage::Empty);

        grid.apply_terrain_worms(&TerrainKind::LAND, LengthRange { min: 2, max: 3 }, &mut rng)
            .unwrap();
        grid.set_ocean_row(false).unwrap();
        let rivers = RiverConfig {
            min: 3,
            max: 1,
            ..RiverConfig::default()
        };
        assert!(matches!(
            grid.apply_rivers(&rivers, &mut rng),
            Err(GridError::Config(ConfigError::InvertedRange { what: "river count", .. }))
        ));
        assert_eq!(grid.stage(), GenerationStage::OceanRowSet);
    }

    #[test]
    fn test_generate_validates_config_first() {
        let mut config = MapConfig::colony();
        config.rivers.min = 4;
        config.rivers.max = 2;
        let mut grid = blank_grid(16, 15);
        let result = grid.generate(&config, &mut RngManager::new(1), &mut RandomVillages::new());
        assert!(matches!(result, Err(GridError::Config(_))));
        assert_eq!(grid.stage(), GenerationStage::Empty);
    }

    #[test]
    fn test_unallocated_grid_cannot_generate() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut grid = Grid::new(GridId(0), GridKind::Strategic, 4, 4, PixelFrame::new(0, 0, 40, 40));
        assert!(matches!(
            grid.apply_terrain_worms(&TerrainKind::LAND, LengthRange { min: 1, max: 2 }, &mut rng),
            Err(GridError::NotAllocated)
        ));
    }

    #[test]
    fn test_missing_distribution_aborts_before_assignment() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut grid = blank_grid(6, 6);
        grid.apply_terrain_worms(&[TerrainKind::Swamp], LengthRange { min: 4, max: 8 }, &mut rng)
            .unwrap();
        grid.set_ocean_row(false).unwrap();
        let rivers = RiverConfig {
            min: 0,
            max: 0,
            ..RiverConfig::default()
        };
        grid.apply_rivers(&rivers, &mut rng).unwrap();

        let mut frequencies = ResourceFrequencies::colony();
        frequencies.0.remove(&TerrainKind::Swamp);
        let result = grid.assign_resources(&frequencies, &mut RandomVillages::new(), &mut rng);
        assert!(matches!(
            result,
            Err(GridError::MissingResourceDistribution(TerrainKind::Swamp))
        ));
        assert_eq!(grid.stage(), GenerationStage::RiversApplied);
        assert!(grid.cells().iter().all(|cell| cell.resource().is_none()));
    }

    #[test]
    fn test_natives_frequency_matches_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(1885);
        let mut grid = blank_grid(100, 100);
        grid.apply_terrain_worms(&[TerrainKind::Clear], LengthRange { min: 0, max: 0 }, &mut rng)
            .unwrap();
        grid.set_ocean_row(true).unwrap();
        let rivers = RiverConfig {
            min: 0,
            max: 0,
            ..RiverConfig::default()
        };
        grid.apply_rivers(&rivers, &mut rng).unwrap();

        let mut frequencies = ResourceFrequencies::default();
        frequencies.set_weight(TerrainKind::Clear, ResourceKind::None, 135);
        frequencies.set_weight(TerrainKind::Clear, ResourceKind::Ivory, 5);
        frequencies.set_weight(TerrainKind::Clear, ResourceKind::Natives, 20);

        let villages = grid
            .assign_resources(&frequencies, &mut RandomVillages::new(), &mut rng)
            .unwrap();
        let natives = grid
            .cells()
            .iter()
            .filter(|cell| cell.resource() == ResourceKind::Natives)
            .count();
        assert_eq!(villages, natives);
        assert!(grid
            .cells()
            .iter()
            .all(|cell| cell.has_village() == (cell.resource() == ResourceKind::Natives)));

        let share = natives as f64 / 10_000.0;
        assert!(
            (share - 0.125).abs() < 0.015,
            "natives share {share} too far from 0.125"
        );
    }
}
