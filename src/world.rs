//! World - owns every grid of a map and keeps the minimap attached to the
//! strategic grid.

use chrono::Utc;
use tracing::{info, warn};

use crate::cell::OccupantId;
use crate::config::MapConfig;
use crate::coords::Coord;
use crate::error::GridError;
use crate::grid::{AbstractGrid, GenerationReport, Grid, GridId, GridKind, MiniGrid};
use crate::rng::RngManager;
use crate::snapshot::{GridRecord, MapSnapshot};
use crate::village::{RandomVillages, VillageFounder};

#[derive(Debug, Clone)]
pub struct World {
    name: String,
    seed: u64,
    next_grid: u32,
    strategic: Grid,
    minimap: MiniGrid,
    abstract_grids: Vec<AbstractGrid>,
    landing_site: Option<Coord>,
    report: Option<GenerationReport>,
}

impl World {
    /// Generates a fresh map with randomly founded native villages.
    pub fn generate(config: &MapConfig, rngs: &mut RngManager) -> Result<Self, GridError> {
        Self::generate_with(config, rngs, &mut RandomVillages::default())
    }

    pub fn generate_with(
        config: &MapConfig,
        rngs: &mut RngManager,
        founder: &mut dyn VillageFounder,
    ) -> Result<Self, GridError> {
        config.validate()?;
        let mut next_grid = 0;
        let mut strategic = Grid::new(
            allocate(&mut next_grid),
            GridKind::Strategic,
            config.width,
            config.height,
            config.pixel_frame,
        );
        strategic.create_cells()?;
        let report = strategic.generate(config, rngs, founder)?;
        let landing_site = strategic.reveal_landing_site(rngs);

        let mut minimap = MiniGrid::new(
            allocate(&mut next_grid),
            &strategic,
            config.minimap.width,
            config.minimap.height,
            config.minimap.pixel_frame,
        )?;
        let center = landing_site.unwrap_or_else(|| map_center(&strategic));
        minimap.calibrate(&strategic, center.x, center.y);

        let mut abstract_grids = Vec::with_capacity(config.abstract_grids.len());
        for location in &config.abstract_grids {
            abstract_grids.push(AbstractGrid::new(
                allocate(&mut next_grid),
                location.name.clone(),
                location.image_id.clone(),
                config.pixel_frame,
            )?);
        }

        info!(
            map = %config.name,
            seed = rngs.seed(),
            worms = report.worms,
            rivers = report.river_columns.len(),
            villages = report.villages,
            landing_site = ?landing_site,
            "map generated"
        );

        Ok(Self {
            name: config.name.clone(),
            seed: rngs.seed(),
            next_grid,
            strategic,
            minimap,
            abstract_grids,
            landing_site,
            report: Some(report),
        })
    }

    /// Rebuilds a map from a snapshot. Pixel frames and the minimap extent
    /// come from `config`; grid sizes and cell state come from the snapshot.
    pub fn restore(config: &MapConfig, snapshot: &MapSnapshot) -> Result<Self, GridError> {
        config.validate()?;
        let record = snapshot
            .grid(GridKind::Strategic)
            .ok_or(GridError::MissingGridRecord(GridKind::Strategic))?;
        if record.coordinate_width != config.width || record.coordinate_height != config.height {
            warn!(
                snapshot_width = record.coordinate_width,
                snapshot_height = record.coordinate_height,
                config_width = config.width,
                config_height = config.height,
                "snapshot size differs from map configuration; using the snapshot"
            );
        }

        let mut next_grid = 0;
        let mut strategic = Grid::new(
            allocate(&mut next_grid),
            GridKind::Strategic,
            record.coordinate_width,
            record.coordinate_height,
            config.pixel_frame,
        );
        strategic.load_cells(&record.cell_list)?;

        let mut minimap = MiniGrid::new(
            allocate(&mut next_grid),
            &strategic,
            config.minimap.width,
            config.minimap.height,
            config.minimap.pixel_frame,
        )?;
        let center = snapshot
            .minimap_center
            .unwrap_or_else(|| map_center(&strategic));
        minimap.calibrate(&strategic, center.x, center.y);

        let mut abstract_grids = Vec::new();
        for record in snapshot.grids_of(GridKind::Abstract) {
            let mut location = AbstractGrid::new(
                allocate(&mut next_grid),
                record.name.clone().unwrap_or_default(),
                record.image_id.clone().unwrap_or_default(),
                config.pixel_frame,
            )?;
            location.load_cells(&record.cell_list)?;
            abstract_grids.push(location);
        }

        info!(
            map = %snapshot.map_name,
            seed = snapshot.seed,
            abstract_grids = abstract_grids.len(),
            "map restored"
        );

        Ok(Self {
            name: snapshot.map_name.clone(),
            seed: snapshot.seed,
            next_grid,
            strategic,
            minimap,
            abstract_grids,
            landing_site: None,
            report: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of grid ids handed out so far.
    pub fn grid_count(&self) -> u32 {
        self.next_grid
    }

    pub fn strategic(&self) -> &Grid {
        &self.strategic
    }

    /// Mutable access to the strategic grid. Call `resync_minimap` afterwards
    /// if the visible window changed.
    pub fn strategic_mut(&mut self) -> &mut Grid {
        &mut self.strategic
    }

    pub fn minimap(&self) -> &MiniGrid {
        &self.minimap
    }

    pub fn abstract_grids(&self) -> &[AbstractGrid] {
        &self.abstract_grids
    }

    pub fn abstract_grid(&self, name: &str) -> Option<&AbstractGrid> {
        self.abstract_grids.iter().find(|grid| grid.name() == name)
    }

    pub fn landing_site(&self) -> Option<Coord> {
        self.landing_site
    }

    /// Stage counts from generation; `None` for restored maps.
    pub fn report(&self) -> Option<&GenerationReport> {
        self.report.as_ref()
    }

    pub fn calibrate_minimap(&mut self, center_x: i32, center_y: i32) -> Vec<OccupantId> {
        self.minimap.calibrate(&self.strategic, center_x, center_y)
    }

    pub fn resync_minimap(&mut self) -> Vec<OccupantId> {
        self.minimap.resync(&self.strategic)
    }

    pub fn snapshot(&self) -> MapSnapshot {
        let mut grids: Vec<GridRecord> = Vec::with_capacity(1 + self.abstract_grids.len());
        grids.push(self.strategic.to_record());
        grids.extend(self.abstract_grids.iter().map(AbstractGrid::to_record));
        MapSnapshot {
            map_name: self.name.clone(),
            seed: self.seed,
            saved_at: Utc::now(),
            minimap_center: self.minimap.center(),
            grids,
        }
    }
}

fn allocate(next_grid: &mut u32) -> GridId {
    let id = GridId(*next_grid);
    *next_grid += 1;
    id
}

fn map_center(grid: &Grid) -> Coord {
    Coord::new((grid.width() / 2) as i32, (grid.height() / 2) as i32)
}
