use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use colonymap::{
    coords::Coord, Cell, Grid, MapConfig, MapLoader, ResourceKind, RngManager, SnapshotWriter,
    TerrainKind, World,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Colonial map generator")]
struct Cli {
    /// Path to a map YAML file (uses the built-in colony map when omitted)
    #[arg(long)]
    map: Option<PathBuf>,

    /// Override the map seed
    #[arg(long)]
    seed: Option<u64>,

    /// Re-center the minimap on x,y after generation
    #[arg(long, value_parser = parse_center)]
    center: Option<Coord>,

    /// Directory to write a JSON snapshot into
    #[arg(long)]
    save: Option<PathBuf>,

    /// Restore the map from a JSON snapshot instead of generating it
    #[arg(long)]
    load: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "colonymap=trace"
    #[arg(long)]
    log_level: Option<String>,

    /// Print terrain for cells that are not yet visible
    #[arg(long)]
    reveal: bool,
}

fn parse_center(value: &str) -> Result<Coord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{value}'"))?;
    let x = x.trim().parse::<i32>().map_err(|err| err.to_string())?;
    let y = y.trim().parse::<i32>().map_err(|err| err.to_string())?;
    Ok(Coord::new(x, y))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.map {
        Some(path) => MapLoader::new(".").load(path)?,
        None => MapConfig::colony(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));

    let mut world = match &cli.load {
        Some(path) => {
            let snapshot = SnapshotWriter::read(path)?;
            World::restore(&config, &snapshot)
                .with_context(|| format!("Failed to restore map from {}", path.display()))?
        }
        None => {
            let mut rngs = RngManager::new(config.seed);
            World::generate(&config, &mut rngs)
                .with_context(|| format!("Failed to generate map '{}'", config.name))?
        }
    };

    if let Some(center) = cli.center {
        if !world.strategic().bounds().contains(center.x, center.y) {
            return Err(anyhow!(
                "minimap center ({}, {}) is outside the {}x{} map",
                center.x,
                center.y,
                world.strategic().width(),
                world.strategic().height()
            ));
        }
        world.calibrate_minimap(center.x, center.y);
    }

    println!(
        "Map '{}' (seed {}), {}x{}",
        world.name(),
        world.seed(),
        world.strategic().width(),
        world.strategic().height()
    );
    print!("{}", render(world.strategic(), cli.reveal));
    if let Some(center) = world.minimap().center() {
        println!("Minimap centred on ({}, {}):", center.x, center.y);
    }
    print!("{}", render(world.minimap().grid(), cli.reveal));
    for location in world.abstract_grids() {
        println!("Off-map location: {} [{}]", location.name(), location.image_id());
    }

    if let Some(dir) = &cli.save {
        let path = SnapshotWriter::new(dir).write(&world.snapshot())?;
        info!(path = %path.display(), "snapshot written");
        println!("Snapshot written to {}", path.display());
    }
    Ok(())
}

/// Rows from north to south; row 0 is the coast and prints last.
fn render(grid: &Grid, reveal: bool) -> String {
    let mut out = String::new();
    for y in (0..grid.height() as i32).rev() {
        for cell in grid.row(y) {
            out.push(glyph(cell, reveal));
        }
        out.push('\n');
    }
    out
}

fn glyph(cell: &Cell, reveal: bool) -> char {
    if !cell.visible() && !reveal {
        return '#';
    }
    if cell.resource() == ResourceKind::Natives {
        return 'V';
    }
    match cell.terrain() {
        TerrainKind::Clear => '.',
        TerrainKind::Savannah => ',',
        TerrainKind::Mountain => '^',
        TerrainKind::Hills => 'n',
        TerrainKind::Jungle => '&',
        TerrainKind::Swamp => '%',
        TerrainKind::Desert => ':',
        TerrainKind::Water => '~',
        TerrainKind::None => ' ',
    }
}
