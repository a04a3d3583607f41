use colonymap::{
    config::ResourceFrequencies,
    coords::Coord,
    terrain::COASTAL_WATER_VARIANT,
    Direction, MapConfig, MapLoader, ResourceKind, RngManager, TerrainKind, World,
};

fn map_loader() -> MapLoader {
    MapLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn generate(seed: u64) -> World {
    let config = map_loader().load("maps/colony.yaml").unwrap();
    let mut rngs = RngManager::new(seed);
    World::generate(&config, &mut rngs).unwrap()
}

#[test]
fn bundled_map_matches_builtin_colony() {
    let loaded = map_loader().load("maps/colony.yaml").unwrap();
    let builtin = MapConfig::colony();
    assert_eq!(loaded.name, builtin.name);
    assert_eq!(loaded.seed, builtin.seed);
    assert_eq!((loaded.width, loaded.height), (16, 15));
    assert_eq!(loaded.worm_terrains, builtin.worm_terrains);
    assert_eq!(loaded.resource_frequencies, ResourceFrequencies::colony());
    assert_eq!(loaded.minimap.pixel_frame, builtin.minimap.pixel_frame);
    assert_eq!(loaded.abstract_grids.len(), 2);
}

#[test]
fn coastal_row_is_ocean() {
    let world = generate(1885);
    let coast: Vec<_> = world.strategic().row(0).collect();
    assert_eq!(coast.len(), 16);
    for cell in coast {
        assert_eq!(cell.terrain(), TerrainKind::Water);
        assert_eq!(cell.terrain_variant(), COASTAL_WATER_VARIANT);
        assert_eq!(cell.resource(), ResourceKind::None);
        assert!(cell.is_coastal());
    }
}

#[test]
fn every_cell_is_painted_and_resourced() {
    let world = generate(77);
    let grid = world.strategic();
    assert_eq!(grid.cells().len(), 16 * 15);
    for cell in grid.cells() {
        assert_ne!(cell.terrain(), TerrainKind::None);
        assert!(cell.terrain_variant() < cell.terrain().variant_count());
        if cell.is_water() {
            assert_eq!(cell.resource(), ResourceKind::None);
        }
        assert_eq!(cell.has_village(), cell.resource() == ResourceKind::Natives);
    }
    let report = world.report().unwrap();
    assert_eq!(report.worms, 16 * 15 / 5);
    assert!((2..=3).contains(&report.river_columns.len()));
    let villages = grid
        .cells()
        .iter()
        .filter(|cell| cell.resource() == ResourceKind::Natives)
        .count();
    assert_eq!(report.villages, villages);
}

#[test]
fn corner_cell_has_two_neighbours() {
    let world = generate(2);
    let corner = world.strategic().find_cell(0, 0).unwrap();
    assert_eq!(corner.adjacent(Direction::Up), Some(Coord::new(0, 1)));
    assert_eq!(corner.adjacent(Direction::Right), Some(Coord::new(1, 0)));
    assert_eq!(corner.adjacent(Direction::Left), None);
    assert_eq!(corner.adjacent(Direction::Down), None);
    assert_eq!(corner.diagonal_cells(), &[Coord::new(1, 1)]);
}

#[test]
fn adjacency_is_symmetric() {
    let world = generate(4);
    let grid = world.strategic();
    for cell in grid.cells() {
        for direction in Direction::ALL {
            if let Some(coord) = cell.adjacent(direction) {
                let neighbour = grid.cell_at(coord).unwrap();
                assert_eq!(neighbour.adjacent(direction.opposite()), Some(cell.coord()));
            }
        }
    }
}

#[test]
fn same_seed_same_map() {
    let first = generate(31);
    let second = generate(31);
    assert_eq!(first.strategic().to_record(), second.strategic().to_record());
    assert_eq!(first.landing_site(), second.landing_site());

    let other = generate(32);
    assert_ne!(first.strategic().to_record(), other.strategic().to_record());
}

#[test]
fn open_ocean_keeps_generated_coast() {
    let mut config = MapConfig::colony();
    config.open_ocean = true;
    config.width = 40;
    config.height = 30;
    let mut rngs = RngManager::new(8);
    let world = World::generate(&config, &mut rngs).unwrap();
    let land_on_coast = world
        .strategic()
        .row(0)
        .filter(|cell| cell.terrain().is_land())
        .count();
    assert!(land_on_coast > 0);
}
