//! Load a run config and rule file, then classify a synthetic raster and a
//! batch of synthetic building footprints.
//!
//! Run with: `cargo run -p zonal-data --example classify_rules [DATA_DIR]`
//!
//! `DATA_DIR` defaults to the bundled `demos/data`. Set `RUST_LOG=debug` to
//! see classification summaries.

use std::error::Error;
use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zonal_core::category::BuildingType;
use zonal_core::coverage::check_coverage;
use zonal_core::feature::{FeatureInput, classify_features};
use zonal_core::grid::{CENTER_MARKER, Grid, classify_template};
use zonal_core::rng::SimRng;
use zonal_data::{RunConfig, find_rule_file};

const GRID_SIZE: usize = 80;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zonal_core=info,zonal_data=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/data"));

    let config = match find_rule_file(&dir, "run")? {
        Some(path) => RunConfig::load(&path)?,
        None => RunConfig::default(),
    };
    let rules = config.load_rules(&dir)?;
    check_coverage(&rules, config.strictness)?;
    println!("{rules}");

    let seed = config.resolve_seed();
    let cell_size = config.cell_size()?;
    let mut rng = SimRng::new(seed);

    // --- Raster ---

    let mut marker = Grid::filled(GRID_SIZE, GRID_SIZE, 0);
    if let Some(cell) = marker.get_mut(GRID_SIZE / 2, GRID_SIZE / 2) {
        *cell = CENTER_MARKER;
    }
    let raster = classify_template(
        &rules,
        Grid::filled(GRID_SIZE, GRID_SIZE, 0),
        &marker,
        cell_size,
        &mut rng,
    )?;

    println!("Raster {GRID_SIZE}x{GRID_SIZE} (seed {seed}):");
    for zone in rules.zones() {
        println!(
            "  {:<8} {:>5} cells, {:>5} residential",
            zone.name(),
            raster.stats.zone_count(zone.name()),
            raster.stats.residential_units_in_zone(zone.name())
        );
    }
    for ty in BuildingType::RESIDENTIAL {
        println!("  {:<10} {:>5}", ty.to_string(), raster.stats.type_count(ty));
    }
    println!(
        "  skipped: {} outside zones, {} missing rules",
        raster.skipped.outside_zones, raster.skipped.missing_rules
    );

    // --- Features ---

    let params = config.feature_params()?;
    let inputs: Vec<FeatureInput> = (0..2_000)
        .map(|i| FeatureInput::new((i * 37 % 5_500) as f64, 60.0 + (i * 53 % 900) as f64))
        .collect();
    let features = classify_features(&rules, &inputs, &params, &mut rng);

    let residential = features.iter().filter(|f| f.is_residential()).count();
    let households: u32 = features.iter().map(|f| f.household_count).sum();
    let residents: u32 = features.iter().map(|f| f.resident_count).sum();
    println!("Features: {} total, {residential} residential", features.len());
    println!("  {households} households, {residents} residents");

    Ok(())
}
