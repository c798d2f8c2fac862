//! Stress tests for the zonal rule engine.
//!
//! These are marked `#[ignore]` for nightly CI runs. Run with:
//!   cargo test --package zonal-core -- --ignored

use zonal_core::builder::RuleSetBuilder;
use zonal_core::determinism::{fingerprint, validate_grid_determinism};
use zonal_core::feature::{FeatureInput, FeatureParams, classify_features_indexed};
use zonal_core::grid::{CenterPosition, Grid};
use zonal_core::rules::RuleSet;
use zonal_core::test_utils::*;

/// 200 contiguous 50m rings, each with a full set of rules.
fn many_rings() -> RuleSet {
    let mut b = RuleSetBuilder::new();
    for i in 0..200 {
        let name = format!("ring{i}");
        let start = i as f64 * 50.0;
        let mix = (i % 10) as f64 / 10.0;
        b.add_zone(&name, start, start + 50.0);
        b.add_housing_rule(&name, mix, 1.0 - mix, 0.0).unwrap();
        b.add_landuse_rule(&name, 1.0 - mix).unwrap();
        b.add_household_rule(&name, 0.2, 0.3, 0.5).unwrap();
        b.add_residents_rule(&name, 10.0 + i as f64);
        b.add_unit_size_rule(&name, 50.0, 150.0).unwrap();
    }
    b.build().unwrap()
}

/// 1000x1000 raster against 200 zones, classified twice.
#[test]
#[ignore]
fn test_million_cell_grid_is_deterministic() {
    let rules = many_rings();
    let grid = Grid::filled(1_000, 1_000, 0);
    let result = validate_grid_determinism(
        &rules,
        &grid,
        CenterPosition::new(5_000.0, 5_000.0),
        10.0,
        77,
    )
    .unwrap();
    assert!(result.is_deterministic, "diverged at {:?}", result.divergence);
}

/// 500k features on per-unit streams, classified twice.
#[test]
#[ignore]
fn test_500k_features_indexed() {
    let rules = many_rings();
    let inputs: Vec<FeatureInput> = (0..500_000)
        .map(|i| FeatureInput::new((i % 11_000) as f64, 50.0 + (i % 700) as f64))
        .collect();
    let params = FeatureParams::default();

    let a = classify_features_indexed(&rules, &inputs, &params, 3);
    let b = classify_features_indexed(&rules, &inputs, &params, 3);
    assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
}

/// The shared three-ring fixture over a large sample.
#[test]
#[ignore]
fn test_three_rings_large_sample() {
    let rules = three_ring_rules();
    let inputs = sample_features(200_000);
    let out = classify_features_indexed(&rules, &inputs, &FeatureParams::default(), 9);
    assert_eq!(out.len(), 200_000);
    assert!(out.iter().any(|a| a.is_residential()));
}
