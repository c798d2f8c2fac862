//! Adversarial input tests for the zonal rule engine.
//!
//! Edge cases that should either return errors or be handled gracefully
//! without panics.

use zonal_core::builder::RuleSetBuilder;
use zonal_core::category::{BuildingType, NONE_CLASS};
use zonal_core::feature::{FeatureParams, classify_feature};
use zonal_core::grid::{CenterPosition, Grid, GridError, classify_grid};
use zonal_core::records::{RuleDocument, UnitSizeRecord, ZoneRecord};
use zonal_core::rng::SimRng;
use zonal_core::rules::RuleSet;
use zonal_core::test_utils::*;

/// NaN and infinite distances match no zone.
#[test]
fn non_finite_distances_are_outside() {
    let rules = three_ring_rules();
    let mut rng = SimRng::new(1);
    for d in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let attrs = classify_feature(&rules, d, 100.0, &FeatureParams::default(), &mut rng);
        assert_eq!(attrs.zone, None);
        assert_eq!(attrs.building_type, BuildingType::None);
    }
}

/// Negative footprint areas clamp resident counts at zero.
#[test]
fn negative_area_has_no_residents() {
    let mut b = RuleSetBuilder::new();
    b.add_zone("z", 0.0, 100.0);
    b.add_housing_rule("z", 1.0, 0.0, 0.0).unwrap();
    b.add_landuse_rule("z", 1.0).unwrap();
    b.add_household_rule("z", 0.0, 1.0, 0.0).unwrap();
    b.add_residents_rule("z", 100.0);
    let rules = b.build().unwrap();

    let attrs = classify_feature(&rules, 1.0, -500.0, &FeatureParams::default(), &mut SimRng::new(2));
    assert_eq!(attrs.building_type, BuildingType::Apartment);
    assert_eq!(attrs.resident_count, 0);
    assert_eq!(attrs.household_count, 0);
}

/// Zero-sized rasters classify to empty outputs.
#[test]
fn empty_grid() {
    let rules = three_ring_rules();
    let out = classify_grid(
        &rules,
        Grid::filled(0, 0, 0),
        CenterPosition::new(0.0, 0.0),
        100.0,
        &mut SimRng::new(1),
    );
    assert!(out.building_grid.is_empty());
    assert_eq!(out.stats.total_units, 0);
}

/// Building grids whose data does not match their shape are rejected.
#[test]
fn ragged_grid_data() {
    assert!(matches!(
        Grid::from_vec(3, 3, vec![0; 8]),
        Err(GridError::DataLength { len: 8, .. })
    ));
}

/// A rule set with no zones classifies everything as unknown.
#[test]
fn empty_rule_set() {
    let rules = RuleSet::from_document(&RuleDocument::default()).unwrap();
    let out = classify_grid(
        &rules,
        Grid::filled(4, 4, 17),
        CenterPosition::new(0.0, 0.0),
        100.0,
        &mut SimRng::new(1),
    );
    assert!(out.building_grid.cells().iter().all(|c| *c == NONE_CLASS));
    assert_eq!(out.skipped.outside_zones, 16);
}

/// Inverted unit size ranges abort construction.
#[test]
fn inverted_unit_size_in_document() {
    let doc = RuleDocument {
        zones: vec![ZoneRecord {
            name: "z".into(),
            max_distance: 10.0,
            ..Default::default()
        }],
        unit_size_rules: vec![UnitSizeRecord {
            zone: "z".into(),
            min_size: 120.0,
            max_size: 80.0,
        }],
        ..Default::default()
    };
    let err = RuleSet::from_document(&doc).unwrap_err();
    assert_eq!(err.kind(), "inverted range");
}

/// A zone label colliding with the unknown sentinel is rejected.
#[test]
fn reserved_zone_id() {
    let doc = RuleDocument {
        zones: vec![ZoneRecord {
            name: "z".into(),
            max_distance: 10.0,
            id: Some(99),
            ..Default::default()
        }],
        ..Default::default()
    };
    let err = RuleSet::from_document(&doc).unwrap_err();
    assert_eq!(err.kind(), "reserved zone label");
}

/// Zero-width unit size ranges yield the bound.
#[test]
fn degenerate_unit_size() {
    let mut b = RuleSetBuilder::new();
    b.add_zone("z", 0.0, 100.0);
    b.add_housing_rule("z", 0.0, 0.0, 1.0).unwrap();
    b.add_landuse_rule("z", 1.0).unwrap();
    b.add_unit_size_rule("z", 75.0, 75.0).unwrap();
    let rules = b.build().unwrap();

    let attrs = classify_feature(&rules, 0.0, 100.0, &FeatureParams::default(), &mut SimRng::new(4));
    assert_eq!(attrs.unit_size, 75.0);
}
