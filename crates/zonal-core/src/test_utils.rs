//! Shared test fixtures for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::builder::RuleSetBuilder;
use crate::feature::FeatureInput;
use crate::rules::RuleSet;

/// Three concentric rings around the center with every rule kind present:
/// `0_1km` [0, 1000), `1_2km` [1000, 2000), `2_5km` [2000, 5000).
pub fn three_ring_rules() -> RuleSet {
    let mut b = RuleSetBuilder::new();
    b.add_zone("0_1km", 0.0, 1000.0);
    b.add_zone("1_2km", 1000.0, 2000.0);
    b.add_zone("2_5km", 2000.0, 5000.0);

    b.add_housing_rule("0_1km", 0.8, 0.15, 0.05)
        .and_then(|b| b.add_housing_rule("1_2km", 0.4, 0.3, 0.3))
        .and_then(|b| b.add_housing_rule("2_5km", 0.1, 0.7, 0.2))
        .and_then(|b| b.add_landuse_rule("0_1km", 0.9))
        .and_then(|b| b.add_landuse_rule("1_2km", 0.6))
        .and_then(|b| b.add_landuse_rule("2_5km", 0.3))
        .and_then(|b| b.add_household_rule("0_1km", 0.6, 0.2, 0.2))
        .and_then(|b| b.add_household_rule("1_2km", 0.3, 0.3, 0.4))
        .and_then(|b| b.add_household_rule("2_5km", 0.2, 0.2, 0.6))
        .and_then(|b| b.add_unit_size_rule("0_1km", 40.0, 80.0))
        .and_then(|b| b.add_unit_size_rule("1_2km", 60.0, 110.0))
        .and_then(|b| b.add_unit_size_rule("2_5km", 90.0, 160.0))
        .expect("fixture rules are valid");

    b.add_residents_rule("0_1km", 120.0)
        .add_residents_rule("1_2km", 60.0)
        .add_residents_rule("2_5km", 20.0);

    b.build().expect("fixture rule set builds")
}

/// A single zone `z` covering [0, 1000) with label 0, carrying only the
/// housing and landuse rules.
pub fn single_zone_rules(residential_pct: f64, housing: [f64; 3]) -> RuleSet {
    let mut b = RuleSetBuilder::new();
    b.add_zone("z", 0.0, 1000.0);
    b.add_housing_rule("z", housing[0], housing[1], housing[2])
        .expect("fixture housing rule is valid");
    b.add_landuse_rule("z", residential_pct)
        .expect("fixture landuse rule is valid");
    b.build().expect("fixture rule set builds")
}

/// `n` features spread over 0..6000 m (the outermost stretch lies outside
/// every ring of [`three_ring_rules`]) with footprints of 80..1280 m².
pub fn sample_features(n: usize) -> Vec<FeatureInput> {
    (0..n)
        .map(|i| {
            let distance = (i * 397 % 6000) as f64 + 0.5;
            let area = 80.0 + (i * 131 % 1200) as f64;
            FeatureInput::new(distance, area)
        })
        .collect()
}
