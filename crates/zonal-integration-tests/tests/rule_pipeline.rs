//! Cross-crate pipeline tests: rule files on disk, run configs, raster and
//! feature classification, coverage checks and distribution reports.

use std::fs;
use std::path::{Path, PathBuf};

use zonal_core::category::{BuildingType, NONE_CLASS, UNKNOWN_ZONE_LABEL};
use zonal_core::coverage::{Strictness, check_coverage};
use zonal_core::determinism::{validate_feature_determinism, validate_grid_determinism};
use zonal_core::feature::{FeatureParams, classify_features};
use zonal_core::grid::{CENTER_MARKER, CenterPosition, Grid, classify_template};
use zonal_core::rng::SimRng;
use zonal_core::test_utils::sample_features;
use zonal_data::{ConfigError, LoadError, RunConfig, find_rule_file, load_rules};
use zonal_stats::{FeatureSummary, GridReport};

const RULES: &str = r#"
zones:
  - name: center
    min_distance: 0
    max_distance: 1000
  - name: suburb
    min_distance: 1000
    max_distance: 3000
housing_rules:
  - zone: center
    apartment_pct: 0.7
    detached_pct: 0.1
    terraced_pct: 0.2
  - zone: suburb
    apartment_pct: 0.1
    detached_pct: 0.6
    terraced_pct: 0.3
landuse_rules:
  - zone: center
    residential_pct: 0.8
  - zone: suburb
    residential_pct: 0.5
household_rules:
  - zone: center
    single_person_pct: 0.5
    single_parent_pct: 0.2
    two_parent_pct: 0.3
  - zone: suburb
    single_person_pct: 0.2
    single_parent_pct: 0.2
    two_parent_pct: 0.6
residents_rules:
  - zone: center
    residents_per_grid: 150
  - zone: suburb
    residents_per_grid: 40
unit_size_rules:
  - zone: center
    min_size: 45
    max_size: 85
  - zone: suburb
    min_size: 90
    max_size: 160
"#;

/// Create a unique temporary directory for a test.
fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "zonal_pipeline_test_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

fn centered_marker(size: usize) -> Grid<i32> {
    let mut marker = Grid::filled(size, size, 0);
    *marker.get_mut(size / 2, size / 2).unwrap() = CENTER_MARKER;
    marker
}

// ===========================================================================
// Raster pipeline
// ===========================================================================

#[test]
fn yaml_rules_to_raster_report() {
    let dir = make_test_dir("raster");
    fs::write(dir.join("rule.yaml"), RULES).unwrap();
    fs::write(dir.join("run.toml"), "seed = 11\ncell_size = 50.0\nstrictness = \"strict\"\n").unwrap();

    let config = RunConfig::load(&dir.join("run.toml")).unwrap();
    let rules = config.load_rules(&dir).unwrap();
    check_coverage(&rules, config.strictness).unwrap();

    let size = 140;
    let mut rng = SimRng::new(config.resolve_seed());
    let out = classify_template(
        &rules,
        Grid::filled(size, size, 0),
        &centered_marker(size),
        config.cell_size().unwrap(),
        &mut rng,
    )
    .unwrap();

    // Corners are ~4950m from the center.
    assert_eq!(out.zone_grid.get(0, 0), Some(&UNKNOWN_ZONE_LABEL));
    assert_eq!(out.building_grid.get(0, 0), Some(&NONE_CLASS));
    assert_eq!(out.zone_grid.get(size / 2, size / 2), Some(&0));
    assert_eq!(out.skipped.missing_rules, 0);

    let report = GridReport::compare(&rules, &out.stats);
    assert_eq!(report.total_cells, (size * size) as u64);
    assert_eq!(
        report.classified_cells + out.skipped.outside_zones,
        report.total_cells
    );
    assert!(report.max_deviation() < 0.05, "{report}");

    cleanup(&dir);
}

#[test]
fn raster_runs_reproduce() {
    let rules = zonal_data::loader::parse_rules(RULES, zonal_data::Format::Yaml).unwrap();
    let result = validate_grid_determinism(
        &rules,
        &Grid::filled(60, 60, 0),
        CenterPosition::new(1_500.0, 1_500.0),
        50.0,
        123,
    )
    .unwrap();
    assert!(result.is_deterministic);
}

// ===========================================================================
// Feature pipeline
// ===========================================================================

#[test]
fn yaml_rules_to_feature_summary() {
    let dir = make_test_dir("features");
    fs::write(dir.join("rule.yml"), RULES).unwrap();

    let path = find_rule_file(&dir, "rule").unwrap().unwrap();
    let rules = load_rules(&path).unwrap();
    let config = RunConfig {
        seed: Some(5),
        ..RunConfig::default()
    };
    let params = config.feature_params().unwrap();
    let inputs = sample_features(1_500);

    let mut rng = SimRng::new(config.resolve_seed());
    let out = classify_features(&rules, &inputs, &params, &mut rng);
    let summary = FeatureSummary::from_attributes(&out);

    assert_eq!(summary.total, 1_500);
    assert!(summary.residential() > 0);
    assert_eq!(summary.by_household.values().sum::<u64>(), summary.residential());
    assert!(summary.total_households <= summary.total_residents);
    let units = summary.unit_size.unwrap();
    assert!(units.min >= 45.0 && units.max < 160.0);
    assert!(summary.to_string().contains("Total residents"));

    let check = validate_feature_determinism(&rules, &inputs, &params, 5).unwrap();
    assert!(check.is_deterministic);

    cleanup(&dir);
}

#[test]
fn occupancy_overrides_change_household_counts() {
    let rules = zonal_data::loader::parse_rules(RULES, zonal_data::Format::Yaml).unwrap();
    let inputs = sample_features(300);

    let default_params = RunConfig::default().feature_params().unwrap();
    let mut crowded = RunConfig::default();
    crowded.occupancy.two_parent = Some(8.0);
    crowded.occupancy.single_parent = Some(6.0);
    crowded.occupancy.single_person = Some(4.0);
    let crowded_params = crowded.feature_params().unwrap();

    let a = classify_features(&rules, &inputs, &default_params, &mut SimRng::new(2));
    let b = classify_features(&rules, &inputs, &crowded_params, &mut SimRng::new(2));

    // Same draws, so only household counts differ.
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.building_type, y.building_type);
        assert_eq!(x.resident_count, y.resident_count);
        assert!(y.household_count <= x.household_count);
    }
    let total = |v: &[zonal_core::feature::FeatureAttributes]| -> u32 {
        v.iter().map(|f| f.household_count).sum()
    };
    assert!(total(&b) < total(&a));
}

// ===========================================================================
// Failure paths
// ===========================================================================

#[test]
fn strict_run_rejects_incomplete_rules() {
    let partial = "zones:\n  - name: lonely\n    max_distance: 100\n";
    let rules = zonal_data::loader::parse_rules(partial, zonal_data::Format::Yaml).unwrap();
    assert!(check_coverage(&rules, Strictness::Strict).is_err());

    // The same rules still classify in permissive runs.
    assert!(check_coverage(&rules, Strictness::Permissive).is_ok());
    let attrs = classify_features(
        &rules,
        &sample_features(3),
        &FeatureParams::default(),
        &mut SimRng::new(1),
    );
    assert!(attrs.iter().all(|a| a.building_type == BuildingType::None));
}

#[test]
fn missing_rule_file_surfaces_before_validation() {
    let dir = make_test_dir("missing");
    let err = RunConfig::default().load_rules(&dir).unwrap_err();
    assert!(matches!(err, LoadError::Config(ConfigError::NotFound { .. })));
    cleanup(&dir);
}
