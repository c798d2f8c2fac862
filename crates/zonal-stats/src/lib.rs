//! Distribution reports for zonal classification runs.
//!
//! [`GridReport`] compares the shares observed in a raster run against the
//! configured rule percentages. [`FeatureSummary`] aggregates per-feature
//! attributes into counts, unit size ranges and household totals.
//!
//! # Usage
//!
//! ```ignore
//! let out = classify_template(&rules, buildings, &marker, 100.0, &mut rng)?;
//! let report = GridReport::compare(&rules, &out.stats);
//! println!("{report}");
//! assert!(report.max_deviation() < 0.05);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use zonal_core::category::{BuildingType, HouseholdType};
use zonal_core::feature::FeatureAttributes;
use zonal_core::rules::RuleSet;
use zonal_core::stats::ClassificationStats;

fn share(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

// ---------------------------------------------------------------------------
// Grid report
// ---------------------------------------------------------------------------

/// Observed vs configured share of one building type within a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    pub building_type: BuildingType,
    pub count: u64,
    /// Share of the zone's residential cells.
    pub observed: f64,
    /// Housing rule percentage, if the zone has one.
    pub expected: Option<f64>,
}

/// Per-zone comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneReport {
    pub zone: String,
    /// Classified cells in the zone.
    pub cells: u64,
    pub residential_cells: u64,
    pub observed_residential: f64,
    /// Landuse rule percentage, if the zone has one.
    pub expected_residential: Option<f64>,
    pub types: Vec<TypeShare>,
}

impl ZoneReport {
    /// Largest absolute gap between an observed and a configured share.
    /// Shares with no configured value, or no cells to observe, are ignored.
    pub fn max_deviation(&self) -> f64 {
        let mut max: f64 = 0.0;
        if self.cells > 0
            && let Some(expected) = self.expected_residential
        {
            max = max.max((self.observed_residential - expected).abs());
        }
        if self.residential_cells > 0 {
            for t in &self.types {
                if let Some(expected) = t.expected {
                    max = max.max((t.observed - expected).abs());
                }
            }
        }
        max
    }
}

/// Raster run report: one [`ZoneReport`] per zone, in zone order, plus
/// run-wide totals over classified cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridReport {
    pub zones: Vec<ZoneReport>,
    pub total_cells: u64,
    pub classified_cells: u64,
    pub residential_cells: u64,
    pub non_residential_cells: u64,
}

impl GridReport {
    pub fn compare(rules: &RuleSet, stats: &ClassificationStats) -> Self {
        let zones = rules
            .zones()
            .iter()
            .map(|zone| {
                let name = zone.name();
                let cells = stats.zone_count(name);
                let residential_cells = stats.residential_units_in_zone(name);
                let housing = rules.housing_rule(name).map(|r| r.weights());

                let types = BuildingType::RESIDENTIAL
                    .iter()
                    .enumerate()
                    .map(|(i, &ty)| {
                        let count = stats.zone_type_count(name, ty);
                        TypeShare {
                            building_type: ty,
                            count,
                            observed: share(count, residential_cells),
                            expected: housing.map(|w| w[i]),
                        }
                    })
                    .collect();

                ZoneReport {
                    zone: name.to_string(),
                    cells,
                    residential_cells,
                    observed_residential: share(residential_cells, cells),
                    expected_residential: rules.landuse_rule(name).map(|r| r.residential_pct()),
                    types,
                }
            })
            .collect();

        let classified_cells = stats.classified_units();
        let residential_cells = stats.residential_units();
        Self {
            zones,
            total_cells: stats.total_units,
            classified_cells,
            residential_cells,
            non_residential_cells: classified_cells.saturating_sub(residential_cells),
        }
    }

    pub fn zone(&self, name: &str) -> Option<&ZoneReport> {
        self.zones.iter().find(|z| z.zone == name)
    }

    pub fn residential_share(&self) -> f64 {
        share(self.residential_cells, self.classified_cells)
    }

    pub fn non_residential_share(&self) -> f64 {
        share(self.non_residential_cells, self.classified_cells)
    }

    /// Largest deviation across all zones.
    pub fn max_deviation(&self) -> f64 {
        self.zones
            .iter()
            .map(ZoneReport::max_deviation)
            .fold(0.0, f64::max)
    }
}

fn fmt_expected(expected: Option<f64>) -> String {
    expected.map_or_else(|| "-".to_string(), |e| format!("{:.1}%", e * 100.0))
}

impl fmt::Display for GridReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Cells: {} total, {} classified ({} residential, {:.1}%; {} non-residential, {:.1}%)",
            self.total_cells,
            self.classified_cells,
            self.residential_cells,
            self.residential_share() * 100.0,
            self.non_residential_cells,
            self.non_residential_share() * 100.0
        )?;
        for zone in &self.zones {
            writeln!(
                f,
                "  {:15}: {:6} cells, residential {:5.1}% (expected {})",
                zone.zone,
                zone.cells,
                zone.observed_residential * 100.0,
                fmt_expected(zone.expected_residential)
            )?;
            for t in &zone.types {
                writeln!(
                    f,
                    "    {:13}: {:6} ({:5.1}%, expected {})",
                    t.building_type.as_str(),
                    t.count,
                    t.observed * 100.0,
                    fmt_expected(t.expected)
                )?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Feature summary
// ---------------------------------------------------------------------------

/// Minimum, mean and maximum of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl Range {
    /// `None` for an empty sample.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut n = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            n += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        (n > 0).then(|| Range {
            min,
            mean: sum / n as f64,
            max,
        })
    }
}

/// Aggregates over a batch of classified features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub total: u64,
    /// Features with no zone are counted in `outside_zones` only.
    pub by_zone: BTreeMap<String, u64>,
    pub outside_zones: u64,
    pub by_type: BTreeMap<BuildingType, u64>,
    pub by_household: BTreeMap<HouseholdType, u64>,
    /// Over features with a sampled unit size.
    pub unit_size: Option<Range>,
    pub total_households: u64,
    pub total_residents: u64,
    /// Residents per household, over features with households.
    pub household_size: Option<Range>,
}

impl FeatureSummary {
    pub fn from_attributes(features: &[FeatureAttributes]) -> Self {
        let mut summary = FeatureSummary {
            total: features.len() as u64,
            ..Default::default()
        };

        for f in features {
            match &f.zone {
                Some(zone) => *summary.by_zone.entry(zone.clone()).or_insert(0) += 1,
                None => summary.outside_zones += 1,
            }
            *summary.by_type.entry(f.building_type).or_insert(0) += 1;
            if let Some(h) = f.household_type {
                *summary.by_household.entry(h).or_insert(0) += 1;
            }
            summary.total_households += f.household_count as u64;
            summary.total_residents += f.resident_count as u64;
        }

        summary.unit_size = Range::of(
            features
                .iter()
                .filter(|f| f.unit_size > 0.0)
                .map(|f| f.unit_size),
        );
        summary.household_size = Range::of(
            features
                .iter()
                .filter(|f| f.household_count > 0)
                .map(|f| f.resident_count as f64 / f.household_count as f64),
        );
        summary
    }

    pub fn type_count(&self, building_type: BuildingType) -> u64 {
        self.by_type.get(&building_type).copied().unwrap_or(0)
    }

    pub fn residential(&self) -> u64 {
        BuildingType::RESIDENTIAL
            .iter()
            .map(|t| self.type_count(*t))
            .sum()
    }
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |count: u64| share(count, self.total) * 100.0;

        writeln!(f, "Total buildings: {}", self.total)?;
        writeln!(f, "By zone:")?;
        for (zone, count) in &self.by_zone {
            writeln!(f, "  {zone:15}: {count:5} ({:5.1}%)", pct(*count))?;
        }
        if self.outside_zones > 0 {
            writeln!(
                f,
                "  {:15}: {:5} ({:5.1}%)",
                "(outside)",
                self.outside_zones,
                pct(self.outside_zones)
            )?;
        }
        writeln!(f, "By type:")?;
        for (ty, count) in &self.by_type {
            writeln!(f, "  {:15}: {count:5} ({:5.1}%)", ty.as_str(), pct(*count))?;
        }
        writeln!(f, "By household type:")?;
        for (h, count) in &self.by_household {
            writeln!(f, "  {:15}: {count:5} ({:5.1}%)", h.as_str(), pct(*count))?;
        }
        if let Some(r) = self.unit_size {
            writeln!(
                f,
                "Unit size: mean {:.1} m², min {:.1} m², max {:.1} m²",
                r.mean, r.min, r.max
            )?;
        }
        writeln!(f, "Total households: {}", self.total_households)?;
        writeln!(f, "Total residents: {}", self.total_residents)?;
        if let Some(r) = self.household_size {
            writeln!(
                f,
                "Household size: mean {:.1}, min {:.0}, max {:.0} residents",
                r.mean, r.min, r.max
            )?;
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
