//! Per-run settings: seed, raster geometry, strictness and occupancy.
//!
//! A run config is read from the same formats as rule documents. Every
//! field is optional; missing fields take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use zonal_core::coverage::Strictness;
use zonal_core::feature::{DEFAULT_CELL_AREA, FeatureParams};
use zonal_core::occupancy::OccupancyTable;
use zonal_core::rules::{RuleSet, ValidationError};

use crate::loader::{ConfigError, LoadError, deserialize_file, find_rule_file, load_rules};

/// Base name searched for when no rule file is configured.
pub const DEFAULT_RULE_BASE_NAME: &str = "rule";

/// Raster cell edge length in meters.
pub const DEFAULT_CELL_SIZE: f64 = 100.0;

/// Optional per-type overrides of the default occupancy table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancyOverrides {
    pub single_person: Option<f64>,
    pub single_parent: Option<f64>,
    pub two_parent: Option<f64>,
}

impl OccupancyOverrides {
    pub fn apply(&self, base: &OccupancyTable) -> Result<OccupancyTable, ValidationError> {
        use zonal_core::category::HouseholdType::*;
        OccupancyTable::new(
            self.single_person
                .unwrap_or(base.persons_per_household(SinglePerson)),
            self.single_parent
                .unwrap_or(base.persons_per_household(SingleParent)),
            self.two_parent
                .unwrap_or(base.persons_per_household(TwoParent)),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Rule file, relative to the config's directory. Discovered by
    /// [`DEFAULT_RULE_BASE_NAME`] when unset.
    pub rule_file: Option<PathBuf>,
    /// Stream seed. Generated (and logged) when unset.
    pub seed: Option<u64>,
    pub cell_size: f64,
    /// Area that `residents_per_grid` densities refer to, in m².
    pub cell_area_reference: f64,
    pub strictness: Strictness,
    pub occupancy: OccupancyOverrides,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rule_file: None,
            seed: None,
            cell_size: DEFAULT_CELL_SIZE,
            cell_area_reference: DEFAULT_CELL_AREA,
            strictness: Strictness::default(),
            occupancy: OccupancyOverrides::default(),
        }
    }
}

impl RunConfig {
    /// Read a run config from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: RunConfig = deserialize_file(path)?;
        tracing::info!(path = %path.display(), "run config loaded");
        Ok(config)
    }

    /// The configured seed, or a freshly generated one.
    ///
    /// A generated seed is logged so the run can be reproduced by setting
    /// it explicitly.
    pub fn resolve_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => {
                tracing::info!(seed, "using configured seed");
                seed
            }
            None => {
                let seed: u64 = rand::random();
                tracing::warn!(seed, "no seed configured; generated one");
                seed
            }
        }
    }

    /// Validated cell size in meters.
    pub fn cell_size(&self) -> Result<f64, ValidationError> {
        if self.cell_size.is_finite() && self.cell_size > 0.0 {
            Ok(self.cell_size)
        } else {
            Err(ValidationError::NonPositive {
                parameter: "cell size",
                value: self.cell_size,
            })
        }
    }

    /// Feature parameters with occupancy overrides applied.
    pub fn feature_params(&self) -> Result<FeatureParams, ValidationError> {
        let occupancy = self.occupancy.apply(&OccupancyTable::default())?;
        FeatureParams::new(self.cell_area_reference, occupancy)
    }

    /// Locate the rule file relative to `base_dir`.
    pub fn rule_path(&self, base_dir: &Path) -> Result<PathBuf, ConfigError> {
        match &self.rule_file {
            Some(file) => Ok(base_dir.join(file)),
            None => find_rule_file(base_dir, DEFAULT_RULE_BASE_NAME)?.ok_or_else(|| {
                ConfigError::NotFound {
                    path: base_dir.join(DEFAULT_RULE_BASE_NAME),
                }
            }),
        }
    }

    /// Locate, decode and validate the run's rule set.
    pub fn load_rules(&self, base_dir: &Path) -> Result<RuleSet, LoadError> {
        let path = self.rule_path(base_dir)?;
        load_rules(&path)
    }
}
