//! Per-run count accumulators for grid classification.
//!
//! Ordered maps keep iteration (and therefore the encoded bytes) identical
//! between runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::BuildingType;

/// Counts of classified units by zone, by building type, and by both.
///
/// Units outside every zone, or in a zone lacking a housing or landuse
/// rule, are never recorded here. `total_units` still counts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub total_units: u64,
    pub by_zone: BTreeMap<String, u64>,
    pub by_type: BTreeMap<BuildingType, u64>,
    pub by_zone_and_type: BTreeMap<String, BTreeMap<BuildingType, u64>>,
}

impl ClassificationStats {
    pub fn new(total_units: u64) -> Self {
        Self {
            total_units,
            ..Default::default()
        }
    }

    /// Record one classified unit in all three accumulators.
    pub fn record(&mut self, zone: &str, building_type: BuildingType) {
        *self.by_zone.entry(zone.to_string()).or_insert(0) += 1;
        *self.by_type.entry(building_type).or_insert(0) += 1;
        *self
            .by_zone_and_type
            .entry(zone.to_string())
            .or_default()
            .entry(building_type)
            .or_insert(0) += 1;
    }

    pub fn zone_count(&self, zone: &str) -> u64 {
        self.by_zone.get(zone).copied().unwrap_or(0)
    }

    pub fn type_count(&self, building_type: BuildingType) -> u64 {
        self.by_type.get(&building_type).copied().unwrap_or(0)
    }

    pub fn zone_type_count(&self, zone: &str, building_type: BuildingType) -> u64 {
        self.by_zone_and_type
            .get(zone)
            .and_then(|types| types.get(&building_type))
            .copied()
            .unwrap_or(0)
    }

    /// Units that made it into the accumulators.
    pub fn classified_units(&self) -> u64 {
        self.by_zone.values().sum()
    }

    pub fn residential_units(&self) -> u64 {
        BuildingType::RESIDENTIAL
            .iter()
            .map(|t| self.type_count(*t))
            .sum()
    }

    pub fn residential_units_in_zone(&self, zone: &str) -> u64 {
        BuildingType::RESIDENTIAL
            .iter()
            .map(|t| self.zone_type_count(zone, *t))
            .sum()
    }
}
