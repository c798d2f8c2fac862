//! Household occupancy policy.
//!
//! Maps a feature's resident count and sampled household type to a
//! household count. The defaults are typical persons-per-household figures
//! and can be overridden per run.

use serde::{Deserialize, Deserializer, Serialize};

use crate::category::HouseholdType;
use crate::rules::ValidationError;

/// Persons per household, by household type.
///
/// Decoding goes through [`OccupancyTable::new`], so a decoded table is
/// always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OccupancyTable {
    single_person: f64,
    single_parent: f64,
    two_parent: f64,
}

impl Default for OccupancyTable {
    fn default() -> Self {
        Self {
            single_person: 1.0,
            single_parent: 2.5,
            two_parent: 3.8,
        }
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositive { parameter, value })
    }
}

#[derive(Deserialize)]
struct OccupancyRecord {
    single_person: f64,
    single_parent: f64,
    two_parent: f64,
}

impl<'de> Deserialize<'de> for OccupancyTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = OccupancyRecord::deserialize(deserializer)?;
        Self::new(raw.single_person, raw.single_parent, raw.two_parent)
            .map_err(serde::de::Error::custom)
    }
}

impl OccupancyTable {
    pub fn new(
        single_person: f64,
        single_parent: f64,
        two_parent: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            single_person: check_positive("single_person occupancy", single_person)?,
            single_parent: check_positive("single_parent occupancy", single_parent)?,
            two_parent: check_positive("two_parent occupancy", two_parent)?,
        })
    }

    pub fn persons_per_household(&self, household: HouseholdType) -> f64 {
        match household {
            HouseholdType::SinglePerson => self.single_person,
            HouseholdType::SingleParent => self.single_parent,
            HouseholdType::TwoParent => self.two_parent,
        }
    }

    /// `max(1, round(residents / persons_per_household))`, or 0 when there
    /// are no residents.
    pub fn household_count(&self, residents: u32, household: HouseholdType) -> u32 {
        if residents == 0 {
            return 0;
        }
        let households = (residents as f64 / self.persons_per_household(household)).round();
        (households as u32).max(1)
    }
}
