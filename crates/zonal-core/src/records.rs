//! Raw rule records as decoded from a rule document.
//!
//! These mirror the on-disk key names one to one. Every field is optional
//! in the source: missing numbers decode as `0.0` and a missing zone name
//! as the empty string. Nothing here is validated; [`RuleSet::from_document`]
//! turns a [`RuleDocument`] into a checked rule set.
//!
//! [`RuleSet::from_document`]: crate::rules::RuleSet::from_document

use serde::{Deserialize, Serialize};

/// Top-level rule document. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDocument {
    pub zones: Vec<ZoneRecord>,
    pub housing_rules: Vec<HousingRecord>,
    pub landuse_rules: Vec<LanduseRecord>,
    pub household_rules: Vec<HouseholdRecord>,
    pub residents_rules: Vec<ResidentsRecord>,
    pub unit_size_rules: Vec<UnitSizeRecord>,
}

impl RuleDocument {
    /// Total number of records across all sections.
    pub fn record_count(&self) -> usize {
        self.zones.len()
            + self.housing_rules.len()
            + self.landuse_rules.len()
            + self.household_rules.len()
            + self.residents_rules.len()
            + self.unit_size_rules.len()
    }
}

/// A distance band. `id` overrides the zone-grid label, which otherwise
/// is the zone's position in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneRecord {
    pub name: String,
    pub min_distance: f64,
    pub max_distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousingRecord {
    pub zone: String,
    pub apartment_pct: f64,
    pub detached_pct: f64,
    pub terraced_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanduseRecord {
    pub zone: String,
    pub residential_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdRecord {
    pub zone: String,
    pub single_person_pct: f64,
    pub single_parent_pct: f64,
    pub two_parent_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidentsRecord {
    pub zone: String,
    pub residents_per_grid: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSizeRecord {
    pub zone: String,
    pub min_size: f64,
    pub max_size: f64,
}
