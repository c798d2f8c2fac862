//! Categorical outcomes of the rule cascade and their raster codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Building-class code written for non-residential or unclassified cells.
pub const NONE_CLASS: i32 = 99;

/// Zone-label code written for cells outside every zone.
pub const UNKNOWN_ZONE_LABEL: i32 = 99;

/// Building type assigned to a spatial unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Apartment,
    Detached,
    Terraced,
    /// Non-residential, or no applicable rule.
    None,
}

impl BuildingType {
    /// Residential types in the order their weights appear in a housing rule.
    pub const RESIDENTIAL: [BuildingType; 3] = [
        BuildingType::Apartment,
        BuildingType::Detached,
        BuildingType::Terraced,
    ];

    /// Raster building-class code.
    pub fn class_code(self) -> i32 {
        match self {
            BuildingType::Apartment => 14,
            BuildingType::Detached => 17,
            BuildingType::Terraced => 22,
            BuildingType::None => NONE_CLASS,
        }
    }

    /// Inverse of [`class_code`](Self::class_code). Unknown codes map to `None`.
    pub fn from_class_code(code: i32) -> Option<Self> {
        match code {
            14 => Some(BuildingType::Apartment),
            17 => Some(BuildingType::Detached),
            22 => Some(BuildingType::Terraced),
            NONE_CLASS => Some(BuildingType::None),
            _ => None,
        }
    }

    pub fn is_residential(self) -> bool {
        self != BuildingType::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildingType::Apartment => "apartment",
            BuildingType::Detached => "detached",
            BuildingType::Terraced => "terraced",
            BuildingType::None => "none",
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Household composition sampled for a residential feature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HouseholdType {
    SinglePerson,
    SingleParent,
    TwoParent,
}

impl HouseholdType {
    /// Household types in the order their weights appear in a household rule.
    pub const ALL: [HouseholdType; 3] = [
        HouseholdType::SinglePerson,
        HouseholdType::SingleParent,
        HouseholdType::TwoParent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HouseholdType::SinglePerson => "single_person",
            HouseholdType::SingleParent => "single_parent",
            HouseholdType::TwoParent => "two_parent",
        }
    }
}

impl fmt::Display for HouseholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
