//! The first stage of the rule cascade, shared by grid and feature
//! classification: zone lookup, residential draw, building type draw.

use crate::category::BuildingType;
use crate::rng::SimRng;
use crate::rules::{RuleSet, Zone};

/// Result of running the building stage of the cascade for one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CascadeOutcome<'a> {
    /// No zone contains the unit's distance. No draws were made.
    OutsideZones,
    /// The zone lacks a housing or landuse rule. No draws were made.
    MissingRules(&'a Zone),
    /// The unit was classified; `building_type` is `None` for
    /// non-residential units.
    Classified {
        zone: &'a Zone,
        building_type: BuildingType,
    },
}

impl<'a> CascadeOutcome<'a> {
    pub fn zone(&self) -> Option<&'a Zone> {
        match *self {
            CascadeOutcome::OutsideZones => None,
            CascadeOutcome::MissingRules(zone) => Some(zone),
            CascadeOutcome::Classified { zone, .. } => Some(zone),
        }
    }

    pub fn building_type(&self) -> BuildingType {
        match *self {
            CascadeOutcome::Classified { building_type, .. } => building_type,
            _ => BuildingType::None,
        }
    }
}

/// Resolve the zone for `distance` and draw the building type.
///
/// Draw discipline: one uniform draw decides residential vs not; a
/// residential unit then takes one categorical draw over the housing mix.
pub fn classify_building<'a>(
    rules: &'a RuleSet,
    distance: f64,
    rng: &mut SimRng,
) -> CascadeOutcome<'a> {
    let Some(zone) = rules.zone_for(distance) else {
        return CascadeOutcome::OutsideZones;
    };
    let (Some(housing), Some(landuse)) = (
        rules.housing_rule(zone.name()),
        rules.landuse_rule(zone.name()),
    ) else {
        return CascadeOutcome::MissingRules(zone);
    };

    let building_type = if rng.chance(landuse.residential_pct()) {
        rng.weighted_index(&housing.weights())
            .map(|i| BuildingType::RESIDENTIAL[i])
            .unwrap_or(BuildingType::None)
    } else {
        BuildingType::None
    };

    CascadeOutcome::Classified {
        zone,
        building_type,
    }
}
