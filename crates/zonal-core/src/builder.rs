use std::collections::HashMap;

use crate::category::UNKNOWN_ZONE_LABEL;
use crate::records::RuleDocument;
use crate::rules::*;

/// Builder for constructing an immutable [`RuleSet`].
///
/// Every `add_*` call validates its record immediately, so the first bad
/// record aborts construction. `build()` then checks the zone labels as a
/// whole and freezes the set.
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    zones: Vec<Zone>,
    housing_rules: Vec<HousingRule>,
    landuse_rules: Vec<LanduseRule>,
    household_rules: Vec<HouseholdRule>,
    residents_rules: Vec<ResidentsRule>,
    unit_size_rules: Vec<UnitSizeRule>,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone labelled by its position. Positions from 99 on are
    /// shifted up by one so the unknown-cell label is never assigned.
    pub fn add_zone(&mut self, name: &str, min_distance: f64, max_distance: f64) -> &mut Self {
        let position = self.zones.len() as i32;
        let label = if position >= UNKNOWN_ZONE_LABEL {
            position + 1
        } else {
            position
        };
        self.zones
            .push(Zone::new(name, min_distance, max_distance, label));
        self
    }

    /// Add a zone with an explicit zone-grid label.
    pub fn add_zone_with_label(
        &mut self,
        name: &str,
        min_distance: f64,
        max_distance: f64,
        label: i32,
    ) -> &mut Self {
        self.zones
            .push(Zone::new(name, min_distance, max_distance, label));
        self
    }

    pub fn add_housing_rule(
        &mut self,
        zone: &str,
        apartment_pct: f64,
        detached_pct: f64,
        terraced_pct: f64,
    ) -> Result<&mut Self, ValidationError> {
        let rule = HousingRule::new(zone, apartment_pct, detached_pct, terraced_pct)?;
        self.housing_rules.push(rule);
        Ok(self)
    }

    pub fn add_landuse_rule(
        &mut self,
        zone: &str,
        residential_pct: f64,
    ) -> Result<&mut Self, ValidationError> {
        let rule = LanduseRule::new(zone, residential_pct)?;
        self.landuse_rules.push(rule);
        Ok(self)
    }

    pub fn add_household_rule(
        &mut self,
        zone: &str,
        single_person_pct: f64,
        single_parent_pct: f64,
        two_parent_pct: f64,
    ) -> Result<&mut Self, ValidationError> {
        let rule = HouseholdRule::new(zone, single_person_pct, single_parent_pct, two_parent_pct)?;
        self.household_rules.push(rule);
        Ok(self)
    }

    pub fn add_residents_rule(&mut self, zone: &str, residents_per_grid: f64) -> &mut Self {
        self.residents_rules
            .push(ResidentsRule::new(zone, residents_per_grid));
        self
    }

    pub fn add_unit_size_rule(
        &mut self,
        zone: &str,
        min_size: f64,
        max_size: f64,
    ) -> Result<&mut Self, ValidationError> {
        let rule = UnitSizeRule::new(zone, min_size, max_size)?;
        self.unit_size_rules.push(rule);
        Ok(self)
    }

    /// Add every record of a decoded document, section by section in
    /// document order.
    pub fn extend_from_document(
        &mut self,
        document: &RuleDocument,
    ) -> Result<&mut Self, ValidationError> {
        for zone in &document.zones {
            match zone.id {
                Some(label) => {
                    self.add_zone_with_label(
                        &zone.name,
                        zone.min_distance,
                        zone.max_distance,
                        label,
                    );
                }
                None => {
                    self.add_zone(&zone.name, zone.min_distance, zone.max_distance);
                }
            }
        }
        for r in &document.housing_rules {
            self.add_housing_rule(&r.zone, r.apartment_pct, r.detached_pct, r.terraced_pct)?;
        }
        for r in &document.landuse_rules {
            self.add_landuse_rule(&r.zone, r.residential_pct)?;
        }
        for r in &document.household_rules {
            self.add_household_rule(
                &r.zone,
                r.single_person_pct,
                r.single_parent_pct,
                r.two_parent_pct,
            )?;
        }
        for r in &document.residents_rules {
            self.add_residents_rule(&r.zone, r.residents_per_grid);
        }
        for r in &document.unit_size_rules {
            self.add_unit_size_rule(&r.zone, r.min_size, r.max_size)?;
        }
        Ok(self)
    }

    /// Finalize and build the immutable rule set.
    pub fn build(self) -> Result<RuleSet, ValidationError> {
        // Validate: zone labels must be unique and must not collide with
        // the unknown-cell sentinel.
        let mut seen: HashMap<i32, &str> = HashMap::new();
        for zone in &self.zones {
            if zone.label() == UNKNOWN_ZONE_LABEL {
                return Err(ValidationError::ReservedZoneLabel {
                    zone: zone.name().to_string(),
                    label: zone.label(),
                });
            }
            if let Some(first) = seen.insert(zone.label(), zone.name()) {
                return Err(ValidationError::DuplicateZoneLabel {
                    first: first.to_string(),
                    second: zone.name().to_string(),
                    label: zone.label(),
                });
            }
        }

        let rules = RuleSet {
            zones: self.zones,
            housing_rules: self.housing_rules,
            landuse_rules: self.landuse_rules,
            household_rules: self.household_rules,
            residents_rules: self.residents_rules,
            unit_size_rules: self.unit_size_rules,
        };

        tracing::info!(
            zones = rules.zones.len(),
            housing = rules.housing_rules.len(),
            landuse = rules.landuse_rules.len(),
            household = rules.household_rules.len(),
            residents = rules.residents_rules.len(),
            unit_size = rules.unit_size_rules.len(),
            "rule set built"
        );
        Ok(rules)
    }
}
