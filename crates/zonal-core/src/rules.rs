//! Validated zone and rule types, and the immutable [`RuleSet`].
//!
//! Every rule type checks its numeric invariants in its constructor, so a
//! value that exists is a value that is valid. A [`RuleSet`] can only be
//! produced by [`RuleSetBuilder`](crate::builder::RuleSetBuilder) and is
//! read-only afterwards.

use std::fmt;

use crate::builder::RuleSetBuilder;
use crate::records::RuleDocument;
use crate::resolver;

/// Lower bound accepted for a percentage triple sum.
pub const SUM_MIN: f64 = 0.99;
/// Upper bound accepted for a percentage triple sum.
pub const SUM_MAX: f64 = 1.01;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The kind of rule a record or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    Housing,
    Landuse,
    Household,
    Residents,
    UnitSize,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Housing,
        RuleKind::Landuse,
        RuleKind::Household,
        RuleKind::Residents,
        RuleKind::UnitSize,
    ];
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleKind::Housing => "housing",
            RuleKind::Landuse => "landuse",
            RuleKind::Household => "household",
            RuleKind::Residents => "residents",
            RuleKind::UnitSize => "unit size",
        })
    }
}

/// A rule record violates a numeric invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "{kind} percentages for zone '{zone}' must sum to 1.0 (±0.01), got {total:.3} from {values:?}"
    )]
    PercentageSum {
        kind: RuleKind,
        zone: String,
        values: [f64; 3],
        total: f64,
    },

    #[error("{kind} percentage for zone '{zone}' must be within [0.0, 1.0], got {value}")]
    PercentageBounds {
        kind: RuleKind,
        zone: String,
        value: f64,
    },

    #[error("unit size range for zone '{zone}' is inverted: min {min} > max {max}")]
    InvertedRange { zone: String, min: f64, max: f64 },

    #[error("zone '{zone}' uses label {label}, which is reserved for unknown cells")]
    ReservedZoneLabel { zone: String, label: i32 },

    #[error("{parameter} must be a positive finite number, got {value}")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("zones '{first}' and '{second}' share label {label}")]
    DuplicateZoneLabel {
        first: String,
        second: String,
        label: i32,
    },
}

impl ValidationError {
    /// Short, stable description of the failure category.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::PercentageSum { .. } => "percentage sum out of range",
            ValidationError::PercentageBounds { .. } => "percentage out of bounds",
            ValidationError::InvertedRange { .. } => "inverted range",
            ValidationError::NonPositive { .. } => "non-positive parameter",
            ValidationError::ReservedZoneLabel { .. } => "reserved zone label",
            ValidationError::DuplicateZoneLabel { .. } => "duplicate zone label",
        }
    }
}

fn check_sum(kind: RuleKind, zone: &str, values: [f64; 3]) -> Result<(), ValidationError> {
    if let Some(&value) = values.iter().find(|v| **v < 0.0) {
        return Err(ValidationError::PercentageBounds {
            kind,
            zone: zone.to_string(),
            value,
        });
    }
    let total: f64 = values.iter().sum();
    if (SUM_MIN..=SUM_MAX).contains(&total) {
        Ok(())
    } else {
        Err(ValidationError::PercentageSum {
            kind,
            zone: zone.to_string(),
            values,
            total,
        })
    }
}

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

/// A named distance band `[min_distance, max_distance)` in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    name: String,
    min_distance: f64,
    max_distance: f64,
    label: i32,
}

impl Zone {
    pub(crate) fn new(name: &str, min_distance: f64, max_distance: f64, label: i32) -> Self {
        Self {
            name: name.to_string(),
            min_distance,
            max_distance,
            label,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Code written into the zone-label grid for cells in this zone.
    pub fn label(&self) -> i32 {
        self.label
    }

    /// Half-open containment: `min <= distance < max`.
    pub fn contains(&self, distance: f64) -> bool {
        self.min_distance <= distance && distance < self.max_distance
    }

    /// True if no distance can fall inside this zone.
    pub fn is_empty(&self) -> bool {
        !(self.min_distance < self.max_distance)
    }

    /// True if the two intervals share at least one distance.
    pub fn overlaps(&self, other: &Zone) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_distance < other.max_distance
            && other.min_distance < self.max_distance
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zone('{}': {}-{}m)",
            self.name, self.min_distance, self.max_distance
        )
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Housing mix for residential units in a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct HousingRule {
    zone: String,
    apartment_pct: f64,
    detached_pct: f64,
    terraced_pct: f64,
}

impl HousingRule {
    pub fn new(
        zone: &str,
        apartment_pct: f64,
        detached_pct: f64,
        terraced_pct: f64,
    ) -> Result<Self, ValidationError> {
        check_sum(
            RuleKind::Housing,
            zone,
            [apartment_pct, detached_pct, terraced_pct],
        )?;
        Ok(Self {
            zone: zone.to_string(),
            apartment_pct,
            detached_pct,
            terraced_pct,
        })
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn apartment_pct(&self) -> f64 {
        self.apartment_pct
    }

    pub fn detached_pct(&self) -> f64 {
        self.detached_pct
    }

    pub fn terraced_pct(&self) -> f64 {
        self.terraced_pct
    }

    /// Weights in [`BuildingType::RESIDENTIAL`](crate::category::BuildingType::RESIDENTIAL) order.
    pub fn weights(&self) -> [f64; 3] {
        [self.apartment_pct, self.detached_pct, self.terraced_pct]
    }
}

impl fmt::Display for HousingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HousingRule('{}': {:.0}% apt, {:.0}% detached, {:.0}% terraced)",
            self.zone,
            self.apartment_pct * 100.0,
            self.detached_pct * 100.0,
            self.terraced_pct * 100.0
        )
    }
}

/// Share of units in a zone that are residential.
#[derive(Debug, Clone, PartialEq)]
pub struct LanduseRule {
    zone: String,
    residential_pct: f64,
}

impl LanduseRule {
    pub fn new(zone: &str, residential_pct: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&residential_pct) {
            return Err(ValidationError::PercentageBounds {
                kind: RuleKind::Landuse,
                zone: zone.to_string(),
                value: residential_pct,
            });
        }
        Ok(Self {
            zone: zone.to_string(),
            residential_pct,
        })
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn residential_pct(&self) -> f64 {
        self.residential_pct
    }
}

impl fmt::Display for LanduseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LanduseRule('{}': {:.0}% residential)",
            self.zone,
            self.residential_pct * 100.0
        )
    }
}

/// Household composition mix for residential features in a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdRule {
    zone: String,
    single_person_pct: f64,
    single_parent_pct: f64,
    two_parent_pct: f64,
}

impl HouseholdRule {
    pub fn new(
        zone: &str,
        single_person_pct: f64,
        single_parent_pct: f64,
        two_parent_pct: f64,
    ) -> Result<Self, ValidationError> {
        check_sum(
            RuleKind::Household,
            zone,
            [single_person_pct, single_parent_pct, two_parent_pct],
        )?;
        Ok(Self {
            zone: zone.to_string(),
            single_person_pct,
            single_parent_pct,
            two_parent_pct,
        })
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn single_person_pct(&self) -> f64 {
        self.single_person_pct
    }

    pub fn single_parent_pct(&self) -> f64 {
        self.single_parent_pct
    }

    pub fn two_parent_pct(&self) -> f64 {
        self.two_parent_pct
    }

    /// Weights in [`HouseholdType::ALL`](crate::category::HouseholdType::ALL) order.
    pub fn weights(&self) -> [f64; 3] {
        [
            self.single_person_pct,
            self.single_parent_pct,
            self.two_parent_pct,
        ]
    }
}

impl fmt::Display for HouseholdRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HouseholdRule('{}': {:.0}% single_person, {:.0}% single_parent, {:.0}% two_parent)",
            self.zone,
            self.single_person_pct * 100.0,
            self.single_parent_pct * 100.0,
            self.two_parent_pct * 100.0
        )
    }
}

/// Expected residents per nominal grid cell in a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentsRule {
    zone: String,
    residents_per_grid: f64,
}

impl ResidentsRule {
    pub fn new(zone: &str, residents_per_grid: f64) -> Self {
        Self {
            zone: zone.to_string(),
            residents_per_grid,
        }
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn residents_per_grid(&self) -> f64 {
        self.residents_per_grid
    }
}

/// Floor-area bounds (m²) for unit size sampling in a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSizeRule {
    zone: String,
    min_size: f64,
    max_size: f64,
}

impl UnitSizeRule {
    pub fn new(zone: &str, min_size: f64, max_size: f64) -> Result<Self, ValidationError> {
        if min_size > max_size {
            return Err(ValidationError::InvertedRange {
                zone: zone.to_string(),
                min: min_size,
                max: max_size,
            });
        }
        Ok(Self {
            zone: zone.to_string(),
            min_size,
            max_size,
        })
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    pub fn max_size(&self) -> f64 {
        self.max_size
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// The complete, validated collection of zones and rules for one run.
///
/// Lookups are linear scans returning the first match, which keeps
/// "first zone wins" and "first rule wins" semantics trivially exact.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub(crate) zones: Vec<Zone>,
    pub(crate) housing_rules: Vec<HousingRule>,
    pub(crate) landuse_rules: Vec<LanduseRule>,
    pub(crate) household_rules: Vec<HouseholdRule>,
    pub(crate) residents_rules: Vec<ResidentsRule>,
    pub(crate) unit_size_rules: Vec<UnitSizeRule>,
}

impl RuleSet {
    /// Start building a rule set programmatically.
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Validate a decoded rule document. Fails on the first invalid record.
    pub fn from_document(document: &RuleDocument) -> Result<Self, ValidationError> {
        let mut builder = RuleSetBuilder::new();
        builder.extend_from_document(document)?;
        builder.build()
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn housing_rules(&self) -> &[HousingRule] {
        &self.housing_rules
    }

    pub fn landuse_rules(&self) -> &[LanduseRule] {
        &self.landuse_rules
    }

    pub fn household_rules(&self) -> &[HouseholdRule] {
        &self.household_rules
    }

    pub fn residents_rules(&self) -> &[ResidentsRule] {
        &self.residents_rules
    }

    pub fn unit_size_rules(&self) -> &[UnitSizeRule] {
        &self.unit_size_rules
    }

    /// The zone containing `distance`, if any. See [`resolver::resolve`].
    pub fn zone_for(&self, distance: f64) -> Option<&Zone> {
        resolver::resolve(self, distance)
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn housing_rule(&self, zone: &str) -> Option<&HousingRule> {
        self.housing_rules.iter().find(|r| r.zone == zone)
    }

    pub fn landuse_rule(&self, zone: &str) -> Option<&LanduseRule> {
        self.landuse_rules.iter().find(|r| r.zone == zone)
    }

    pub fn household_rule(&self, zone: &str) -> Option<&HouseholdRule> {
        self.household_rules.iter().find(|r| r.zone == zone)
    }

    pub fn residents_rule(&self, zone: &str) -> Option<&ResidentsRule> {
        self.residents_rules.iter().find(|r| r.zone == zone)
    }

    pub fn unit_size_rule(&self, zone: &str) -> Option<&UnitSizeRule> {
        self.unit_size_rules.iter().find(|r| r.zone == zone)
    }

    /// Whether `zone` has a rule of the given kind.
    pub fn has_rule(&self, zone: &str, kind: RuleKind) -> bool {
        match kind {
            RuleKind::Housing => self.housing_rule(zone).is_some(),
            RuleKind::Landuse => self.landuse_rule(zone).is_some(),
            RuleKind::Household => self.household_rule(zone).is_some(),
            RuleKind::Residents => self.residents_rule(zone).is_some(),
            RuleKind::UnitSize => self.unit_size_rule(zone).is_some(),
        }
    }

    /// Zone names referenced by rules of the given kind, in stored order.
    pub fn rule_zones(&self, kind: RuleKind) -> Vec<&str> {
        match kind {
            RuleKind::Housing => self.housing_rules.iter().map(|r| r.zone()).collect(),
            RuleKind::Landuse => self.landuse_rules.iter().map(|r| r.zone()).collect(),
            RuleKind::Household => self.household_rules.iter().map(|r| r.zone()).collect(),
            RuleKind::Residents => self.residents_rules.iter().map(|r| r.zone()).collect(),
            RuleKind::UnitSize => self.unit_size_rules.iter().map(|r| r.zone()).collect(),
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RuleSet:")?;
        writeln!(f, "  Zones: {}", self.zones.len())?;
        for zone in &self.zones {
            writeln!(f, "    - {zone}")?;
        }
        writeln!(f, "  Housing Rules: {}", self.housing_rules.len())?;
        for rule in &self.housing_rules {
            writeln!(f, "    - {rule}")?;
        }
        writeln!(f, "  Landuse Rules: {}", self.landuse_rules.len())?;
        for rule in &self.landuse_rules {
            writeln!(f, "    - {rule}")?;
        }
        writeln!(f, "  Household Rules: {}", self.household_rules.len())?;
        for rule in &self.household_rules {
            writeln!(f, "    - {rule}")?;
        }
        writeln!(f, "  Residents Rules: {}", self.residents_rules.len())?;
        writeln!(f, "  Unit Size Rules: {}", self.unit_size_rules.len())
    }
}
