//! Rule coverage checks.
//!
//! Classification silently skips units whose zone lacks a rule. The
//! coverage report surfaces those gaps, together with other rule-data
//! smells, without changing classification behaviour.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rules::{RuleKind, RuleSet};

// ---------------------------------------------------------------------------
// Gaps
// ---------------------------------------------------------------------------

/// One coverage problem found in a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageGap {
    /// Zone at `index` has an empty name.
    EmptyZoneName { index: usize },
    /// Zone interval admits no distance (`min >= max`).
    EmptyInterval { zone: String },
    /// `later` shares distances with `earlier`; first match wins, so part
    /// of `later` is unreachable.
    OverlappingZones { earlier: String, later: String },
    /// Zone has no rule of this kind.
    MissingRule { zone: String, kind: RuleKind },
    /// A rule references a zone name no zone defines.
    OrphanRule { zone: String, kind: RuleKind },
}

impl fmt::Display for CoverageGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageGap::EmptyZoneName { index } => write!(f, "zone #{index} has an empty name"),
            CoverageGap::EmptyInterval { zone } => {
                write!(f, "zone '{zone}' has an empty distance interval")
            }
            CoverageGap::OverlappingZones { earlier, later } => {
                write!(f, "zone '{later}' overlaps earlier zone '{earlier}'")
            }
            CoverageGap::MissingRule { zone, kind } => {
                write!(f, "zone '{zone}' has no {kind} rule")
            }
            CoverageGap::OrphanRule { zone, kind } => {
                write!(f, "{kind} rule references undefined zone '{zone}'")
            }
        }
    }
}

/// All gaps found in a rule set, in a stable order: zone-level smells in
/// zone order, then missing rules per zone, then orphan rules per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    pub gaps: Vec<CoverageGap>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Rule kinds missing for `zone`.
    pub fn missing_for(&self, zone: &str) -> Vec<RuleKind> {
        self.gaps
            .iter()
            .filter_map(|g| match g {
                CoverageGap::MissingRule { zone: z, kind } if z == zone => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

impl RuleSet {
    /// Inspect the rule set for coverage gaps.
    pub fn coverage_report(&self) -> CoverageReport {
        let mut gaps = Vec::new();
        let zones = self.zones();

        for (i, zone) in zones.iter().enumerate() {
            if zone.name().is_empty() {
                gaps.push(CoverageGap::EmptyZoneName { index: i });
            }
            if zone.is_empty() {
                gaps.push(CoverageGap::EmptyInterval {
                    zone: zone.name().to_string(),
                });
            }
            for earlier in &zones[..i] {
                if earlier.overlaps(zone) {
                    gaps.push(CoverageGap::OverlappingZones {
                        earlier: earlier.name().to_string(),
                        later: zone.name().to_string(),
                    });
                }
            }
        }

        for zone in zones {
            for kind in RuleKind::ALL {
                if !self.has_rule(zone.name(), kind) {
                    gaps.push(CoverageGap::MissingRule {
                        zone: zone.name().to_string(),
                        kind,
                    });
                }
            }
        }

        let defined: BTreeSet<&str> = zones.iter().map(|z| z.name()).collect();
        for kind in RuleKind::ALL {
            let mut reported = BTreeSet::new();
            for name in self.rule_zones(kind) {
                if !defined.contains(name) && reported.insert(name) {
                    gaps.push(CoverageGap::OrphanRule {
                        zone: name.to_string(),
                        kind,
                    });
                }
            }
        }

        CoverageReport { gaps }
    }
}

// ---------------------------------------------------------------------------
// Strictness
// ---------------------------------------------------------------------------

/// How coverage gaps are treated by [`check_coverage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Gaps are logged as warnings.
    #[default]
    Permissive,
    /// Any gap is an error.
    Strict,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoverageError {
    #[error("rule set has {} coverage gap(s)", .gaps.len())]
    Incomplete { gaps: Vec<CoverageGap> },
}

/// Check rule coverage under the given strictness.
pub fn check_coverage(
    rules: &RuleSet,
    strictness: Strictness,
) -> Result<CoverageReport, CoverageError> {
    let report = rules.coverage_report();
    if report.is_complete() {
        return Ok(report);
    }
    match strictness {
        Strictness::Permissive => {
            for gap in &report.gaps {
                tracing::warn!(%gap, "rule coverage gap");
            }
            Ok(report)
        }
        Strictness::Strict => Err(CoverageError::Incomplete { gaps: report.gaps }),
    }
}
