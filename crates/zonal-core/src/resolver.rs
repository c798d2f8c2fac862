//! Distance-to-zone resolution.

use crate::rules::{RuleSet, Zone};

/// Return the first zone, in stored order, whose `[min, max)` interval
/// contains `distance`.
///
/// `None` is a normal outcome: the distance lies outside the modelled
/// area (beyond the last zone, below the first, or NaN).
pub fn resolve(rules: &RuleSet, distance: f64) -> Option<&Zone> {
    rules.zones().iter().find(|zone| zone.contains(distance))
}

/// Euclidean distance between two points in meters.
pub fn distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    let dx = from.0 - to.0;
    let dy = from.1 - to.1;
    (dx * dx + dy * dy).sqrt()
}
