//! Zonal Core -- a stochastic, distance-zoned rule engine for assigning
//! building, household and population attributes to spatial units.
//!
//! Each unit (a raster cell or a building footprint) is placed in a
//! concentric distance zone around a reference center, then passed through
//! a rule cascade whose outcomes are drawn from a seeded random stream.
//!
//! # Rule Cascade
//!
//! 1. **Zone** -- first zone whose `[min, max)` interval contains the
//!    unit's distance; none means the unit is skipped.
//! 2. **Land use** -- one uniform draw against `residential_pct`.
//! 3. **Building type** -- one categorical draw over the housing mix.
//! 4. **Household type** -- features only; categorical draw.
//! 5. **Residents** -- features only; density scaled by footprint area.
//! 6. **Unit size** -- features only; uniform draw in `[min, max)`.
//!
//! A zone without a housing or landuse rule classifies its units as
//! "none" without consuming draws. [`coverage`] reports such gaps.
//!
//! # Determinism
//!
//! The random stream is an explicit [`rng::SimRng`] passed by `&mut`. The
//! same rules, inputs and seed always produce byte-identical outputs;
//! [`determinism`] verifies this via fingerprints of the `bitcode`
//! encoding.
//!
//! # Key Types
//!
//! - [`rules::RuleSet`] -- Immutable, validated zones and rules, built via
//!   [`builder::RuleSetBuilder`].
//! - [`grid::classify_template`] -- Raster classification with statistics.
//! - [`feature::classify_feature`] -- Per-feature attribute assignment.
//! - [`occupancy::OccupancyTable`] -- Household-size policy.

pub mod builder;
pub mod cascade;
pub mod category;
pub mod coverage;
pub mod determinism;
pub mod feature;
pub mod grid;
pub mod occupancy;
pub mod records;
pub mod resolver;
pub mod rng;
pub mod rules;
pub mod stats;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
