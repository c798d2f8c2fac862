//! Output fingerprints and determinism validation.
//!
//! A classification run is a pure function of the rule set, the spatial
//! input and the seed. These helpers run a classification twice and
//! compare the canonical `bitcode` encodings of both outputs.

use serde::Serialize;

use crate::feature::{FeatureAttributes, FeatureInput, FeatureParams, classify_features};
use crate::grid::{CenterPosition, Grid, GridClassification, classify_grid};
use crate::rng::SimRng;
use crate::rules::RuleSet;

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// FNV-1a 64 hash of an output's canonical encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut h = Self::FNV_OFFSET;
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(Self::FNV_PRIME);
        }
        Self(h)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeterminismError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Canonical byte encoding of a classification output.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, DeterminismError> {
    bitcode::serialize(value).map_err(|e| DeterminismError::Encode(e.to_string()))
}

pub fn fingerprint<T: Serialize>(value: &T) -> Result<Fingerprint, DeterminismError> {
    canonical_bytes(value).map(|bytes| Fingerprint::of_bytes(&bytes))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Result of a determinism validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeterminismResult {
    /// Whether both runs encoded to identical bytes.
    pub is_deterministic: bool,
    pub first: Fingerprint,
    pub second: Fingerprint,
    /// Index of the first unit (cell or feature) whose output differs.
    pub divergence: Option<usize>,
}

impl DeterminismResult {
    fn compare(bytes_a: &[u8], bytes_b: &[u8], divergence: Option<usize>) -> Self {
        Self {
            is_deterministic: bytes_a == bytes_b,
            first: Fingerprint::of_bytes(bytes_a),
            second: Fingerprint::of_bytes(bytes_b),
            divergence,
        }
    }
}

/// Classify `building_grid` twice from `seed` and compare the outputs,
/// statistics included.
pub fn validate_grid_determinism(
    rules: &RuleSet,
    building_grid: &Grid<i32>,
    center: CenterPosition,
    cell_size: f64,
    seed: u64,
) -> Result<DeterminismResult, DeterminismError> {
    let run = || -> GridClassification {
        let mut rng = SimRng::new(seed);
        classify_grid(rules, building_grid.clone(), center, cell_size, &mut rng)
    };
    let a = run();
    let b = run();

    let (cells_a, cells_b) = (a.building_grid.cells(), b.building_grid.cells());
    let (zones_a, zones_b) = (a.zone_grid.cells(), b.zone_grid.cells());
    let divergence =
        (0..cells_a.len()).position(|i| cells_a[i] != cells_b[i] || zones_a[i] != zones_b[i]);

    let result =
        DeterminismResult::compare(&canonical_bytes(&a)?, &canonical_bytes(&b)?, divergence);
    log_result("grid", &result);
    Ok(result)
}

/// Classify `inputs` twice from `seed` on a shared stream and compare.
pub fn validate_feature_determinism(
    rules: &RuleSet,
    inputs: &[FeatureInput],
    params: &FeatureParams,
    seed: u64,
) -> Result<DeterminismResult, DeterminismError> {
    let run = || -> Vec<FeatureAttributes> {
        let mut rng = SimRng::new(seed);
        classify_features(rules, inputs, params, &mut rng)
    };
    let a = run();
    let b = run();

    let divergence = a.iter().zip(&b).position(|(x, y)| x != y);

    let result =
        DeterminismResult::compare(&canonical_bytes(&a)?, &canonical_bytes(&b)?, divergence);
    log_result("features", &result);
    Ok(result)
}

fn log_result(output: &str, result: &DeterminismResult) {
    if result.is_deterministic {
        tracing::debug!(output, fingerprint = %result.first, "determinism check passed");
    } else {
        tracing::warn!(
            output,
            first = %result.first,
            second = %result.second,
            divergence = ?result.divergence,
            "determinism check failed"
        );
    }
}
