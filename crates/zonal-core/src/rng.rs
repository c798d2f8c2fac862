//! Deterministic PRNG for classification draws.
//!
//! SplitMix64 over a single `u64` of state. Every classification call
//! takes the stream as `&mut SimRng`; there is no process-wide generator.

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms. The same seed visited in the same
/// order produces the same draws.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Derive an independent stream for the unit at `index`.
    ///
    /// The derived stream depends only on `(seed, index)`, so units can be
    /// classified in any order (or in parallel) and still reproduce.
    pub fn for_unit(seed: u64, index: u64) -> Self {
        let salted = mix(seed ^ mix(index.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA)));
        Self { state: salted }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        mix(self.state)
    }

    /// Uniform draw in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform draw in `[min, max)`. Always consumes exactly one draw,
    /// even when the interval is empty (`min == max` yields `min`).
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        let u = self.next_f64();
        min + (max - min) * u
    }

    /// Returns `true` with the given probability.
    ///
    /// Consumes one draw regardless of the probability so the stream stays
    /// aligned across units:
    /// - probability <= 0 always returns false
    /// - probability >= 1 always returns true
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Pick an index from `weights` with a single uniform draw.
    ///
    /// Weights are treated as an unnormalised multinomial distribution:
    /// the draw is scaled by the weight total and walked along the
    /// cumulative sum. Zero-weight entries are never chosen. Returns
    /// `None` if no weight is positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let u = self.next_f64();
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if !(total > 0.0) {
            return None;
        }

        let target = u * total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            cumulative += w;
            last_positive = Some(i);
            if target < cumulative {
                return Some(i);
            }
        }
        // Round-off can leave target == total; fall back to the last
        // category that carries weight.
        last_positive
    }

    /// Get the internal state (for hashing/serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}
