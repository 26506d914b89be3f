//! Synthetic reputation (no API keys configured)
//!
//! Values are random but seedable so tests can pin them. Each batch draws
//! from a fresh RNG, so a seeded run gives the same values for the same batch.

use rand::Rng;

use crate::logic::seed::batch_rng;

/// Source A range (malicious engine count)
pub const SYNTHETIC_A_MAX: u32 = 10;
/// Source B range (confidence %)
pub const SYNTHETIC_B_MAX: u32 = 100;

pub struct SyntheticReputation {
    seed: Option<u64>,
}

impl SyntheticReputation {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// `count` pairs of (a in 0..=10, b in 0..=100), integers
    pub fn draws(&self, count: usize) -> Vec<(f64, f64)> {
        let mut rng = batch_rng(self.seed);
        (0..count)
            .map(|_| {
                let a = rng.gen_range(0..=SYNTHETIC_A_MAX);
                let b = rng.gen_range(0..=SYNTHETIC_B_MAX);
                (a as f64, b as f64)
            })
            .collect()
    }
}
