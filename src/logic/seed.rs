//! Per-batch RNG
//!
//! Mỗi lần gọi tạo một RNG mới từ seed: a seeded stage returns the same
//! output for the same batch, no matter how many batches ran before.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fresh RNG for one call; `None` seeds from entropy
pub fn batch_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
