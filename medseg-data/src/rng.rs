// medseg-data/src/rng.rs

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded generator for reproducible runs, entropy-seeded otherwise.
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
