//! Seed derivation for the independent random streams used by systems.
//!
//! Every stream is a [`ChaCha8Rng`] seeded from the master seed and a stream
//! label hashed with SHA-256, so adding a roll to one system never shifts the
//! rolls observed by another.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Stream consumed by the AI engine.
pub const RNG_STREAM_AI: &str = "chrobry.ai";
/// Stream consumed by the loot roller.
pub const RNG_STREAM_LOOT: &str = "chrobry.loot";
/// Stream consumed by the spawn and lifecycle manager.
pub const RNG_STREAM_LIFECYCLE: &str = "chrobry.lifecycle";
/// Stream consumed by the simulation driver for player-facing rolls.
pub const RNG_STREAM_CONTROL: &str = "chrobry.control";

/// Derives the seed of a labelled stream from the master seed.
#[must_use]
pub fn derive_seed(master: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(master.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

/// Creates the random stream identified by `label`.
#[must_use]
pub fn stream(master: u64, label: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(master, label))
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn streams_are_reproducible() {
        let mut first = stream(99, RNG_STREAM_AI);
        let mut second = stream(99, RNG_STREAM_AI);
        for _ in 0..32 {
            assert_eq!(first.gen::<u64>(), second.gen::<u64>());
        }
    }

    #[test]
    fn labels_separate_streams() {
        assert_ne!(
            derive_seed(7, RNG_STREAM_AI),
            derive_seed(7, RNG_STREAM_LOOT)
        );
        assert_ne!(derive_seed(7, RNG_STREAM_AI), derive_seed(8, RNG_STREAM_AI));
    }
}
