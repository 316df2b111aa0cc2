#![warn(missing_docs)]
//! Core primitives shared across the workspace: simulation ticks, the seeded
//! random number generator and the loot rules built on top of it.

pub mod error;
pub mod loot;
pub mod rng;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use error::ValidationError;
pub use loot::{roll_loot, LootDrop, LootEntry, LootRollResult, LootTable};
pub use rng::{
    next_seed, random, random_int, seed_from_key, weighted_random, Seed, SeededRng, SEED_MODULUS,
};

/// Fixed simulation tick counter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Helper to derive a reproducible stream scoped to a world seed, a domain
/// label and a tick.
pub fn scoped_rng(world_seed: Seed, domain: &str, tick: SimTick) -> SeededRng {
    let key = format!("{}:{}:{}", world_seed.get(), domain, tick.0);
    SeededRng::new(seed_from_key(&key))
}
