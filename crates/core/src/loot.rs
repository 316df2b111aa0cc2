//! Loot rolls.
//!
//! [`roll_loot`] decides a single drop from a base chance adjusted by item
//! rarity and encounter difficulty. [`LootTable`] chains it over a list of
//! authored entries.

use crate::rng::{random_int, Seed};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lowest and highest rarity / difficulty tier.
pub const MIN_TIER: i32 = 1;
/// Highest rarity / difficulty tier.
pub const MAX_TIER: i32 = 5;

/// Percentage points added per rarity tier above 1.
pub const RARITY_STEP: f64 = 12.5;
/// Percentage points removed per difficulty tier above 1.
pub const DIFFICULTY_STEP: f64 = 12.5;

/// Lower clamp of the final chance; no drop is ever impossible.
pub const MIN_CHANCE: f64 = 1.0;
/// Upper clamp of the final chance; no drop is ever guaranteed.
pub const MAX_CHANCE: f64 = 99.0;

/// Outcome of a single [`roll_loot`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootRollResult {
    /// Whether the drop happened.
    pub success: bool,
    /// The drawn roll in `[0, 99]`.
    pub roll: u32,
    /// The adjusted chance the roll was compared against, in `[1, 99]`.
    pub final_chance: f64,
    /// Seed to use for the next draw.
    pub next_seed: Seed,
}

fn rarity_bonus(rarity: i32) -> f64 {
    (rarity - MIN_TIER) as f64 * RARITY_STEP
}

fn difficulty_penalty(difficulty: i32) -> f64 {
    (difficulty - MIN_TIER) as f64 * DIFFICULTY_STEP
}

/// Adjusted drop chance before any roll is made.
///
/// Out-of-range tiers are clamped into `[1, 5]`; the result is clamped into
/// `[1, 99]`.
pub fn final_chance(base_chance: f64, rarity: i32, difficulty: i32) -> f64 {
    let rarity = rarity.clamp(MIN_TIER, MAX_TIER);
    let difficulty = difficulty.clamp(MIN_TIER, MAX_TIER);
    let chance = base_chance + rarity_bonus(rarity) - difficulty_penalty(difficulty);
    if chance.is_nan() {
        return MIN_CHANCE;
    }
    chance.clamp(MIN_CHANCE, MAX_CHANCE)
}

/// Roll for a single drop.
pub fn roll_loot(seed: Seed, base_chance: f64, rarity: i32, difficulty: i32) -> LootRollResult {
    let final_chance = final_chance(base_chance, rarity, difficulty);
    let (roll, next_seed) = random_int(seed, 0, 100);
    let roll = roll as u32;
    LootRollResult {
        success: (roll as f64) < final_chance,
        roll,
        final_chance,
        next_seed,
    }
}

/// One authored drop in a [`LootTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootEntry {
    /// Item identifier handed back in [`LootDrop::item`].
    pub item: String,
    /// Base drop chance in percent.
    pub base_chance: f64,
    /// Rarity tier (clamped to `[1, 5]`).
    #[serde(default = "default_tier")]
    pub rarity: i32,
    /// Minimum quantity on success.
    #[serde(default = "default_quantity")]
    pub min: u32,
    /// Maximum quantity on success (inclusive).
    #[serde(default = "default_quantity")]
    pub max: u32,
}

fn default_tier() -> i32 {
    MIN_TIER
}

fn default_quantity() -> u32 {
    1
}

/// A successful drop from [`LootTable::roll`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    /// Item identifier.
    pub item: String,
    /// Quantity dropped (at least 1).
    pub quantity: u32,
}

/// An ordered list of independent drops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    /// Entries, rolled in order.
    #[serde(default)]
    pub entries: Vec<LootEntry>,
}

impl LootTable {
    /// Create a table from entries.
    pub fn new(entries: Vec<LootEntry>) -> Self {
        Self { entries }
    }

    /// Roll every entry once at `difficulty`, threading the seed through each
    /// roll. Returns the drops and the seed for the caller's next draw.
    pub fn roll(&self, seed: Seed, difficulty: i32) -> (Vec<LootDrop>, Seed) {
        let mut seed = seed;
        let mut drops = Vec::new();

        for entry in &self.entries {
            let result = roll_loot(seed, entry.base_chance, entry.rarity, difficulty);
            seed = result.next_seed;
            if !result.success {
                continue;
            }

            let (lo, hi) = if entry.min <= entry.max {
                (entry.min, entry.max)
            } else {
                (entry.max, entry.min)
            };
            let quantity = if lo == hi {
                lo
            } else {
                let (count, next) = random_int(seed, lo as i64, hi as i64 + 1);
                seed = next;
                count as u32
            };

            if quantity > 0 {
                debug!(item = %entry.item, quantity, roll = result.roll, "loot dropped");
                drops.push(LootDrop {
                    item: entry.item.clone(),
                    quantity,
                });
            }
        }

        (drops, seed)
    }
}
