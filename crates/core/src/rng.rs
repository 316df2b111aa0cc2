//! Deterministic seeded random numbers.
//!
//! Every function here is a pure `(seed) -> (value, next_seed)` transform. There
//! is no process-wide generator: callers carry their [`Seed`] in game state and
//! store the returned seed back for the next draw. [`SeededRng`] is a thin owned
//! wrapper for code that wants to thread one stream through many draws.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Modulus of the generator (2^31 - 1, a Mersenne prime).
pub const SEED_MODULUS: u64 = 2_147_483_647;

/// Multiplier for the minimal-standard Lehmer generator.
const MULTIPLIER: u64 = 48_271;

/// Seed substituted for `0`, which is a fixed point of a multiplicative LCG.
const ZERO_SEED_SUBSTITUTE: u64 = 0x2545_F491;

/// An integer seed in `[0, 2147483647)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "u64", into = "u64")]
pub struct Seed(u32);

impl Seed {
    /// Reduce an arbitrary integer into the seed space.
    pub const fn new(raw: u64) -> Self {
        Self((raw % SEED_MODULUS) as u32)
    }

    /// Raw seed value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Advance this seed by one step. Same as [`next_seed`].
    pub fn next(self) -> Self {
        next_seed(self)
    }
}

impl From<u64> for Seed {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

impl From<Seed> for u64 {
    fn from(seed: Seed) -> Self {
        seed.0 as u64
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Advance a seed.
///
/// Output is always in `[1, 2147483646]`; the chain from any seed has the full
/// period of the generator.
pub fn next_seed(seed: Seed) -> Seed {
    let mut state = seed.0 as u64 % SEED_MODULUS;
    if state == 0 {
        state = ZERO_SEED_SUBSTITUTE;
    }
    Seed(((state * MULTIPLIER) % SEED_MODULUS) as u32)
}

/// Uniform float in `[0, 1)` plus the advanced seed.
pub fn random(seed: Seed) -> (f64, Seed) {
    let next = next_seed(seed);
    (next.0 as f64 / SEED_MODULUS as f64, next)
}

/// Uniform integer in `[min, max)` plus the advanced seed.
///
/// Reversed bounds are swapped. A degenerate range (`min == max`) yields `min`
/// but still advances the seed so chained callers keep moving.
pub fn random_int(seed: Seed, min: i64, max: i64) -> (i64, Seed) {
    let (lo, hi) = if min > max { (max, min) } else { (min, max) };
    let (value, next) = random(seed);
    if lo == hi {
        return (lo, next);
    }

    let span = hi as i128 - lo as i128;
    let offset = ((value * span as f64).floor() as i128).clamp(0, span - 1);
    ((lo as i128 + offset) as i64, next)
}

/// Select one item with probability proportional to its weight.
///
/// Zero-weight items are never selected.
pub fn weighted_random<'a, T>(
    seed: Seed,
    items: &'a [T],
    weights: &[f64],
) -> Result<(&'a T, Seed), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyItems);
    }
    if items.len() != weights.len() {
        return Err(ValidationError::LengthMismatch {
            items: items.len(),
            weights: weights.len(),
        });
    }
    if let Some(index) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
        return Err(ValidationError::InvalidWeight { index });
    }

    // Huge finite weights can sum to infinity; rescale by the largest one.
    let mut scale = 1.0;
    let mut total: f64 = weights.iter().sum();
    if total.is_infinite() {
        scale = weights.iter().copied().fold(0.0, f64::max);
        total = weights.iter().map(|w| w / scale).sum();
    }
    if total <= 0.0 {
        return Err(ValidationError::ZeroTotalWeight);
    }

    let (value, next) = random(seed);
    let target = value * total;

    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (index, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        cumulative += weight / scale;
        last_positive = index;
        if target < cumulative {
            return Ok((&items[index], next));
        }
    }

    // Rounding can leave `target` a hair above the running sum.
    Ok((&items[last_positive], next))
}

/// Derive a seed from a string key.
///
/// Uses FNV-1a followed by a SplitMix64 finaliser so that keys differing only
/// in a trailing counter do not produce correlated streams.
pub fn seed_from_key(key: &str) -> Seed {
    Seed::new(mix64(fnv1a(key.as_bytes())))
}

fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// An owned stream over the pure functions above.
///
/// Holds nothing but the current seed, which can be read back with
/// [`SeededRng::seed`] and persisted alongside the owner's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    seed: Seed,
}

impl SeededRng {
    /// Start a stream at `seed`.
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }

    /// Current seed (the one the next draw will consume).
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let (value, next) = random(self.seed);
        self.seed = next;
        value
    }

    /// Uniform integer in `[min, max)`.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        let (value, next) = random_int(self.seed, min, max);
        self.seed = next;
        value
    }

    /// Returns true with probability `probability`.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Weighted pick; see [`weighted_random`].
    pub fn pick_weighted<'a, T>(
        &mut self,
        items: &'a [T],
        weights: &[f64],
    ) -> Result<&'a T, ValidationError> {
        let (item, next) = weighted_random(self.seed, items, weights)?;
        self.seed = next;
        Ok(item)
    }

    /// Partially shuffle `items` so that its first `count` elements are a
    /// uniform sample without replacement. Returns the sample size, which is
    /// capped at `items.len()`.
    pub fn shuffle_prefix<T>(&mut self, items: &mut [T], count: usize) -> usize {
        let count = count.min(items.len());
        for i in 0..count {
            let j = self.next_int(i as i64, items.len() as i64) as usize;
            items.swap(i, j);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_seed_is_deterministic_and_in_range() {
        for raw in [0u64, 1, 42, 12345, SEED_MODULUS - 1, u64::MAX] {
            let seed = Seed::new(raw);
            let a = next_seed(seed);
            let b = next_seed(seed);
            assert_eq!(a, b);
            assert!((a.get() as u64) < SEED_MODULUS);
        }
    }

    #[test]
    fn zero_seed_does_not_stick() {
        let zero = Seed::new(0);
        let next = next_seed(zero);
        assert_ne!(next.get(), 0);
        assert_ne!(next_seed(next), next);
    }

    #[test]
    fn random_int_spans_the_full_i64_range() {
        let mut seed = Seed::new(42);
        let mut negatives = 0;
        for _ in 0..1_000 {
            let (value, next) = random_int(seed, i64::MIN, i64::MAX);
            assert!(value < i64::MAX);
            if value < 0 {
                negatives += 1;
            }
            seed = next;
        }
        assert!((300..700).contains(&negatives), "negatives {negatives}");

        let (value, _) = random_int(Seed::new(7), i64::MAX, i64::MIN);
        assert!(value < i64::MAX);
    }

    #[test]
    fn huge_weights_are_picked_evenly() {
        let items = ["a", "b"];
        let mut seed = Seed::new(42);
        let mut picked_a = 0;
        for _ in 0..1_000 {
            let (picked, next) = weighted_random(seed, &items, &[f64::MAX, f64::MAX]).unwrap();
            if *picked == "a" {
                picked_a += 1;
            }
            seed = next;
        }
        assert!((350..650).contains(&picked_a), "a picked {picked_a}/1000");
    }

    #[test]
    fn consecutive_seeds_differ() {
        for start in [1u64, 7, 42, 999, 123_456_789] {
            let mut seed = Seed::new(start);
            for _ in 0..100 {
                let next = next_seed(seed);
                assert_ne!(next, seed, "seed {} repeated", seed);
                seed = next;
            }
        }
    }

    #[test]
    fn chain_does_not_cycle_early() {
        let start = Seed::new(42);
        let mut seed = start;
        for i in 0..300_000 {
            seed = next_seed(seed);
            assert_ne!(seed, start, "cycled after {} steps", i + 1);
        }
    }

    #[test]
    fn random_stays_below_one() {
        let mut seed = Seed::new(42);
        for _ in 0..10_000 {
            let (value, next) = random(seed);
            assert!((0.0..1.0).contains(&value));
            seed = next;
        }
    }

    #[test]
    fn random_mean_is_centered() {
        let mut seed = Seed::new(2024);
        let mut sum = 0.0;
        let draws = 5_000;
        for _ in 0..draws {
            let (value, next) = random(seed);
            sum += value;
            seed = next;
        }
        let mean = sum / draws as f64;
        assert!((mean - 0.5).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn chained_random_replays_identically() {
        let run = || {
            let mut seed = Seed::new(42);
            let mut values = Vec::new();
            for _ in 0..10 {
                let (value, next) = random(seed);
                values.push(value.to_bits());
                seed = next;
            }
            values
        };
        let first = run();
        assert_eq!(first, run());
        for pair in first.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn random_int_degenerate_and_swapped_ranges() {
        let mut seed = Seed::new(77);
        for _ in 0..200 {
            assert_eq!(random_int(seed, 5, 5).0, 5);
            assert_eq!(random_int(seed, 10, 1).0, random_int(seed, 1, 10).0);
            let (value, _) = random_int(seed, 1, 10);
            assert!((1..10).contains(&value));
            seed = next_seed(seed);
        }
    }

    #[test]
    fn random_int_covers_range_uniformly() {
        let mut seed = Seed::new(31337);
        let mut buckets = [0u32; 6];
        for _ in 0..6_000 {
            let (value, next) = random_int(seed, 0, 6);
            buckets[value as usize] += 1;
            seed = next;
        }
        for (face, count) in buckets.iter().enumerate() {
            assert!(
                (800..1200).contains(count),
                "bucket {face} got {count} hits"
            );
        }
    }

    #[test]
    fn weighted_random_rejects_bad_input() {
        let seed = Seed::new(1);
        let empty: [u8; 0] = [];
        assert_eq!(
            weighted_random(seed, &empty, &[]),
            Err(ValidationError::EmptyItems)
        );
        assert_eq!(
            weighted_random(seed, &["a", "b"], &[1.0]),
            Err(ValidationError::LengthMismatch {
                items: 2,
                weights: 1
            })
        );
        assert_eq!(
            weighted_random(seed, &["a", "b"], &[1.0, -2.0]),
            Err(ValidationError::InvalidWeight { index: 1 })
        );
        assert_eq!(
            weighted_random(seed, &["a", "b"], &[0.0, 0.0]),
            Err(ValidationError::ZeroTotalWeight)
        );
    }

    #[test]
    fn weighted_random_never_picks_zero_weight() {
        let items = ["never", "left", "right"];
        let mut seed = Seed::new(99);
        for _ in 0..1_000 {
            let (picked, next) = weighted_random(seed, &items, &[0.0, 50.0, 50.0]).unwrap();
            assert_ne!(*picked, "never");
            seed = next;
        }
    }

    #[test]
    fn weighted_random_is_proportional() {
        let items = ["common", "rare"];
        let mut seed = Seed::new(4242);
        let mut common = 0;
        let mut rare = 0;
        for _ in 0..1_000 {
            let (picked, next) = weighted_random(seed, &items, &[90.0, 10.0]).unwrap();
            match *picked {
                "common" => common += 1,
                _ => rare += 1,
            }
            seed = next;
        }
        assert!(common > 800, "common picked {common} times");
        assert!(rare < 200, "rare picked {rare} times");
    }

    #[test]
    fn seed_from_key_is_stable_and_spreads() {
        assert_eq!(seed_from_key("0,0,1,berry,grow"), seed_from_key("0,0,1,berry,grow"));
        assert_ne!(seed_from_key("0,0,1,berry,grow"), seed_from_key("0,0,1,berry,drop"));

        // Keys that differ only in a trailing counter should not march in lockstep.
        let firsts: Vec<f64> = (0..50)
            .map(|t| random(seed_from_key(&format!("3,4,7,leaf,{t}"))).0)
            .collect();
        let strides: Vec<f64> = firsts.windows(2).map(|w| w[1] - w[0]).collect();
        let all_same = strides.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-9);
        assert!(!all_same);
    }

    #[test]
    fn seeded_rng_matches_free_functions() {
        let mut rng = SeededRng::new(Seed::new(42));
        let (expected, next) = random(Seed::new(42));
        assert_eq!(rng.next_f64(), expected);
        assert_eq!(rng.seed(), next);
    }

    #[test]
    fn shuffle_prefix_samples_without_replacement() {
        let mut rng = SeededRng::new(Seed::new(5));
        let mut spots: Vec<u32> = (0..10).collect();
        let taken = rng.shuffle_prefix(&mut spots, 4);
        assert_eq!(taken, 4);
        let mut sample = spots[..4].to_vec();
        sample.sort_unstable();
        sample.dedup();
        assert_eq!(sample.len(), 4);

        let mut few = vec![1, 2];
        assert_eq!(rng.shuffle_prefix(&mut few, 5), 2);
    }

    #[test]
    fn seed_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Seed::new(1234)).unwrap();
        assert_eq!(json, "1234");
        let back: Seed = serde_json::from_str("2147483648").unwrap();
        assert_eq!(back.get(), 1);
    }
}
