//! Deterministic per-trip and corpus-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each synthetic trip gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (trip_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive trip indices uniformly across the seed space.
//! This means:
//!
//! - Trips never share RNG state, so they can be generated in any order or
//!   on any number of threads and still produce the same corpus.
//! - Growing `n_trips` does not disturb the trips already generated.
//!
//! Corpus-level draws (the special-event calendar) come from a [`SimRng`]
//! child stream so they never consume numbers from any trip stream.

use rand::distributions::WeightedIndex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;

use crate::TripId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── TripRng ───────────────────────────────────────────────────────────────────

/// Per-trip deterministic RNG.
pub struct TripRng(SmallRng);

impl TripRng {
    /// Seed deterministically from the run's global seed and a trip id.
    pub fn new(global_seed: u64, trip: TripId) -> Self {
        let seed = global_seed ^ (trip.0 as u64 + 1).wrapping_mul(MIXING_CONSTANT);
        TripRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// `center` scaled by a uniform factor in `[1 - spread, 1 + spread]`.
    #[inline]
    pub fn jitter(&mut self, center: f64, spread: f64) -> f64 {
        if spread <= 0.0 {
            return center;
        }
        center * self.0.gen_range((1.0 - spread)..=(1.0 + spread))
    }

    /// Draw from `N(mean, std)`.  A non-positive `std` returns `mean`.
    pub fn normal(&mut self, mean: f64, std: f64) -> f64 {
        match Normal::new(mean, std) {
            Ok(dist) if std > 0.0 => self.0.sample(dist),
            _ => mean,
        }
    }

    /// Index drawn proportionally to `weights`, or `None` if no weight is
    /// positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        WeightedIndex::new(weights).ok().map(|d| self.0.sample(d))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Corpus-level RNG for global draws (event calendar, etc.).
///
/// Used only in single-threaded contexts.  Give each independent concern its
/// own [`child`](SimRng::child) so adding draws to one never shifts another.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice, `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
