//! The single seeded decision source for a simulation.
//!
//! # Determinism strategy
//!
//! Every random branch in the transition logic goes through one `SimRng`
//! owned by the session.  Threads are processed in ascending `ThreadId`
//! order, so the sequence of draws is a pure function of the seed and the
//! input sequence:
//!
//! - Same seed + same calls → identical event sequence, tick for tick.
//! - Pattern code never constructs its own RNG; it only sees
//!   [`SimRng::decide`] and [`SimRng::pick`] through the step context.
//!
//! `SmallRng` is not guaranteed stable across `rand` releases or platforms,
//! which is fine for replay within one build but means recorded seeds are
//! not a portable file format.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Session-level deterministic RNG.
///
/// Used only in single-threaded contexts: the session that owns it is the
/// single writer of the simulation state.
pub struct SimRng {
    inner: SmallRng,
    seed:  u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: SmallRng::seed_from_u64(seed), seed }
    }

    /// The seed this generator was created (or last reseeded) with.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from `seed`, as if freshly constructed.
    pub fn reseed(&mut self, seed: u64) {
        *self = SimRng::new(seed);
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    ///
    /// The only Bernoulli primitive pattern logic is given.
    #[inline]
    pub fn decide(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform index in `0..n`.
    ///
    /// # Panics
    /// Panics if `n == 0`.
    #[inline]
    pub fn pick(&mut self, n: usize) -> usize {
        self.inner.gen_range(0..n)
    }
}

impl std::fmt::Debug for SimRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimRng").field("seed", &self.seed).finish_non_exhaustive()
    }
}
