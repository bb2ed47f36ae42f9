//! Simulation time model.
//!
//! # Design
//!
//! Logical time is a monotonically increasing `Tick` counter: one tick is one
//! Step Engine invocation.  Event ordering, budgets, and determinism are all
//! defined in ticks.  Wall-clock time only appears as the start/end stamps
//! recorded by `SimClock` for display; nothing in the transition logic reads
//! it.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Step counter plus the wall-clock stamps of the current run.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// The current tick, advanced by `SimClock::advance()` each step.
    pub current_tick: Tick,
    /// Unix milliseconds at which the run was started, if it has been.
    pub started_at_ms: Option<u64>,
    /// Unix milliseconds at which the run stopped, if it has.
    pub ended_at_ms: Option<u64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Rewind to tick 0 and stamp the start time.
    pub fn start(&mut self) {
        self.current_tick  = Tick::ZERO;
        self.started_at_ms = Some(unix_millis());
        self.ended_at_ms   = None;
    }

    pub fn stop(&mut self) {
        self.ended_at_ms = Some(unix_millis());
    }

    /// Wall-clock milliseconds since `start()`, or 0 if never started.
    pub fn elapsed_ms(&self) -> u64 {
        match self.started_at_ms {
            None        => 0,
            Some(start) => self.ended_at_ms.unwrap_or_else(unix_millis).saturating_sub(start),
        }
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ms)", self.current_tick, self.elapsed_ms())
    }
}

/// Current wall-clock time in Unix milliseconds (0 if the system clock is
/// set before the epoch).
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
