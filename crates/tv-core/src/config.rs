//! Simulation configuration consumed from the configuration collaborator.
//!
//! `SimConfig::new(kind)` fills in the defaults of the chosen pattern; the
//! caller overrides fields directly before handing the config to the
//! pattern factory, which validates it against the pattern's domain.

use std::fmt;

use crate::Viewport;

// ── PatternKind ───────────────────────────────────────────────────────────────

/// The concurrency-coordination problem being simulated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PatternKind {
    ProducerConsumer,
    DiningPhilosophers,
    ReaderWriter,
    Barrier,
    SleepingBarber,
    CigaretteSmokers,
}

impl PatternKind {
    pub const ALL: [PatternKind; 6] = [
        PatternKind::ProducerConsumer,
        PatternKind::DiningPhilosophers,
        PatternKind::ReaderWriter,
        PatternKind::Barrier,
        PatternKind::SleepingBarber,
        PatternKind::CigaretteSmokers,
    ];

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            PatternKind::ProducerConsumer   => "Producer/Consumer",
            PatternKind::DiningPhilosophers => "Dining Philosophers",
            PatternKind::ReaderWriter       => "Reader/Writer",
            PatternKind::Barrier            => "Barrier",
            PatternKind::SleepingBarber     => "Sleeping Barber",
            PatternKind::CigaretteSmokers   => "Cigarette Smokers",
        }
    }

    /// Per-pattern default transition probabilities.
    pub fn default_probabilities(self) -> Probabilities {
        match self {
            PatternKind::ProducerConsumer => Probabilities::new(1.0, 0.3, 0.2),
            PatternKind::DiningPhilosophers
            | PatternKind::ReaderWriter   => Probabilities::new(0.3, 1.0, 0.2),
            PatternKind::Barrier          => Probabilities::new(0.3, 0.25, 0.2),
            PatternKind::SleepingBarber
            | PatternKind::CigaretteSmokers => Probabilities::new(0.3, 1.0, 0.25),
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ── Probabilities ─────────────────────────────────────────────────────────────

/// Per-tick probabilities driving the shared thread state machine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Probabilities {
    /// A RUNNING thread holding nothing decides to attempt its action.
    pub demand: f64,
    /// After a successful acquisition, RUNNING → WAITING (protected work).
    pub work: f64,
    /// WAITING → RUNNING, releasing what the thread holds.
    pub finish: f64,
}

impl Probabilities {
    #[inline]
    pub const fn new(demand: f64, work: f64, finish: f64) -> Self {
        Self { demand, work, finish }
    }

    /// Name of the first field outside [0, 1], if any.
    pub fn first_invalid(&self) -> Option<(&'static str, f64)> {
        [("demand", self.demand), ("work", self.work), ("finish", self.finish)]
            .into_iter()
            .find(|(_, p)| !(p.is_finite() && (0.0..=1.0).contains(p)))
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically produced by a configuration form or a JSON file and passed to
/// the session builder.  Fields that do not apply to the chosen pattern are
/// ignored.
///
/// Deserializing accepts partial input: every missing field takes the
/// default of the named pattern (see [`SimConfig::new`]).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "file::ConfigFile"))]
pub struct SimConfig {
    pub pattern: PatternKind,

    /// Total simulated threads.  Split into roles per pattern (e.g. half
    /// producers, half consumers).  Ignored by cigarette smokers, whose
    /// thread count follows `ingredient_types`.
    pub thread_count: usize,

    /// Producer/consumer buffer capacity.
    pub buffer_size: u32,

    /// Arrivals needed to trip the barrier.  `None` means every thread.
    pub barrier_threshold: Option<u32>,

    /// Sleeping-barber waiting room capacity.
    pub waiting_room_size: u32,

    /// Cigarette-smokers ingredient kinds (one smoker per kind).
    pub ingredient_types: u32,

    /// Override of the pattern's default probabilities.
    pub probabilities: Option<Probabilities>,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Event log bound; the oldest events are evicted past this length.
    pub max_events: usize,

    /// Step budget.  Reaching it terminates every thread and stops the run.
    pub max_steps: Option<u64>,

    /// Wall-clock budget in milliseconds, checked once per step.
    pub max_duration_ms: Option<u64>,

    /// Cadence at which a driving scheduler should call `step`.
    pub tick_interval_ms: u64,

    pub viewport: Viewport,
}

impl SimConfig {
    /// Defaults for `pattern`.
    pub fn new(pattern: PatternKind) -> Self {
        let thread_count = match pattern {
            PatternKind::ProducerConsumer   => 4,
            PatternKind::DiningPhilosophers => 5,
            PatternKind::ReaderWriter       => 6,
            PatternKind::Barrier            => 4,
            PatternKind::SleepingBarber     => 5,
            PatternKind::CigaretteSmokers   => 4,
        };
        Self {
            pattern,
            thread_count,
            buffer_size:       5,
            barrier_threshold: None,
            waiting_room_size: 5,
            ingredient_types:  3,
            probabilities:     None,
            seed:              42,
            max_events:        1_000,
            max_steps:         Some(100),
            max_duration_ms:   None,
            tick_interval_ms:  64,
            viewport:          Viewport::default(),
        }
    }

    /// The probabilities in effect: the override, or the pattern default.
    pub fn effective_probabilities(&self) -> Probabilities {
        self.probabilities.unwrap_or_else(|| self.pattern.default_probabilities())
    }

    /// Barrier threshold in effect.
    pub fn effective_barrier_threshold(&self) -> u32 {
        self.barrier_threshold.unwrap_or(self.thread_count as u32)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(PatternKind::ProducerConsumer)
    }
}

// ── On-disk form ──────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
mod file {
    use serde::{Deserialize, Deserializer};

    use super::{PatternKind, Probabilities, SimConfig};
    use crate::Viewport;

    /// `SimConfig` with every field optional.  Fields that are themselves
    /// optional use `Option<Option<_>>` so an explicit `null` (clear it) is
    /// told apart from a missing key (keep the pattern default).
    #[derive(Deserialize)]
    pub(super) struct ConfigFile {
        pattern:           Option<PatternKind>,
        thread_count:      Option<usize>,
        buffer_size:       Option<u32>,
        #[serde(default, deserialize_with = "present")]
        barrier_threshold: Option<Option<u32>>,
        waiting_room_size: Option<u32>,
        ingredient_types:  Option<u32>,
        #[serde(default, deserialize_with = "present")]
        probabilities:     Option<Option<Probabilities>>,
        seed:              Option<u64>,
        max_events:        Option<usize>,
        #[serde(default, deserialize_with = "present")]
        max_steps:         Option<Option<u64>>,
        #[serde(default, deserialize_with = "present")]
        max_duration_ms:   Option<Option<u64>>,
        tick_interval_ms:  Option<u64>,
        viewport:          Option<Viewport>,
    }

    fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(d).map(Some)
    }

    impl From<ConfigFile> for SimConfig {
        fn from(f: ConfigFile) -> Self {
            let d = SimConfig::new(f.pattern.unwrap_or(PatternKind::ProducerConsumer));
            SimConfig {
                pattern:           d.pattern,
                thread_count:      f.thread_count.unwrap_or(d.thread_count),
                buffer_size:       f.buffer_size.unwrap_or(d.buffer_size),
                barrier_threshold: f.barrier_threshold.unwrap_or(d.barrier_threshold),
                waiting_room_size: f.waiting_room_size.unwrap_or(d.waiting_room_size),
                ingredient_types:  f.ingredient_types.unwrap_or(d.ingredient_types),
                probabilities:     f.probabilities.unwrap_or(d.probabilities),
                seed:              f.seed.unwrap_or(d.seed),
                max_events:        f.max_events.unwrap_or(d.max_events),
                max_steps:         f.max_steps.unwrap_or(d.max_steps),
                max_duration_ms:   f.max_duration_ms.unwrap_or(d.max_duration_ms),
                tick_interval_ms:  f.tick_interval_ms.unwrap_or(d.tick_interval_ms),
                viewport:          f.viewport.unwrap_or(d.viewport),
            }
        }
    }
}
