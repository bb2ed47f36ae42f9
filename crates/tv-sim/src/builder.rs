//! Fluent builder for constructing a [`Session`].

use tv_core::{PatternKind, Probabilities, SimConfig, Viewport};

use crate::{Session, SimResult};

/// Fluent builder for [`Session`].
///
/// Starts from the defaults of the chosen pattern; every setter overrides
/// one field.  Nothing is validated until [`build`][Self::build].
///
/// # Example
///
/// ```rust,ignore
/// let mut session = SessionBuilder::new(PatternKind::DiningPhilosophers)
///     .threads(5)
///     .seed(7)
///     .max_steps(500)
///     .build()?;
/// session.start()?;
/// session.run_ticks(500, &mut NoopObserver);
/// ```
pub struct SessionBuilder {
    config: SimConfig,
}

impl SessionBuilder {
    pub fn new(pattern: PatternKind) -> Self {
        Self { config: SimConfig::new(pattern) }
    }

    /// Start from a complete config, e.g. one loaded from a file.
    pub fn from_config(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn threads(mut self, n: usize) -> Self {
        self.config.thread_count = n;
        self
    }

    pub fn buffer_size(mut self, n: u32) -> Self {
        self.config.buffer_size = n;
        self
    }

    pub fn barrier_threshold(mut self, n: u32) -> Self {
        self.config.barrier_threshold = Some(n);
        self
    }

    pub fn waiting_room(mut self, n: u32) -> Self {
        self.config.waiting_room_size = n;
        self
    }

    pub fn ingredients(mut self, n: u32) -> Self {
        self.config.ingredient_types = n;
        self
    }

    pub fn probabilities(mut self, p: Probabilities) -> Self {
        self.config.probabilities = Some(p);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn max_events(mut self, n: usize) -> Self {
        self.config.max_events = n;
        self
    }

    pub fn max_steps(mut self, n: u64) -> Self {
        self.config.max_steps = Some(n);
        self
    }

    /// Run until every thread terminates or the session is stopped.
    pub fn unbounded(mut self) -> Self {
        self.config.max_steps = None;
        self.config.max_duration_ms = None;
        self
    }

    pub fn max_duration_ms(mut self, ms: u64) -> Self {
        self.config.max_duration_ms = Some(ms);
        self
    }

    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.config.viewport = viewport;
        self
    }

    /// Validate the config and build an unstarted session.
    pub fn build(self) -> SimResult<Session> {
        Session::new(self.config)
    }
}
