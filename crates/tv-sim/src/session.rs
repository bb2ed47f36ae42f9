//! The `Session` struct: one simulation and its lifecycle.

use tv_core::{PatternKind, SimClock, SimConfig, SimRng, ThreadId, Tick};
use tv_entity::{EventKind, EventLog, Placements, Resource, Thread, ThreadState, World};
use tv_pattern::Pattern;
use uuid::Uuid;

use crate::engine::{self, TickReport};
use crate::{SimError, SimObserver, SimResult, Snapshot};

/// What a call to [`Session::step`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The session is paused, stopped, or never started.  Nothing changed.
    Idle,
    /// One tick ran.
    Advanced(TickReport),
    /// One tick ran and the session stopped at its end.
    Stopped { report: TickReport, reason: String },
}

// ── Session ───────────────────────────────────────────────────────────────────

/// One simulation, owned by the caller and passed explicitly to whatever
/// drives it.
///
/// The session is the single writer of its state.  A driving loop calls
/// [`step`][Self::step] at tick cadence and hands
/// [`layout_view`][Self::layout_view] to the layout engine at frame cadence;
/// renderers and log views read a [`Snapshot`].
///
/// ```text
///            start            pause
///  (built) ────────▶ running ◀──────▶ paused
///                       │     resume     │
///                       └──── stop ──────┴──▶ stopped ──reset──▶ (built)
/// ```
///
/// Create via [`SessionBuilder`][crate::SessionBuilder] or [`Session::new`].
pub struct Session {
    id:      Uuid,
    config:  SimConfig,
    pattern: Box<dyn Pattern>,
    world:   World,
    events:  EventLog,
    rng:     SimRng,
    clock:   SimClock,
    running: bool,
    paused:  bool,
}

impl Session {
    /// Validate `config` and build a session that has not started yet.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        let blueprint = tv_pattern::build(&config)?;
        let session = Self {
            id:      Uuid::new_v4(),
            events:  EventLog::new(config.max_events),
            rng:     SimRng::new(config.seed),
            clock:   SimClock::new(),
            pattern: blueprint.pattern,
            world:   blueprint.world,
            running: false,
            paused:  false,
            config,
        };
        tracing::info!(
            session = %session.id,
            pattern = %session.kind(),
            threads = session.world.threads.len(),
            seed = session.config.seed,
            "session created",
        );
        Ok(session)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn kind(&self) -> PatternKind {
        self.pattern.kind()
    }

    pub fn pattern(&self) -> &dyn Pattern {
        self.pattern.as_ref()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Ticks executed since `start`.
    pub fn step_count(&self) -> u64 {
        self.clock.current_tick.0
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Read-only entities plus mutable placements, for the layout engine.
    pub fn layout_view(&mut self) -> (&[Thread], &[Resource], &mut Placements) {
        self.world.split_for_layout()
    }

    /// Owned copy of everything a renderer or log view needs.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            session:    self.id,
            pattern:    self.kind(),
            step:       self.step_count(),
            running:    self.running,
            paused:     self.paused,
            threads:    self.world.threads.clone(),
            resources:  self.world.resources.clone(),
            placements: self.world.placements.clone(),
            events:     self.events.to_vec(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Start the run: every NEW thread becomes RUNNING.
    ///
    /// Appends `SIMULATION_STARTED` followed by one `THREAD_STARTED` per
    /// thread.  A session runs once; [`reset`][Self::reset] it to run again.
    pub fn start(&mut self) -> SimResult<()> {
        if self.clock.started_at_ms.is_some() {
            return Err(SimError::AlreadyStarted(self.id));
        }
        self.clock.start();
        self.running = true;
        self.paused = false;

        let tick = self.clock.current_tick;
        let title = self.kind().title();
        self.events.push(tick, EventKind::SimulationStarted, None, None, format!("{title} simulation started"));
        for t in &mut self.world.threads {
            if t.state == ThreadState::New {
                t.state = ThreadState::Running;
                self.events.push(tick, EventKind::ThreadStarted, Some(t.id), None, format!("{} started", t.name));
            }
        }
        tracing::info!(session = %self.id, "session started");
        Ok(())
    }

    /// Returns `true` if the session was running and is now paused.
    pub fn pause(&mut self) -> bool {
        if !self.running || self.paused {
            return false;
        }
        self.paused = true;
        self.events.push(self.clock.current_tick, EventKind::SimulationPaused, None, None, "Simulation paused");
        tracing::info!(session = %self.id, tick = %self.clock.current_tick, "session paused");
        true
    }

    /// Returns `true` if the session was paused and is now running again.
    pub fn resume(&mut self) -> bool {
        if !self.running || !self.paused {
            return false;
        }
        self.paused = false;
        self.events.push(self.clock.current_tick, EventKind::SimulationResumed, None, None, "Simulation resumed");
        tracing::info!(session = %self.id, tick = %self.clock.current_tick, "session resumed");
        true
    }

    /// Stop the run.  Appends a single `SIMULATION_STOPPED`; stopping a
    /// session that is not running does nothing and returns `false`.
    pub fn stop(&mut self, reason: impl Into<String>) -> bool {
        if !self.running {
            return false;
        }
        let reason = reason.into();
        self.running = false;
        self.paused = false;
        self.clock.stop();
        self.events.push(self.clock.current_tick, EventKind::SimulationStopped, None, None, reason.clone());
        tracing::info!(session = %self.id, tick = %self.clock.current_tick, %reason, "session stopped");
        true
    }

    /// Discard the world, event log, and RNG and rebuild them from the stored
    /// config.  The session id is kept; positions return to the canonical
    /// arrangement.
    pub fn reset(&mut self) -> SimResult<()> {
        let blueprint = tv_pattern::build(&self.config)?;
        self.pattern = blueprint.pattern;
        self.world = blueprint.world;
        self.events = EventLog::new(self.config.max_events);
        self.rng.reseed(self.config.seed);
        self.clock = SimClock::new();
        self.running = false;
        self.paused = false;
        tracing::info!(session = %self.id, "session reset");
        Ok(())
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance exactly one tick, then enforce the step and time budgets.
    pub fn step(&mut self) -> StepOutcome {
        if !self.running || self.paused {
            return StepOutcome::Idle;
        }
        self.clock.advance();
        let tick = self.clock.current_tick;
        let mut report = engine::advance(self.pattern.as_ref(), tick, &mut self.world, &mut self.events, &mut self.rng);

        let Some((reason, budget)) = self.stop_reason(tick) else {
            return StepOutcome::Advanced(report);
        };
        if budget {
            tracing::warn!(session = %self.id, %tick, %reason, "budget exhausted, terminating threads");
            let before = self.events.total_appended();
            let live: Vec<ThreadId> =
                self.world.threads.iter().filter(|t| t.state.is_live()).map(|t| t.id).collect();
            engine::terminate_threads(
                self.pattern.as_ref(),
                tick,
                &mut self.world,
                &mut self.events,
                &mut self.rng,
                &live,
                &reason,
            );
            report.events += self.events.total_appended() - before;
            report.blocked = 0;
        }
        self.stop(format!("Simulation completed: {reason}"));
        report.events += 1;
        StepOutcome::Stopped { report, reason }
    }

    /// Run up to `n` ticks, reporting to `observer`.  Returns the number of
    /// ticks actually executed, which is smaller than `n` if the session
    /// stops or is not running.
    ///
    /// The observer sees every event of every tick, even when a single tick
    /// appends more than the log retains.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> u64 {
        let mut ran = 0;
        for _ in 0..n {
            if !self.running || self.paused {
                break;
            }
            observer.on_tick_start(self.clock.current_tick + 1);
            self.events.begin_capture();
            let outcome = self.step();
            for event in &self.events.end_capture() {
                observer.on_event(event);
            }
            match outcome {
                StepOutcome::Idle => break,
                StepOutcome::Advanced(report) => observer.on_tick_end(&report),
                StepOutcome::Stopped { report, reason } => {
                    observer.on_tick_end(&report);
                    observer.on_stop(report.tick, &reason);
                    ran += 1;
                    break;
                }
            }
            ran += 1;
        }
        ran
    }

    /// Terminate one thread from outside the pattern logic.
    ///
    /// The thread releases what it holds and leaves every wait queue; no
    /// later event names it as actor.  Terminating an already terminated
    /// thread is a no-op.  If it was the last live thread, the session stops.
    pub fn terminate_thread(&mut self, id: ThreadId) -> SimResult<()> {
        self.world.try_thread(id)?;
        engine::terminate_threads(
            self.pattern.as_ref(),
            self.clock.current_tick,
            &mut self.world,
            &mut self.events,
            &mut self.rng,
            &[id],
            "terminated externally",
        );

        if self.world.all_terminated() {
            self.stop("Simulation completed: all threads terminated");
        }
        Ok(())
    }

    /// The reason the run must end after `tick`, and whether it is a budget
    /// (which terminates the remaining threads) rather than natural
    /// completion.
    fn stop_reason(&self, tick: Tick) -> Option<(String, bool)> {
        if let Some(max) = self.config.max_steps.filter(|&m| tick.0 >= m) {
            return Some((format!("maximum {max} steps reached"), true));
        }
        if self.world.all_terminated() {
            return Some(("all threads terminated".to_string(), false));
        }
        if let Some(max) = self.config.max_duration_ms.filter(|&m| self.clock.elapsed_ms() >= m) {
            return Some((format!("maximum duration of {max} ms reached"), true));
        }
        None
    }
}
