//! The `Pattern` trait: the per-pattern half of the step engine.

use tv_core::{PatternKind, Probabilities, ResourceId, ThreadId, Viewport};
use tv_entity::{EventKind, Placements, Thread, World};

use crate::StepContext;

/// Result of one acquisition attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Attempt {
    /// The thread did nothing this tick.
    Idle,
    /// Progress was made but the action continues on a later tick
    /// (a philosopher holding only the left fork).
    Partial,
    /// The action is done; the thread may go on to protected work.
    Complete,
    /// The availability predicate is false: park on `on`, announcing it
    /// with an event of `kind`.
    Contended {
        on:     ResourceId,
        kind:   EventKind,
        reason: String,
    },
}

impl Attempt {
    /// Shorthand for the common `THREAD_BLOCKED` contention.
    pub fn blocked(on: ResourceId, reason: impl Into<String>) -> Self {
        Attempt::Contended { on, kind: EventKind::ThreadBlocked, reason: reason.into() }
    }
}

/// One concurrency-coordination problem.
///
/// Chosen once by the factory and held for the session's lifetime.  The
/// step engine owns the thread state machine; a pattern only answers the
/// questions the machine asks: what a RUNNING or BLOCKED thread tries to do
/// ([`attempt`][Self::attempt]), whether a WAITING thread is done
/// ([`finishes`][Self::finishes]), and what it gives back when it is
/// ([`release`][Self::release]).
///
/// Patterns hold only immutable configuration.  All mutable state lives in
/// the [`World`] and is reached through the [`StepContext`].
///
/// # Example
///
/// ```rust,ignore
/// struct Spin;
///
/// impl Pattern for Spin {
///     fn kind(&self) -> PatternKind { PatternKind::Barrier }
///     fn probabilities(&self) -> Probabilities { Probabilities::new(1.0, 0.0, 0.0) }
///     fn populate(&self, world: &mut World) { world.add_thread("T", Role::Worker); }
///     fn arrange(&self, world: &World, vp: &Viewport) -> Placements { ring(world, vp) }
///     fn attempt(&self, _: ThreadId, _: &mut StepContext<'_>) -> Attempt { Attempt::Idle }
/// }
/// ```
pub trait Pattern: Send + Sync + 'static {
    fn kind(&self) -> PatternKind;

    /// Probabilities in effect for this run.
    fn probabilities(&self) -> Probabilities;

    /// Append this pattern's threads and resources to an empty world.
    fn populate(&self, world: &mut World);

    /// Canonical starting positions for every node in `world`.
    fn arrange(&self, world: &World, viewport: &Viewport) -> Placements;

    /// Try the thread's pattern-specific action.
    ///
    /// Called for RUNNING threads that passed the demand gate and for every
    /// BLOCKED thread.  Returning `Contended` on the resource the thread is
    /// already parked on leaves it blocked silently.
    fn attempt(&self, thread: ThreadId, ctx: &mut StepContext<'_>) -> Attempt;

    /// Chance that a thread whose attempt completed starts protected work.
    fn work_probability(&self, _thread: &Thread) -> f64 {
        self.probabilities().work
    }

    /// The event announcing RUNNING → WAITING.
    fn work_event(&self, thread: &Thread, _ctx: &StepContext<'_>) -> (EventKind, String) {
        (EventKind::ThreadWaiting, format!("{} is working", thread.name))
    }

    /// Whether a WAITING thread ends its wait this tick.
    fn finishes(&self, _thread: ThreadId, ctx: &mut StepContext<'_>) -> bool {
        ctx.decide(self.probabilities().finish)
    }

    /// Give back what the thread holds at the end of its wait.
    ///
    /// Default: release every held resource, one `RESOURCE_RELEASED` each.
    fn release(&self, thread: ThreadId, ctx: &mut StepContext<'_>) {
        ctx.release_all(thread);
    }

    /// Undo pattern bookkeeping before the thread is terminated externally.
    ///
    /// The engine then releases everything the thread holds, removes it
    /// from every wait queue, and sets TERMINATED.  Default: nothing extra.
    fn withdraw(&self, _thread: ThreadId, _ctx: &mut StepContext<'_>) {}
}
