//! The step engine: the thread state machine shared by every pattern.
//!
//! # One tick
//!
//! ```text
//! for thread in ascending ThreadId:
//!   skip if another thread already changed its state this tick
//!   RUNNING  → demand gate (only when holding nothing), then attempt:
//!                Complete   → maybe start work (→ WAITING)
//!                Contended  → park (→ BLOCKED, one event)
//!                Partial    → stay RUNNING
//!   WAITING  → finishes? release, → RUNNING, THREAD_RESUMED
//!   BLOCKED  → attempt again:
//!                Contended on the same resource → nothing, no event
//!                Contended elsewhere            → re-park, one event
//!                Complete / Partial             → unpark, → WAITING or RUNNING
//!   NEW / READY / TERMINATED → untouched
//! check world invariants (debug builds)
//! ```
//!
//! Every draw from the RNG happens in this fixed order, so a seed fully
//! determines the event sequence.

use tv_core::{SimRng, ThreadId, Tick};
use tv_entity::{EventKind, EventLog, ThreadState, World};
use tv_pattern::{Attempt, Pattern, StepContext};

/// Summary of one executed tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    pub tick: Tick,
    /// Events appended during the tick (including any evicted since).
    pub events: u64,
    /// Threads BLOCKED once the tick finished.
    pub blocked: usize,
}

/// Run one tick of `pattern` over `world`.
pub(crate) fn advance(
    pattern: &dyn Pattern,
    tick:    Tick,
    world:   &mut World,
    events:  &mut EventLog,
    rng:     &mut SimRng,
) -> TickReport {
    let before = events.total_appended();
    let ids: Vec<ThreadId> = world.thread_ids().collect();

    let mut ctx = StepContext::new(tick, &mut world.threads, &mut world.resources, events, rng);
    for id in ids {
        if ctx.was_moved(id) {
            continue;
        }
        ctx.act_as(id);
        match ctx.thread(id).state {
            ThreadState::Running => on_running(pattern, id, &mut ctx),
            ThreadState::Waiting => on_waiting(pattern, id, &mut ctx),
            ThreadState::Blocked => on_blocked(pattern, id, &mut ctx),
            ThreadState::New | ThreadState::Ready | ThreadState::Terminated => {}
        }
    }
    drop(ctx);

    assert_consistent(world, tick);

    let report = TickReport {
        tick,
        events:  events.total_appended() - before,
        blocked: world.count_in_state(ThreadState::Blocked),
    };
    tracing::debug!(%tick, events = report.events, blocked = report.blocked, "tick complete");
    report
}

/// Terminate each of `ids` in order, skipping those already terminated.
pub(crate) fn terminate_threads(
    pattern: &dyn Pattern,
    tick:    Tick,
    world:   &mut World,
    events:  &mut EventLog,
    rng:     &mut SimRng,
    ids:     &[ThreadId],
    reason:  &str,
) {
    let mut ctx = StepContext::new(tick, &mut world.threads, &mut world.resources, events, rng);
    for &id in ids {
        terminate(pattern, id, &mut ctx, reason);
    }
    drop(ctx);
    assert_consistent(world, tick);
}

/// Terminate one thread.  A no-op if it already is.
///
/// The pattern undoes its own bookkeeping first; then every held resource
/// is released and every wait queue left, so no resource references the
/// thread afterwards.
fn terminate(pattern: &dyn Pattern, id: ThreadId, ctx: &mut StepContext<'_>, reason: &str) {
    if ctx.thread(id).state == ThreadState::Terminated {
        return;
    }
    ctx.act_as(id);
    pattern.withdraw(id, ctx);
    ctx.release_all(id);
    ctx.unpark(id);
    ctx.set_state(id, ThreadState::Terminated);
    let desc = format!("{} terminated: {reason}", ctx.thread(id).name);
    ctx.emit(EventKind::ThreadTerminated, Some(id), None, desc);
}

// ── State handlers ────────────────────────────────────────────────────────────

fn on_running(pattern: &dyn Pattern, id: ThreadId, ctx: &mut StepContext<'_>) {
    let idle = ctx.thread(id).held.is_empty();
    if idle && !ctx.decide(pattern.probabilities().demand) {
        return;
    }
    match pattern.attempt(id, ctx) {
        Attempt::Idle | Attempt::Partial => {}
        Attempt::Complete => {
            start_work(pattern, id, ctx);
        }
        Attempt::Contended { on, kind, reason } => {
            ctx.block(id, on, kind, reason);
        }
    }
}

fn on_waiting(pattern: &dyn Pattern, id: ThreadId, ctx: &mut StepContext<'_>) {
    if !pattern.finishes(id, ctx) {
        return;
    }
    pattern.release(id, ctx);
    ctx.set_state(id, ThreadState::Running);
    let desc = format!("{} finished and is running again", ctx.thread(id).name);
    ctx.emit(EventKind::ThreadResumed, Some(id), None, desc);
}

fn on_blocked(pattern: &dyn Pattern, id: ThreadId, ctx: &mut StepContext<'_>) {
    match pattern.attempt(id, ctx) {
        Attempt::Idle => {}
        Attempt::Contended { on, kind, reason } => {
            ctx.block(id, on, kind, reason);
        }
        Attempt::Partial => {
            let desc = format!("{} unblocked", ctx.thread(id).name);
            ctx.resume(id, desc);
        }
        Attempt::Complete => {
            ctx.unpark(id);
            if !start_work(pattern, id, ctx) {
                let desc = format!("{} unblocked", ctx.thread(id).name);
                ctx.resume(id, desc);
            }
        }
    }
}

/// RUNNING → WAITING with the pattern's work probability.  Returns whether
/// the thread started working.
fn start_work(pattern: &dyn Pattern, id: ThreadId, ctx: &mut StepContext<'_>) -> bool {
    let p = pattern.work_probability(ctx.thread(id));
    if !ctx.decide(p) {
        return false;
    }
    let (kind, desc) = pattern.work_event(ctx.thread(id), ctx);
    ctx.set_state(id, ThreadState::Waiting);
    ctx.emit(kind, Some(id), None, desc);
    true
}

/// A broken invariant is a bug in pattern or engine code, never a runtime
/// condition.  Checked in debug builds only.
fn assert_consistent(world: &World, tick: Tick) {
    if cfg!(debug_assertions) {
        if let Err(violation) = world.check_invariants() {
            panic!("{tick}: {violation}");
        }
    }
}
