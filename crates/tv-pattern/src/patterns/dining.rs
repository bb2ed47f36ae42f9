use tv_core::{PatternKind, Placement, Probabilities, ResourceId, ThreadId, Viewport};
use tv_entity::{EventKind, Placements, ResourceKind, ResourceState, Role, Thread, World};

use super::{ring, ring_offset};
use crate::{Attempt, Pattern, StepContext};

/// Philosophers around a table, one fork between each pair.
///
/// Philosopher `i` needs fork `i` (left) and fork `i + 1` (right, wrapping).
/// Forks are taken one per tick, left first, and a philosopher blocked on
/// the right fork keeps holding the left one.  Nothing breaks the resulting
/// circular wait.
#[derive(Debug, Clone)]
pub struct DiningPhilosophers {
    pub seats:         usize,
    pub probabilities: Probabilities,
}

impl DiningPhilosophers {
    pub fn new(seats: usize, probabilities: Probabilities) -> Self {
        Self { seats, probabilities }
    }

    #[inline]
    pub fn left_fork(&self, philosopher: ThreadId) -> ResourceId {
        ResourceId(philosopher.0)
    }

    #[inline]
    pub fn right_fork(&self, philosopher: ThreadId) -> ResourceId {
        ResourceId(((philosopher.index() + 1) % self.seats) as u32)
    }
}

impl Pattern for DiningPhilosophers {
    fn kind(&self) -> PatternKind {
        PatternKind::DiningPhilosophers
    }

    fn probabilities(&self) -> Probabilities {
        self.probabilities
    }

    fn populate(&self, world: &mut World) {
        for i in 0..self.seats {
            world.add_resource(format!("Fork {}", i + 1), ResourceKind::Lock);
        }
        for i in 0..self.seats {
            world.add_thread(format!("Philosopher {}", i + 1), Role::Philosopher);
        }
    }

    /// Philosophers on a ring; fork `i` sits just inside it, between
    /// philosopher `i - 1` and philosopher `i`.
    fn arrange(&self, _world: &World, viewport: &Viewport) -> Placements {
        let c = viewport.center();
        let r = viewport.half_extent() * 0.6;
        Placements {
            threads:   ring(c, r, self.seats).map(Placement::at).collect(),
            resources: ring_offset(c, r * 0.8, self.seats, -0.5).map(Placement::at).collect(),
        }
    }

    fn attempt(&self, thread: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        let (left, right) = (self.left_fork(thread), self.right_fork(thread));
        let me = ctx.thread(thread);
        let name = me.name.clone();

        let (fork, side) = match (me.holds(left), me.holds(right)) {
            (true, true)  => return Attempt::Complete,
            (false, _)    => (left, "left"),
            (true, false) => (right, "right"),
        };

        let fork_name = ctx.resource(fork).name.clone();
        if !ctx.resource(fork).is_free() {
            return Attempt::blocked(fork, format!("{name} is waiting for {side} fork ({fork_name})"));
        }

        ctx.grant(thread, fork, ResourceState::Locked, format!("{name} picked up {side} fork ({fork_name})"));
        if fork == right { Attempt::Complete } else { Attempt::Partial }
    }

    fn work_event(&self, thread: &Thread, _ctx: &StepContext<'_>) -> (EventKind, String) {
        (EventKind::ThreadWaiting, format!("{} is eating", thread.name))
    }

    fn release(&self, thread: ThreadId, ctx: &mut StepContext<'_>) {
        let name = ctx.thread(thread).name.clone();
        for (fork, side) in [(self.left_fork(thread), "left"), (self.right_fork(thread), "right")] {
            let fork_name = ctx.resource(fork).name.clone();
            ctx.release(thread, fork, format!("{name} put down {side} fork ({fork_name})"));
        }
    }
}
