use tv_core::{PatternKind, Placement, Probabilities, ResourceId, ThreadId, Viewport};
use tv_entity::{EventKind, Placements, ResourceKind, Role, World};

use super::ring;
use crate::{Attempt, Pattern, StepContext};

const BARRIER: ResourceId = ResourceId(0);

/// Workers meet at a barrier.  Each arrival bumps the count and parks;
/// the arrival that reaches `threshold` resets it and releases everyone.
#[derive(Debug, Clone)]
pub struct Barrier {
    pub workers:       usize,
    pub threshold:     u32,
    pub probabilities: Probabilities,
}

impl Barrier {
    pub fn new(workers: usize, threshold: u32, probabilities: Probabilities) -> Self {
        Self { workers, threshold, probabilities }
    }
}

impl Pattern for Barrier {
    fn kind(&self) -> PatternKind {
        PatternKind::Barrier
    }

    fn probabilities(&self) -> Probabilities {
        self.probabilities
    }

    fn populate(&self, world: &mut World) {
        world.add_counting_resource("Barrier", ResourceKind::Barrier, self.threshold);
        for i in 0..self.workers {
            world.add_thread(format!("Thread {}", i + 1), Role::Worker);
        }
    }

    fn arrange(&self, world: &World, viewport: &Viewport) -> Placements {
        let c = viewport.center();
        Placements {
            threads:   ring(c, viewport.half_extent() * 0.6, self.workers).map(Placement::at).collect(),
            resources: vec![Placement::at(c); world.resources.len()],
        }
    }

    fn attempt(&self, thread: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        let name = ctx.thread(thread).name.clone();
        let waiting = format!("{name} is waiting at the barrier");

        // Already arrived: only a release frees it.
        if ctx.thread(thread).is_waiting_on(BARRIER) {
            return Attempt::blocked(BARRIER, waiting);
        }

        let arrived = ctx.resource(BARRIER).count() + 1;
        ctx.set_count(BARRIER, arrived);
        ctx.emit(
            EventKind::BarrierArrived,
            Some(thread),
            Some(BARRIER),
            format!("{name} arrived at the barrier ({arrived}/{})", self.threshold),
        );
        if arrived < self.threshold {
            return Attempt::blocked(BARRIER, waiting);
        }

        ctx.set_count(BARRIER, 0);
        ctx.emit(
            EventKind::BarrierReleased,
            Some(thread),
            Some(BARRIER),
            format!("Barrier released by {name}"),
        );
        let parked: Vec<ThreadId> = ctx.resource(BARRIER).waiting.iter().collect();
        for t in parked {
            let desc = format!("{} passed the barrier", ctx.thread(t).name);
            ctx.resume(t, desc);
        }
        Attempt::Complete
    }

    /// A parked worker takes its arrival with it.
    fn withdraw(&self, thread: ThreadId, ctx: &mut StepContext<'_>) {
        if ctx.thread(thread).is_waiting_on(BARRIER) {
            let count = ctx.resource(BARRIER).count().saturating_sub(1);
            ctx.set_count(BARRIER, count);
        }
    }
}
