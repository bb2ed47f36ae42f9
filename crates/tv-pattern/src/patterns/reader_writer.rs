use std::f32::consts::FRAC_PI_2;

use tv_core::{PatternKind, Placement, Probabilities, ResourceId, ThreadId, Viewport};
use tv_entity::{EventKind, Placements, ResourceKind, ResourceState, Role, Thread, World};

use super::half_arc;
use crate::{Attempt, Pattern, StepContext};

const SHARED: ResourceId = ResourceId(0);

/// One shared resource: any number of readers may co-hold it, a writer
/// needs it to itself.  No preference between the two sides.
#[derive(Debug, Clone)]
pub struct ReaderWriter {
    pub readers:       usize,
    pub writers:       usize,
    pub probabilities: Probabilities,
}

impl ReaderWriter {
    /// Three quarters of the threads (rounded down) read; the rest write.
    pub fn new(thread_count: usize, probabilities: Probabilities) -> Self {
        let readers = 3 * thread_count / 4;
        Self { readers, writers: thread_count - readers, probabilities }
    }
}

impl Pattern for ReaderWriter {
    fn kind(&self) -> PatternKind {
        PatternKind::ReaderWriter
    }

    fn probabilities(&self) -> Probabilities {
        self.probabilities
    }

    fn populate(&self, world: &mut World) {
        world.add_resource("Shared Resource", ResourceKind::Lock);
        for i in 0..self.readers {
            world.add_thread(format!("Reader {}", i + 1), Role::Reader);
        }
        for i in 0..self.writers {
            world.add_thread(format!("Writer {}", i + 1), Role::Writer);
        }
    }

    /// Readers on the left half circle, writers on the right.
    fn arrange(&self, world: &World, viewport: &Viewport) -> Placements {
        let c = viewport.center();
        let r = viewport.half_extent() * 0.5;
        let readers = half_arc(FRAC_PI_2, self.readers);
        let writers = half_arc(-FRAC_PI_2, self.writers);
        Placements {
            threads: readers
                .chain(writers)
                .map(|a| Placement::at(tv_core::on_circle(c, r, a)))
                .collect(),
            resources: vec![Placement::at(c); world.resources.len()],
        }
    }

    fn attempt(&self, thread: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        let me = ctx.thread(thread);
        if me.holds(SHARED) {
            return Attempt::Complete;
        }
        let (name, role) = (me.name.clone(), me.role);
        let shared = ctx.resource(SHARED);

        if role == Role::Writer {
            if !shared.is_free() {
                return Attempt::blocked(SHARED, format!("{name} is waiting for exclusive access"));
            }
            ctx.grant(thread, SHARED, ResourceState::Locked, format!("{name} started writing"));
        } else {
            if shared.state == ResourceState::Locked {
                return Attempt::blocked(SHARED, format!("{name} is waiting for the writer to finish"));
            }
            ctx.grant(thread, SHARED, ResourceState::Busy, format!("{name} started reading"));
        }
        Attempt::Complete
    }

    fn work_event(&self, thread: &Thread, _ctx: &StepContext<'_>) -> (EventKind, String) {
        let verb = if thread.role == Role::Writer { "writing" } else { "reading" };
        (EventKind::ThreadWaiting, format!("{} is {verb}", thread.name))
    }
}
