use std::f32::consts::FRAC_PI_2;

use tv_core::{PatternKind, Placement, Probabilities, ResourceId, ThreadId, Vec2, Viewport};
use tv_entity::{EventKind, Placements, ResourceKind, Role, Thread, World};

use super::half_arc;
use crate::{Attempt, Pattern, StepContext};

const BUFFER: ResourceId = ResourceId(0);

/// Bounded buffer: producers add one item per attempt while it has space,
/// consumers remove one while it has items.  Nothing is held across ticks.
#[derive(Debug, Clone)]
pub struct ProducerConsumer {
    pub producers:     usize,
    pub consumers:     usize,
    pub buffer_size:   u32,
    pub probabilities: Probabilities,
}

impl ProducerConsumer {
    /// Half the threads (rounded down) produce; the rest consume.
    pub fn new(thread_count: usize, buffer_size: u32, probabilities: Probabilities) -> Self {
        let producers = thread_count / 2;
        Self { producers, consumers: thread_count - producers, buffer_size, probabilities }
    }
}

impl Pattern for ProducerConsumer {
    fn kind(&self) -> PatternKind {
        PatternKind::ProducerConsumer
    }

    fn probabilities(&self) -> Probabilities {
        self.probabilities
    }

    fn populate(&self, world: &mut World) {
        world.add_counting_resource("Buffer", ResourceKind::Buffer, self.buffer_size);
        for i in 0..self.producers {
            world.add_thread(format!("Producer {}", i + 1), Role::Producer);
        }
        for i in 0..self.consumers {
            world.add_thread(format!("Consumer {}", i + 1), Role::Consumer);
        }
    }

    /// Producers on a left semicircle, consumers mirrored on the right,
    /// buffer in the middle.
    fn arrange(&self, world: &World, viewport: &Viewport) -> Placements {
        let c = viewport.center();
        let r = viewport.half_extent() * 0.6;
        let side = |n: usize, sign: f32| {
            half_arc(-FRAC_PI_2, n)
                .map(move |a| Placement::at(Vec2::new(c.x + sign * a.cos() * r, c.y + a.sin() * r)))
        };
        let mut threads: Vec<Placement> = side(self.producers, -1.0).collect();
        threads.extend(side(self.consumers, 1.0));
        debug_assert_eq!(threads.len(), world.threads.len());

        Placements { threads, resources: vec![Placement::at(c); world.resources.len()] }
    }

    fn attempt(&self, thread: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        let name = ctx.thread(thread).name.clone();
        let buffer = ctx.resource(BUFFER);
        let (count, cap) = (buffer.count(), self.buffer_size);
        let (has_space, has_items) = (buffer.has_space(), buffer.has_items());

        match ctx.thread(thread).role {
            Role::Producer if has_space => {
                ctx.set_count(BUFFER, count + 1);
                ctx.emit(
                    EventKind::BufferItemAdded,
                    Some(thread),
                    Some(BUFFER),
                    format!("{name} added item to buffer ({}/{cap})", count + 1),
                );
                Attempt::Complete
            }
            Role::Producer => Attempt::blocked(BUFFER, format!("{name} is blocked (buffer full)")),
            _ if has_items => {
                ctx.set_count(BUFFER, count - 1);
                ctx.emit(
                    EventKind::BufferItemRemoved,
                    Some(thread),
                    Some(BUFFER),
                    format!("{name} removed item from buffer ({}/{cap})", count - 1),
                );
                Attempt::Complete
            }
            _ => Attempt::blocked(BUFFER, format!("{name} is blocked (buffer empty)")),
        }
    }

    fn work_event(&self, thread: &Thread, _ctx: &StepContext<'_>) -> (EventKind, String) {
        (EventKind::ThreadWaiting, format!("{} is sleeping", thread.name))
    }
}
