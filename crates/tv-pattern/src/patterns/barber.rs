use std::f32::consts::FRAC_PI_2;

use tv_core::{PatternKind, Placement, Probabilities, ResourceId, ThreadId, Vec2, Viewport};
use tv_entity::{EventKind, Placements, ResourceKind, ResourceState, Role, Thread, ThreadState, World};

use super::half_arc;
use crate::{Attempt, Pattern, StepContext};

const CHAIR: ResourceId = ResourceId(0);
const ROOM: ResourceId = ResourceId(1);

/// A barber, a chair, and a waiting room of fixed size.
///
/// A customer who finds a free seat takes it and waits on the chair; one who
/// finds the room full waits on the room.  The barber sleeps on the room
/// while it is empty, otherwise seats the customer at the front of the
/// chair's queue and cuts.  The haircut ends when the barber finishes, never
/// when the customer does.
#[derive(Debug, Clone)]
pub struct SleepingBarber {
    pub customers:         usize,
    pub waiting_room_size: u32,
    pub probabilities:     Probabilities,
}

impl SleepingBarber {
    /// One barber; every other thread is a customer.
    pub fn new(thread_count: usize, waiting_room_size: u32, probabilities: Probabilities) -> Self {
        Self { customers: thread_count - 1, waiting_room_size, probabilities }
    }

    fn seat_next(&self, barber: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        let room = ctx.resource(ROOM);
        let next = ctx.resource(CHAIR).waiting.front().filter(|_| room.has_items());
        let Some(customer) = next else {
            let name = ctx.thread(barber).name.clone();
            return Attempt::Contended {
                on:     ROOM,
                kind:   EventKind::BarberSleeping,
                reason: format!("{name} is sleeping"),
            };
        };

        let left = room.count() - 1;
        ctx.set_count(ROOM, left);
        let name = ctx.thread(customer).name.clone();
        ctx.grant(customer, CHAIR, ResourceState::Locked, format!("{name} sat in the barber chair"));
        ctx.set_state(customer, ThreadState::Waiting);
        ctx.emit(EventKind::ThreadWaiting, Some(customer), None, format!("{name} is getting a haircut"));
        Attempt::Complete
    }

    fn seat_customer(&self, customer: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        let name = ctx.thread(customer).name.clone();
        let waiting = format!("{name} is waiting for the barber");
        if ctx.thread(customer).is_waiting_on(CHAIR) {
            return Attempt::blocked(CHAIR, waiting);
        }

        let room = ctx.resource(ROOM);
        if !room.has_space() {
            return Attempt::blocked(ROOM, format!("{name} found the waiting room full"));
        }
        let seated = room.count() + 1;
        ctx.set_count(ROOM, seated);
        ctx.emit(
            EventKind::CustomerArrived,
            Some(customer),
            Some(ROOM),
            format!("{name} took a seat in the waiting room ({seated}/{})", self.waiting_room_size),
        );
        Attempt::blocked(CHAIR, waiting)
    }

    fn in_chair(ctx: &StepContext<'_>) -> Option<ThreadId> {
        ctx.resource(CHAIR).holders.first().copied()
    }
}

impl Pattern for SleepingBarber {
    fn kind(&self) -> PatternKind {
        PatternKind::SleepingBarber
    }

    fn probabilities(&self) -> Probabilities {
        self.probabilities
    }

    fn populate(&self, world: &mut World) {
        world.add_resource("Barber Chair", ResourceKind::Lock);
        world.add_counting_resource("Waiting Room", ResourceKind::Buffer, self.waiting_room_size);
        world.add_thread("Barber", Role::Barber);
        for i in 0..self.customers {
            world.add_thread(format!("Customer {}", i + 1), Role::Customer);
        }
    }

    /// Chair in the middle, waiting room below it, barber to its left,
    /// customers on a wide arc to the right.
    fn arrange(&self, _world: &World, viewport: &Viewport) -> Placements {
        let c = viewport.center();
        let r = viewport.half_extent() * 0.7;
        let mut threads = vec![Placement::at(c - Vec2::new(100.0, 0.0))];
        threads.extend(
            half_arc(-FRAC_PI_2, self.customers)
                .map(|a| Placement::at(Vec2::new(c.x + a.cos() * r, c.y - a.sin() * r))),
        );
        Placements {
            threads,
            resources: vec![Placement::at(c), Placement::at(c + Vec2::new(0.0, 100.0))],
        }
    }

    fn attempt(&self, thread: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
        match ctx.thread(thread).role {
            Role::Barber => self.seat_next(thread, ctx),
            _            => self.seat_customer(thread, ctx),
        }
    }

    /// The barber always starts cutting once a customer is seated.
    fn work_probability(&self, thread: &Thread) -> f64 {
        match thread.role {
            Role::Barber => 1.0,
            _            => self.probabilities.work,
        }
    }

    fn work_event(&self, thread: &Thread, ctx: &StepContext<'_>) -> (EventKind, String) {
        let desc = match Self::in_chair(ctx) {
            Some(c) => format!("{} is cutting {}'s hair", thread.name, ctx.thread(c).name),
            None    => format!("{} is cutting hair", thread.name),
        };
        (EventKind::BarberServing, desc)
    }

    fn finishes(&self, thread: ThreadId, ctx: &mut StepContext<'_>) -> bool {
        ctx.thread(thread).role == Role::Barber && ctx.decide(self.probabilities.finish)
    }

    /// Finishing a haircut frees the customer in the chair.
    fn release(&self, _barber: ThreadId, ctx: &mut StepContext<'_>) {
        let Some(customer) = Self::in_chair(ctx) else { return };
        let name = ctx.thread(customer).name.clone();
        ctx.release(customer, CHAIR, format!("{name} left the barber chair"));
        ctx.set_state(customer, ThreadState::Running);
        ctx.emit(EventKind::CustomerServed, Some(customer), Some(CHAIR), format!("{name} got a haircut"));
    }

    /// A departing barber sends the customer in the chair home; a departing
    /// customer gives up its seat.
    fn withdraw(&self, thread: ThreadId, ctx: &mut StepContext<'_>) {
        if ctx.thread(thread).role == Role::Barber {
            self.release(thread, ctx);
            return;
        }
        if ctx.thread(thread).is_waiting_on(CHAIR) {
            let left = ctx.resource(ROOM).count().saturating_sub(1);
            ctx.set_count(ROOM, left);
        }
    }
}
