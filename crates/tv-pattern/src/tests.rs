//! Unit tests for tv-pattern.

use tv_core::{PatternKind, Probabilities, SimConfig, SimRng, ThreadId, Tick};
use tv_entity::{EventLog, ThreadState, World};

use crate::{Attempt, Blueprint, StepContext, build};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn blueprint(kind: PatternKind) -> Blueprint {
    build(&SimConfig::new(kind)).expect("default config is valid")
}

/// Every thread RUNNING, as after `start`.
fn started(kind: PatternKind) -> Blueprint {
    let mut bp = blueprint(kind);
    for t in &mut bp.world.threads {
        t.state = ThreadState::Running;
    }
    bp
}

fn context<'a>(world: &'a mut World, log: &'a mut EventLog, rng: &'a mut SimRng) -> StepContext<'a> {
    StepContext::new(Tick(1), &mut world.threads, &mut world.resources, log, rng)
}

/// Run one attempt and park the thread on contention, as the engine does.
fn act(bp: &Blueprint, thread: ThreadId, ctx: &mut StepContext<'_>) -> Attempt {
    ctx.act_as(thread);
    let outcome = bp.pattern.attempt(thread, ctx);
    if let Attempt::Contended { on, kind, reason } = &outcome {
        ctx.block(thread, *on, *kind, reason.clone());
    }
    outcome
}

// ── Factory ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod factory {
    use tv_core::{PatternKind, Probabilities, SimConfig, Viewport};
    use tv_entity::{ResourceState, Role, ThreadState};

    use super::blueprint;
    use crate::{MAX_THREADS, build, validate};

    #[test]
    fn every_pattern_builds_fresh() {
        for kind in PatternKind::ALL {
            let bp = blueprint(kind);
            assert_eq!(bp.pattern.kind(), kind);
            assert!(bp.world.threads.iter().all(|t| t.state == ThreadState::New));
            assert!(bp.world.resources.iter().all(|r| r.state == ResourceState::Free));
            assert!(bp.world.resources.iter().all(|r| r.count() == 0));
            assert!(bp.world.check_invariants().is_ok());
            assert_eq!(bp.world.placements.threads.len(), bp.world.threads.len());
            assert_eq!(bp.world.placements.resources.len(), bp.world.resources.len());
        }
    }

    #[test]
    fn arrangement_is_settled_and_inside_viewport() {
        let vp = Viewport::default();
        for kind in PatternKind::ALL {
            let bp = blueprint(kind);
            for node in bp.world.placements.nodes() {
                let p = bp.world.placements.get(node).copied().unwrap_or_else(|| panic!("{node}"));
                assert!(p.is_settled());
                assert!(vp.contains(p.position), "{kind}: {node} at {:?}", p.position);
            }
        }
    }

    #[test]
    fn role_split() {
        let roles = |kind, n| {
            let mut cfg = SimConfig::new(kind);
            cfg.thread_count = n;
            build(&cfg).map(|bp| bp.world.threads.iter().map(|t| t.role).collect::<Vec<_>>())
        };
        let pc = roles(PatternKind::ProducerConsumer, 5).unwrap();
        assert_eq!(pc.iter().filter(|&&r| r == Role::Producer).count(), 2);
        assert_eq!(pc.iter().filter(|&&r| r == Role::Consumer).count(), 3);

        let rw = roles(PatternKind::ReaderWriter, 6).unwrap();
        assert_eq!(rw.iter().filter(|&&r| r == Role::Reader).count(), 4);
        assert_eq!(rw.iter().filter(|&&r| r == Role::Writer).count(), 2);

        let barber = roles(PatternKind::SleepingBarber, 5).unwrap();
        assert_eq!(barber[0], Role::Barber);
        assert_eq!(barber.len(), 5);
    }

    #[test]
    fn smokers_follow_ingredient_types() {
        let mut cfg = SimConfig::new(PatternKind::CigaretteSmokers);
        cfg.ingredient_types = 4;
        let bp = build(&cfg).unwrap();
        assert_eq!(bp.world.threads.len(), 5);
        assert_eq!(bp.world.resources.len(), 5);
        assert_eq!(bp.world.resources[0].capacity, Some(3));
        assert_eq!(bp.world.resources[4].name, "Lighter");
    }

    #[test]
    fn dining_forks_and_names() {
        let bp = blueprint(PatternKind::DiningPhilosophers);
        assert_eq!(bp.world.resources.len(), 5);
        assert_eq!(bp.world.threads[0].name, "Philosopher 1");
        assert_eq!(bp.world.resources[4].name, "Fork 5");
    }

    #[test]
    fn rejects_out_of_domain() {
        fn with(kind: PatternKind, f: impl Fn(&mut SimConfig)) -> tv_core::TvResult<()> {
            let mut cfg = SimConfig::new(kind);
            f(&mut cfg);
            validate(&cfg)
        }
        assert!(with(PatternKind::DiningPhilosophers, |c| c.thread_count = 1).is_err());
        assert!(with(PatternKind::ProducerConsumer, |c| c.thread_count = MAX_THREADS + 1).is_err());
        assert!(with(PatternKind::ProducerConsumer, |c| c.buffer_size = 0).is_err());
        assert!(with(PatternKind::Barrier, |c| c.barrier_threshold = Some(5)).is_err());
        assert!(with(PatternKind::Barrier, |c| c.barrier_threshold = Some(0)).is_err());
        assert!(with(PatternKind::SleepingBarber, |c| c.waiting_room_size = 0).is_err());
        assert!(with(PatternKind::CigaretteSmokers, |c| c.ingredient_types = 6).is_err());
        assert!(with(PatternKind::CigaretteSmokers, |c| c.ingredient_types = 2).is_err());
        assert!(with(PatternKind::ReaderWriter, |c| c.max_events = 0).is_err());
        assert!(with(PatternKind::ReaderWriter, |c| c.max_steps = Some(0)).is_err());
        assert!(with(PatternKind::ReaderWriter, |c| c.max_duration_ms = Some(0)).is_err());
        assert!(with(PatternKind::ReaderWriter, |c| c.max_steps = Some(1)).is_ok());
        assert!(
            with(PatternKind::ReaderWriter, |c| {
                c.probabilities = Some(Probabilities::new(0.5, 1.5, 0.5));
            })
            .is_err()
        );
        assert!(with(PatternKind::ReaderWriter, |c| c.viewport = Viewport::new(100.0, 100.0, 60.0)).is_err());
    }

    #[test]
    fn accepts_domain_edges() {
        let mut cfg = SimConfig::new(PatternKind::ProducerConsumer);
        cfg.thread_count = 2;
        cfg.buffer_size = 1;
        assert!(validate(&cfg).is_ok());

        let mut cfg = SimConfig::new(PatternKind::Barrier);
        cfg.barrier_threshold = Some(1);
        assert!(validate(&cfg).is_ok());

        // Smokers ignore thread_count.
        let mut cfg = SimConfig::new(PatternKind::CigaretteSmokers);
        cfg.thread_count = 0;
        cfg.ingredient_types = 5;
        assert!(validate(&cfg).is_ok());
    }
}

// ── Patterns ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod producer_consumer {
    use tv_core::{PatternKind, ResourceId, SimConfig, SimRng, ThreadId};
    use tv_entity::{EventKind, EventLog, ThreadState};

    use super::{act, context};
    use crate::{Attempt, build};

    #[test]
    fn fills_then_blocks_then_drains() {
        let mut cfg = SimConfig::new(PatternKind::ProducerConsumer);
        cfg.thread_count = 2;
        cfg.buffer_size = 1;
        let mut bp = build(&cfg).unwrap();
        for t in &mut bp.world.threads {
            t.state = ThreadState::Running;
        }
        let (producer, consumer) = (ThreadId(0), ThreadId(1));
        let mut log = EventLog::new(100);
        let mut rng = SimRng::new(1);
        let mut world = std::mem::take(&mut bp.world);
        let mut ctx = context(&mut world, &mut log, &mut rng);

        assert_eq!(act(&bp, producer, &mut ctx), Attempt::Complete);
        assert_eq!(ctx.resource(ResourceId(0)).count(), 1);
        assert!(matches!(act(&bp, producer, &mut ctx), Attempt::Contended { .. }));
        assert_eq!(ctx.thread(producer).state, ThreadState::Blocked);

        assert_eq!(act(&bp, consumer, &mut ctx), Attempt::Complete);
        assert_eq!(ctx.resource(ResourceId(0)).count(), 0);
        drop(ctx);

        assert_eq!(log.count_of(EventKind::BufferItemAdded), 1);
        assert_eq!(log.count_of(EventKind::BufferItemRemoved), 1);
        assert_eq!(log.count_of(EventKind::ThreadBlocked), 1);
    }
}

#[cfg(test)]
mod dining {
    use tv_core::{PatternKind, ResourceId, SimRng, ThreadId};
    use tv_entity::EventLog;

    use super::{act, context, started};
    use crate::Attempt;

    #[test]
    fn one_fork_per_attempt() {
        let mut bp = started(PatternKind::DiningPhilosophers);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        assert_eq!(act(&bp, ThreadId(0), &mut ctx), Attempt::Partial);
        assert!(ctx.thread(ThreadId(0)).holds(ResourceId(0)));
        assert_eq!(act(&bp, ThreadId(0), &mut ctx), Attempt::Complete);
        assert!(ctx.thread(ThreadId(0)).holds(ResourceId(1)));
        // Already holding both: nothing more to take.
        assert_eq!(act(&bp, ThreadId(0), &mut ctx), Attempt::Complete);
    }

    #[test]
    fn blocks_holding_left() {
        let mut bp = started(PatternKind::DiningPhilosophers);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        assert_eq!(act(&bp, ThreadId(0), &mut ctx), Attempt::Partial);
        assert_eq!(act(&bp, ThreadId(1), &mut ctx), Attempt::Partial);
        let blocked = act(&bp, ThreadId(0), &mut ctx);
        assert!(matches!(blocked, Attempt::Contended { on, .. } if on == ResourceId(1)));

        let p0 = ctx.thread(ThreadId(0));
        assert!(p0.holds(ResourceId(0)));
        assert!(p0.is_waiting_on(ResourceId(1)));
        assert_eq!(ctx.resource(ResourceId(1)).waiting.front(), Some(ThreadId(0)));
    }

    #[test]
    fn last_philosopher_wraps_to_first_fork() {
        let mut bp = started(PatternKind::DiningPhilosophers);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        act(&bp, ThreadId(4), &mut ctx);
        act(&bp, ThreadId(4), &mut ctx);
        assert!(ctx.thread(ThreadId(4)).holds(ResourceId(4)));
        assert!(ctx.thread(ThreadId(4)).holds(ResourceId(0)));
    }
}

#[cfg(test)]
mod reader_writer {
    use tv_core::{PatternKind, ResourceId, SimRng, ThreadId};
    use tv_entity::{EventLog, ResourceState};

    use super::{act, context, started};
    use crate::Attempt;

    // Default split for six threads: readers are 0..4, writers 4..6.

    #[test]
    fn readers_share() {
        let mut bp = started(PatternKind::ReaderWriter);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        assert_eq!(act(&bp, ThreadId(0), &mut ctx), Attempt::Complete);
        assert_eq!(act(&bp, ThreadId(1), &mut ctx), Attempt::Complete);
        assert_eq!(ctx.resource(ResourceId(0)).holders.len(), 2);
        assert_eq!(ctx.resource(ResourceId(0)).state, ResourceState::Busy);
        assert!(matches!(act(&bp, ThreadId(4), &mut ctx), Attempt::Contended { .. }));
    }

    #[test]
    fn writer_excludes_everyone() {
        let mut bp = started(PatternKind::ReaderWriter);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        assert_eq!(act(&bp, ThreadId(4), &mut ctx), Attempt::Complete);
        assert_eq!(ctx.resource(ResourceId(0)).state, ResourceState::Locked);
        assert!(matches!(act(&bp, ThreadId(0), &mut ctx), Attempt::Contended { .. }));
        assert!(matches!(act(&bp, ThreadId(5), &mut ctx), Attempt::Contended { .. }));

        ctx.release_all(ThreadId(4));
        assert_eq!(ctx.resource(ResourceId(0)).state, ResourceState::Free);
        assert_eq!(act(&bp, ThreadId(0), &mut ctx), Attempt::Complete);
    }
}

#[cfg(test)]
mod barrier {
    use tv_core::{PatternKind, ResourceId, SimConfig, SimRng, ThreadId};
    use tv_entity::{EventKind, EventLog, ThreadState};

    use super::{act, context};
    use crate::{Attempt, build};

    #[test]
    fn last_arrival_releases_everyone() {
        let mut cfg = SimConfig::new(PatternKind::Barrier);
        cfg.thread_count = 3;
        let mut bp = build(&cfg).unwrap();
        for t in &mut bp.world.threads {
            t.state = ThreadState::Running;
        }
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        assert!(matches!(act(&bp, ThreadId(0), &mut ctx), Attempt::Contended { .. }));
        assert!(matches!(act(&bp, ThreadId(1), &mut ctx), Attempt::Contended { .. }));
        assert_eq!(ctx.resource(ResourceId(0)).count(), 2);
        // A parked worker retrying stays parked without arriving twice.
        assert!(matches!(act(&bp, ThreadId(0), &mut ctx), Attempt::Contended { .. }));
        assert_eq!(ctx.resource(ResourceId(0)).count(), 2);

        assert_eq!(act(&bp, ThreadId(2), &mut ctx), Attempt::Complete);
        assert_eq!(ctx.resource(ResourceId(0)).count(), 0);
        assert!(ctx.resource(ResourceId(0)).waiting.is_empty());
        assert_eq!(ctx.thread(ThreadId(0)).state, ThreadState::Running);
        assert_eq!(ctx.thread(ThreadId(1)).state, ThreadState::Running);
        assert!(ctx.was_moved(ThreadId(0)));
        drop(ctx);

        assert_eq!(log.count_of(EventKind::BarrierArrived), 3);
        assert_eq!(log.count_of(EventKind::BarrierReleased), 1);
        assert_eq!(log.count_of(EventKind::ThreadResumed), 2);
        assert!(world.check_invariants().is_ok());
    }
}

#[cfg(test)]
mod barber {
    use tv_core::{PatternKind, ResourceId, SimRng, ThreadId};
    use tv_entity::{EventKind, EventLog, ThreadState};

    use super::{act, context, started};
    use crate::Attempt;

    const CHAIR: ResourceId = ResourceId(0);
    const ROOM: ResourceId = ResourceId(1);
    const BARBER: ThreadId = ThreadId(0);

    #[test]
    fn sleeps_then_serves() {
        let mut bp = started(PatternKind::SleepingBarber);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        let sleeping = act(&bp, BARBER, &mut ctx);
        assert!(matches!(sleeping, Attempt::Contended { on, kind: EventKind::BarberSleeping, .. } if on == ROOM));

        assert!(matches!(act(&bp, ThreadId(1), &mut ctx), Attempt::Contended { on, .. } if on == CHAIR));
        assert!(matches!(act(&bp, ThreadId(2), &mut ctx), Attempt::Contended { on, .. } if on == CHAIR));
        assert_eq!(ctx.resource(ROOM).count(), 2);

        assert_eq!(act(&bp, BARBER, &mut ctx), Attempt::Complete);
        assert_eq!(ctx.resource(ROOM).count(), 1);
        assert!(ctx.resource(CHAIR).is_held_by(ThreadId(1)));
        assert_eq!(ctx.thread(ThreadId(1)).state, ThreadState::Waiting);
        assert!(ctx.thread(ThreadId(1)).waiting_for.is_empty());

        bp.pattern.release(BARBER, &mut ctx);
        assert!(ctx.resource(CHAIR).is_free());
        assert_eq!(ctx.thread(ThreadId(1)).state, ThreadState::Running);
        drop(ctx);
        assert_eq!(log.count_of(EventKind::CustomerArrived), 2);
        assert_eq!(log.count_of(EventKind::CustomerServed), 1);
    }

    #[test]
    fn full_room_turns_customers_away() {
        let mut cfg = tv_core::SimConfig::new(PatternKind::SleepingBarber);
        cfg.waiting_room_size = 1;
        let mut bp = crate::build(&cfg).unwrap();
        for t in &mut bp.world.threads {
            t.state = ThreadState::Running;
        }
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        act(&bp, ThreadId(1), &mut ctx);
        assert!(matches!(act(&bp, ThreadId(2), &mut ctx), Attempt::Contended { on, .. } if on == ROOM));
        assert_eq!(ctx.resource(ROOM).count(), 1);
    }

    #[test]
    fn customers_never_finish_their_own_haircut() {
        let mut bp = started(PatternKind::SleepingBarber);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);
        for _ in 0..50 {
            assert!(!bp.pattern.finishes(ThreadId(1), &mut ctx));
        }
    }
}

#[cfg(test)]
mod smokers {
    use tv_core::{PatternKind, ResourceId, SimRng, ThreadId};
    use tv_entity::{EventKind, EventLog, ResourceState};

    use super::{act, context, started};
    use crate::Attempt;

    const TABLE: ResourceId = ResourceId(0);

    #[test]
    fn only_the_matching_smoker_can_take() {
        let mut bp = started(PatternKind::CigaretteSmokers);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(7));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        assert_eq!(act(&bp, ThreadId(0), &mut ctx), Attempt::Complete);
        assert_eq!(ctx.resource(TABLE).count(), 2);
        let missing = (0..3)
            .find(|&i| ctx.resource(ResourceId(i + 1)).state == ResourceState::Free)
            .expect("exactly one ingredient stays off the table");
        let lucky = ThreadId(missing + 1);

        for s in 1..=3 {
            let smoker = ThreadId(s);
            if smoker != lucky {
                assert!(matches!(act(&bp, smoker, &mut ctx), Attempt::Contended { on, .. } if on == TABLE));
            }
        }
        assert_eq!(act(&bp, lucky, &mut ctx), Attempt::Complete);
        assert_eq!(ctx.thread(lucky).held.len(), 2);
        assert_eq!(ctx.resource(TABLE).count(), 0);

        // Table is clear but the ingredients are in hand: the agent waits.
        assert!(matches!(act(&bp, ThreadId(0), &mut ctx), Attempt::Contended { .. }));
        ctx.release_all(lucky);
        assert_eq!(act(&bp, ThreadId(0), &mut ctx), Attempt::Complete);
        drop(ctx);
        assert_eq!(log.count_of(EventKind::AgentSupplied), 2);
    }
}

#[cfg(test)]
mod step_context {
    use tv_core::{PatternKind, ResourceId, SimRng, ThreadId};
    use tv_entity::{EventKind, EventLog, ResourceState, ThreadState};

    use super::{context, started};

    #[test]
    fn block_is_silent_when_already_parked() {
        let mut bp = started(PatternKind::DiningPhilosophers);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        let (t, fork) = (ThreadId(0), ResourceId(0));
        assert!(ctx.block(t, fork, EventKind::ThreadBlocked, "first"));
        assert!(!ctx.block(t, fork, EventKind::ThreadBlocked, "again"));
        assert_eq!(ctx.resource(fork).waiting.len(), 1);

        // Moving to another resource leaves the first queue.
        assert!(ctx.block(t, ResourceId(1), EventKind::ThreadBlocked, "moved"));
        assert!(ctx.resource(fork).waiting.is_empty());
        assert_eq!(ctx.thread(t).waiting_for.len(), 1);
        drop(ctx);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn grant_and_release_keep_both_sides() {
        let mut bp = started(PatternKind::DiningPhilosophers);
        let mut world = std::mem::take(&mut bp.world);
        let (mut log, mut rng) = (EventLog::new(100), SimRng::new(1));
        let mut ctx = context(&mut world, &mut log, &mut rng);

        let (t, fork) = (ThreadId(2), ResourceId(2));
        ctx.block(t, fork, EventKind::ThreadBlocked, "wait");
        ctx.grant(t, fork, ResourceState::Locked, "take");
        assert!(ctx.thread(t).holds(fork));
        assert!(ctx.thread(t).waiting_for.is_empty());
        assert!(ctx.resource(fork).waiting.is_empty());
        ctx.set_state(t, ThreadState::Running);

        ctx.release(t, fork, "drop");
        assert!(ctx.resource(fork).is_free());
        assert_eq!(ctx.resource(fork).state, ResourceState::Free);
        // Releasing what is not held emits nothing.
        ctx.release(t, fork, "again");
        drop(ctx);
        assert_eq!(log.count_of(EventKind::ResourceReleased), 1);
        assert!(world.check_invariants().is_ok());
    }
}

#[test]
fn probabilities_override_reaches_pattern() {
    let mut cfg = SimConfig::new(PatternKind::DiningPhilosophers);
    cfg.probabilities = Some(Probabilities::new(1.0, 1.0, 0.0));
    let bp = build(&cfg).unwrap();
    assert_eq!(bp.pattern.probabilities().demand, 1.0);
}
