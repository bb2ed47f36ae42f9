//! Unit tests for tv-core primitives.

#[cfg(test)]
mod ids {
    use crate::{NodeRef, ResourceId, ThreadId};

    #[test]
    fn index_roundtrip() {
        let id = ThreadId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(ThreadId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(ThreadId::INVALID.0, u32::MAX);
        assert_eq!(ResourceId::INVALID.0, u32::MAX);
        assert_eq!(ThreadId::default(), ThreadId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(ThreadId(7).to_string(), "ThreadId(7)");
        assert_eq!(NodeRef::Resource(ResourceId(2)).to_string(), "ResourceId(2)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{Placement, Vec2, Viewport, on_circle};

    #[test]
    fn default_viewport_center() {
        let vp = Viewport::default();
        assert_eq!(vp.center(), Vec2::new(400.0, 300.0));
        assert_eq!(vp.half_extent(), 300.0);
    }

    #[test]
    fn contains_and_clamp() {
        let vp = Viewport::default();
        assert!(vp.contains(Vec2::new(400.0, 300.0)));
        assert!(!vp.contains(Vec2::new(50.0, 300.0)));
        assert_eq!(vp.clamp(Vec2::new(50.0, 900.0)), Vec2::new(100.0, 500.0));
    }

    #[test]
    fn circle_points() {
        let p = on_circle(Vec2::ZERO, 10.0, 0.0);
        assert!((p - Vec2::new(10.0, 0.0)).length() < 1e-5);
        let q = on_circle(Vec2::ZERO, 10.0, std::f32::consts::FRAC_PI_2);
        assert!((q - Vec2::new(0.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn placement_at_is_settled() {
        assert!(Placement::at(Vec2::new(1.0, 2.0)).is_settled());
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(15).since(Tick(5)), 10);
    }

    #[test]
    fn clock_start_rewinds() {
        let mut clock = SimClock::new();
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_tick, Tick(2));
        clock.start();
        assert_eq!(clock.current_tick, Tick::ZERO);
        assert!(clock.started_at_ms.is_some());
        assert!(clock.ended_at_ms.is_none());
    }

    #[test]
    fn unstarted_clock_has_no_elapsed_time() {
        assert_eq!(SimClock::new().elapsed_ms(), 0);
    }
}

#[cfg(test)]
mod config {
    use crate::{PatternKind, Probabilities, SimConfig};

    #[test]
    fn defaults_follow_pattern() {
        assert_eq!(SimConfig::new(PatternKind::DiningPhilosophers).thread_count, 5);
        assert_eq!(SimConfig::new(PatternKind::ReaderWriter).thread_count, 6);
        assert_eq!(SimConfig::default().pattern, PatternKind::ProducerConsumer);
    }

    #[test]
    fn override_wins_over_default() {
        let mut cfg = SimConfig::new(PatternKind::ProducerConsumer);
        assert_eq!(cfg.effective_probabilities().work, 0.3);
        cfg.probabilities = Some(Probabilities::new(1.0, 0.0, 0.0));
        assert_eq!(cfg.effective_probabilities().work, 0.0);
    }

    #[test]
    fn barrier_threshold_defaults_to_thread_count() {
        let mut cfg = SimConfig::new(PatternKind::Barrier);
        assert_eq!(cfg.effective_barrier_threshold(), 4);
        cfg.barrier_threshold = Some(2);
        assert_eq!(cfg.effective_barrier_threshold(), 2);
    }

    #[test]
    fn invalid_probability_reported() {
        assert_eq!(Probabilities::new(0.5, 0.5, 0.5).first_invalid(), None);
        assert_eq!(Probabilities::new(0.5, 1.5, 0.5).first_invalid(), Some(("work", 1.5)));
        assert!(Probabilities::new(f64::NAN, 0.5, 0.5).first_invalid().is_some());
    }
}

#[cfg(all(test, feature = "serde"))]
mod config_file {
    use crate::{PatternKind, Probabilities, SimConfig};

    fn parse(json: &str) -> SimConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_fields_take_the_named_patterns_defaults() {
        for kind in PatternKind::ALL {
            let name = serde_json::to_string(&kind).unwrap();
            let cfg = parse(&format!(r#"{{"pattern":{name}}}"#));
            assert_eq!(cfg, SimConfig::new(kind), "{kind}");
        }
        assert_eq!(parse(r#"{"pattern":"READER_WRITER"}"#).thread_count, 6);
        assert_eq!(parse(r#"{"pattern":"SLEEPING_BARBER"}"#).thread_count, 5);
    }

    #[test]
    fn empty_object_is_producer_consumer() {
        assert_eq!(parse("{}"), SimConfig::default());
    }

    #[test]
    fn given_fields_override_defaults() {
        let cfg = parse(
            r#"{"pattern":"BARRIER","thread_count":8,"seed":9,
                "probabilities":{"demand":1.0,"work":0.5,"finish":0.5}}"#,
        );
        assert_eq!(cfg.pattern, PatternKind::Barrier);
        assert_eq!(cfg.thread_count, 8);
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.probabilities, Some(Probabilities::new(1.0, 0.5, 0.5)));
        assert_eq!(cfg.buffer_size, SimConfig::new(PatternKind::Barrier).buffer_size);
    }

    #[test]
    fn explicit_null_clears_an_optional_field() {
        assert_eq!(parse(r#"{"pattern":"BARRIER"}"#).max_steps, Some(100));
        assert_eq!(parse(r#"{"pattern":"BARRIER","max_steps":null}"#).max_steps, None);
    }

    #[test]
    fn serialized_config_reads_back() {
        let mut cfg = SimConfig::new(PatternKind::CigaretteSmokers);
        cfg.ingredient_types = 5;
        cfg.max_steps = None;
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(parse(&json), cfg);
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            assert_eq!(r1.decide(0.5), r2.decide(0.5));
            assert_eq!(r1.pick(7), r2.pick(7));
        }
    }

    #[test]
    fn reseed_restarts_stream() {
        let mut r = SimRng::new(9);
        let first: Vec<bool> = (0..32).map(|_| r.decide(0.5)).collect();
        r.reseed(9);
        let again: Vec<bool> = (0..32).map(|_| r.decide(0.5)).collect();
        assert_eq!(first, again);
        assert_eq!(r.seed(), 9);
    }

    #[test]
    fn decide_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.decide(0.0));
        assert!(rng.decide(1.0));
        assert!(!rng.decide(f64::NAN));
    }

    #[test]
    fn pick_in_bounds() {
        let mut rng = SimRng::new(0);
        for _ in 0..1000 {
            assert!(rng.pick(3) < 3);
        }
    }
}
