//! The pattern factory: validate a [`SimConfig`], pick the [`Pattern`], and
//! build its world in the canonical arrangement.

use tv_core::{PatternKind, SimConfig, TvError, TvResult};
use tv_entity::World;

use crate::Pattern;
use crate::patterns::{
    Barrier, CigaretteSmokers, DiningPhilosophers, ProducerConsumer, ReaderWriter, SleepingBarber,
};

/// Upper bound on `thread_count` for every pattern.
pub const MAX_THREADS: usize = 32;

/// Valid `ingredient_types` for cigarette smokers.
pub const INGREDIENT_RANGE: std::ops::RangeInclusive<u32> = 3..=5;

/// A freshly built simulation: the pattern chosen for its lifetime, and a
/// world with every thread NEW, every resource FREE, and every node at its
/// canonical position.
pub struct Blueprint {
    pub pattern: Box<dyn Pattern>,
    pub world:   World,
}

/// Reject any configuration outside the chosen pattern's domain.
///
/// Nothing is clamped: an out-of-range value is a [`TvError::Config`] and
/// no entity is built.
pub fn validate(config: &SimConfig) -> TvResult<()> {
    let fail = |msg: String| Err(TvError::Config(msg));
    let kind = config.pattern;
    let n = config.thread_count;

    if kind != PatternKind::CigaretteSmokers && !(2..=MAX_THREADS).contains(&n) {
        return fail(format!("{kind} needs between 2 and {MAX_THREADS} threads, got {n}"));
    }
    match kind {
        PatternKind::ProducerConsumer if config.buffer_size == 0 => {
            return fail("buffer size must be at least 1".into());
        }
        PatternKind::Barrier => {
            let threshold = config.effective_barrier_threshold();
            if threshold == 0 || threshold as usize > n {
                return fail(format!("barrier threshold must be in 1..={n}, got {threshold}"));
            }
        }
        PatternKind::SleepingBarber if config.waiting_room_size == 0 => {
            return fail("waiting room size must be at least 1".into());
        }
        PatternKind::CigaretteSmokers if !INGREDIENT_RANGE.contains(&config.ingredient_types) => {
            return fail(format!(
                "ingredient types must be in {}..={}, got {}",
                INGREDIENT_RANGE.start(),
                INGREDIENT_RANGE.end(),
                config.ingredient_types,
            ));
        }
        _ => {}
    }

    if config.max_events == 0 {
        return fail("max_events must be at least 1".into());
    }
    if config.max_steps == Some(0) {
        return fail("max_steps must be at least 1; use no step budget for an unbounded run".into());
    }
    if config.max_duration_ms == Some(0) {
        return fail("max_duration_ms must be at least 1".into());
    }
    if let Some((name, p)) = config.effective_probabilities().first_invalid() {
        return fail(format!("{name} probability must be in [0, 1], got {p}"));
    }
    let vp = &config.viewport;
    let usable = vp.width.is_finite()
        && vp.height.is_finite()
        && vp.padding >= 0.0
        && vp.width > 2.0 * vp.padding
        && vp.height > 2.0 * vp.padding;
    if !usable {
        return fail(format!(
            "viewport {}x{} with padding {} leaves no drawable area",
            vp.width, vp.height, vp.padding,
        ));
    }
    Ok(())
}

/// Instantiate the pattern for a validated `config`.
fn instantiate(config: &SimConfig) -> Box<dyn Pattern> {
    let probs = config.effective_probabilities();
    let n = config.thread_count;
    match config.pattern {
        PatternKind::ProducerConsumer => Box::new(ProducerConsumer::new(n, config.buffer_size, probs)),
        PatternKind::DiningPhilosophers => Box::new(DiningPhilosophers::new(n, probs)),
        PatternKind::ReaderWriter => Box::new(ReaderWriter::new(n, probs)),
        PatternKind::Barrier => {
            Box::new(Barrier::new(n, config.effective_barrier_threshold(), probs))
        }
        PatternKind::SleepingBarber => {
            Box::new(SleepingBarber::new(n, config.waiting_room_size, probs))
        }
        PatternKind::CigaretteSmokers => {
            Box::new(CigaretteSmokers::new(config.ingredient_types as usize, probs))
        }
    }
}

/// Validate `config` and build its pattern and world.  Emits no events.
pub fn build(config: &SimConfig) -> TvResult<Blueprint> {
    validate(config)?;
    let pattern = instantiate(config);

    let mut world = World::new();
    pattern.populate(&mut world);

    let mut placements = pattern.arrange(&world, &config.viewport);
    for p in placements.threads.iter_mut().chain(placements.resources.iter_mut()) {
        *p = tv_core::Placement::at(config.viewport.clamp(p.position));
    }
    world.placements = placements;

    tracing::debug!(
        pattern = %pattern.kind(),
        threads = world.threads.len(),
        resources = world.resources.len(),
        "pattern built",
    );
    Ok(Blueprint { pattern, world })
}
