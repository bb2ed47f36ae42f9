//! The six pattern implementations.
//!
//! Each module builds its own entities (`populate`), lays them out
//! (`arrange`), and answers the step engine's acquisition questions.  Ids
//! are fixed by construction order, so patterns address their resources
//! by constant index rather than by lookup.

mod barber;
mod barrier;
mod dining;
mod producer_consumer;
mod reader_writer;
mod smokers;

pub use barber::SleepingBarber;
pub use barrier::Barrier;
pub use dining::DiningPhilosophers;
pub use producer_consumer::ProducerConsumer;
pub use reader_writer::ReaderWriter;
pub use smokers::CigaretteSmokers;

use std::f32::consts::{PI, TAU};

use tv_core::{Vec2, on_circle};

/// `n` evenly spaced points on a full circle, the first at angle 0.
pub(crate) fn ring(center: Vec2, radius: f32, n: usize) -> impl Iterator<Item = Vec2> {
    ring_offset(center, radius, n, 0.0)
}

/// Like [`ring`], rotated by `offset` steps (a step is `TAU / n`).
pub(crate) fn ring_offset(center: Vec2, radius: f32, n: usize, offset: f32) -> impl Iterator<Item = Vec2> {
    let step = TAU / n.max(1) as f32;
    (0..n).map(move |i| on_circle(center, radius, (i as f32 + offset) * step))
}

/// Angles for `n` points spread over a half circle starting at `start`.
pub(crate) fn half_arc(start: f32, n: usize) -> impl Iterator<Item = f32> {
    let span = n.saturating_sub(1).max(1) as f32;
    (0..n).map(move |i| start + PI * i as f32 / span)
}
