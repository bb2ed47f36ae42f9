//! `LayoutEngine`: composes the force passes into one frame.

use tv_core::{PatternKind, Vec2, Viewport};
use tv_entity::{Placements, Resource, Thread, ThreadState};

use crate::{LayoutParams, forces};

/// Frame-cadence solver for node placements.
///
/// Stateless between frames: everything it needs is in the placements it is
/// handed, so the same engine can drive any number of sessions.
///
/// # Example
///
/// ```rust,ignore
/// let layout = LayoutEngine::new(session.config().viewport);
/// let kind = session.kind();
/// let (threads, resources, placements) = session.layout_view();
/// layout.frame(kind, threads, resources, placements, 1.0 / 60.0);
/// ```
#[derive(Clone, Debug)]
pub struct LayoutEngine {
    pub params:   LayoutParams,
    pub viewport: Viewport,
}

impl LayoutEngine {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_params(viewport, LayoutParams::default())
    }

    pub fn with_params(viewport: Viewport, params: LayoutParams) -> Self {
        Self { params, viewport }
    }

    /// Advance every placement by one display frame of `elapsed_secs`.
    ///
    /// A zero, negative, or non-finite frame length changes nothing.
    pub fn frame(
        &self,
        kind:         PatternKind,
        threads:      &[Thread],
        resources:    &[Resource],
        placements:   &mut Placements,
        elapsed_secs: f32,
    ) {
        if !(elapsed_secs.is_finite() && elapsed_secs > 0.0) {
            return;
        }
        let p = &self.params;
        let vp = &self.viewport;
        let k = (elapsed_secs * p.speed * 60.0).min(1.0);

        let smooth = forces::smoothing_factor(p, elapsed_secs * 1_000.0);
        for (i, node) in placements.threads.iter_mut().enumerate() {
            let boost = match threads.get(i).map(|t| t.state) {
                Some(ThreadState::Running) => p.running_boost,
                _ => p.idle_boost,
            };
            forces::approach(node, smooth * boost, p.snap_epsilon);
        }
        for node in &mut placements.resources {
            forces::approach(node, smooth, p.snap_epsilon);
        }

        let mut points: Vec<Vec2> = placements
            .threads
            .iter()
            .chain(&placements.resources)
            .map(|node| node.position)
            .collect();
        forces::repulsion(&mut points, p, k);
        let nodes = placements.threads.iter_mut().chain(placements.resources.iter_mut());
        for (node, pos) in nodes.zip(points) {
            node.position = pos;
        }

        for node in placements.threads.iter_mut().chain(placements.resources.iter_mut()) {
            forces::boundary(node, vp, p, k);
        }

        forces::attraction(resources, placements, p, k);
        match kind {
            PatternKind::ProducerConsumer => {
                forces::producer_consumer(threads, resources, placements, vp, p, k);
            }
            PatternKind::DiningPhilosophers => forces::dining(threads, placements, vp, p, k),
            _ => {}
        }

        for node in placements.threads.iter_mut().chain(placements.resources.iter_mut()) {
            forces::settle(node, vp);
        }
        tracing::trace!(%kind, nodes = placements.len(), k, "layout frame");
    }
}
