//! The individual layout passes.
//!
//! Each pass is a free function over placements so it can be tested in
//! isolation.  `k` is the frame fraction: 1.0 for a full 60 fps frame,
//! smaller for shorter frames, never larger.

use std::f32::consts::TAU;

use tv_core::{Placement, ThreadId, Vec2, Viewport, on_circle};
use tv_entity::{Placements, Resource, ResourceKind, Role, Thread};

use crate::LayoutParams;

/// Below this distance two nodes count as coincident and are split along a
/// fixed per-pair axis instead of their (undefined) connecting axis.
const COINCIDENT: f32 = 1e-3;

const GOLDEN_ANGLE: f32 = 2.399_963;

// ── ① Target approach ─────────────────────────────────────────────────────────

/// Smoothing factor for a frame of `elapsed_ms`, before the per-state boost.
pub fn smoothing_factor(params: &LayoutParams, elapsed_ms: f32) -> f32 {
    let base = (params.smoothing * elapsed_ms / 16.0).min(params.smoothing_cap);
    (base * params.speed).min(params.smoothing_cap)
}

/// Move `p` a `factor` of the way to its target, snapping once close.
pub fn approach(p: &mut Placement, factor: f32, snap_epsilon: f32) {
    p.position += (p.target - p.position) * factor;
    if (p.target - p.position).abs().max_element() < snap_epsilon {
        p.position = p.target;
    }
}

// ── ② Pairwise repulsion ──────────────────────────────────────────────────────

/// Push apart every pair closer than `min_distance`, half to each node.
///
/// The push is proportional to the shortfall from
/// `min_distance + separation_margin`, so repeated application takes any
/// pair, coincident ones included, past `min_distance`.
pub fn repulsion(points: &mut [Vec2], params: &LayoutParams, k: f32) {
    let goal = params.min_distance + params.separation_margin;
    let strength = params.repulsion * k * 0.5;
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            let delta = points[j] - points[i];
            let d = delta.length();
            if d >= params.min_distance {
                continue;
            }
            let axis = if d > COINCIDENT { delta / d } else { split_axis(i, j) };
            let push = axis * (goal - d) * strength;
            points[i] -= push;
            points[j] += push;
        }
    }
}

fn split_axis(i: usize, j: usize) -> Vec2 {
    Vec2::from_angle((i * 7 + j * 13) as f32 * GOLDEN_ANGLE)
}

// ── ③ Boundary ────────────────────────────────────────────────────────────────

/// Spring `p` back into the padded viewport and nudge it toward the center.
/// The target is clamped into the padded region outright.
pub fn boundary(p: &mut Placement, viewport: &Viewport, params: &LayoutParams, k: f32) {
    let penetration = viewport.clamp(p.position) - p.position;
    let drift = viewport.center() - p.position;
    p.position += (penetration * params.boundary + drift * params.center_pull) * k;
    p.target = viewport.clamp(p.target);
}

// ── ④ Relationship attraction ─────────────────────────────────────────────────

/// Pull each resource toward the centroid of the threads holding or waiting
/// on it, then pull those threads partway toward the resource.
pub fn attraction(resources: &[Resource], placements: &mut Placements, params: &LayoutParams, k: f32) {
    let pull = params.attraction * k;
    let thread_pull = pull * params.thread_attraction;

    for res in resources {
        let linked: Vec<usize> = res
            .holders
            .iter()
            .copied()
            .chain(res.waiting.iter())
            .map(ThreadId::index)
            .filter(|&i| i < placements.threads.len())
            .collect();
        if linked.is_empty() {
            continue;
        }
        let Some(node) = placements.resources.get_mut(res.id.index()) else {
            continue;
        };

        let centroid = linked.iter().map(|&i| placements.threads[i].position).sum::<Vec2>()
            / linked.len() as f32;
        node.position += (centroid - node.position) * pull;
        let anchor = node.position;

        for i in linked {
            let p = &mut placements.threads[i].position;
            *p += (anchor - *p) * thread_pull;
        }
    }
}

/// Producers in rows on the buffer's left, consumers on its right; the
/// buffer itself drifts toward the horizontal center.
pub fn producer_consumer(
    threads:    &[Thread],
    resources:  &[Resource],
    placements: &mut Placements,
    viewport:   &Viewport,
    params:     &LayoutParams,
    k:          f32,
) {
    let pull = params.pattern_pull * k;
    let Some(buffer) = resources.iter().find(|r| r.kind == ResourceKind::Buffer) else {
        return;
    };
    let Some(node) = placements.resources.get_mut(buffer.id.index()) else {
        return;
    };
    let anchor = node.position;
    node.position.x += (viewport.center().x - anchor.x) * pull;

    let mut rows = [0usize; 2];
    for t in threads {
        let (side, flank) = match t.role {
            Role::Producer => (-1.0, 0),
            Role::Consumer => (1.0, 1),
            _ => continue,
        };
        let row = rows[flank];
        rows[flank] += 1;
        let goal = anchor
            + Vec2::new(side * params.flank_offset, params.flank_top + row as f32 * params.row_spacing);
        if let Some(p) = placements.threads.get_mut(t.id.index()) {
            p.position += (goal - p.position) * pull;
        }
    }
}

/// Philosophers on a ring around the center; fork `i` between philosopher
/// `i - 1` and philosopher `i` on a smaller ring.
pub fn dining(
    threads:    &[Thread],
    placements: &mut Placements,
    viewport:   &Viewport,
    params:     &LayoutParams,
    k:          f32,
) {
    let seats: Vec<ThreadId> = threads
        .iter()
        .filter(|t| t.role == Role::Philosopher)
        .map(|t| t.id)
        .collect();
    if seats.is_empty() || placements.resources.is_empty() {
        return;
    }

    let pull = params.pattern_pull * k;
    let center = viewport.center();
    let radius = viewport.half_extent() * params.ring_fraction;
    let step = TAU / seats.len() as f32;

    for (i, id) in seats.iter().enumerate() {
        if let Some(p) = placements.threads.get_mut(id.index()) {
            let goal = on_circle(center, radius, i as f32 * step);
            p.position += (goal - p.position) * pull;
        }
    }
    for (i, p) in placements.resources.iter_mut().enumerate() {
        let goal = on_circle(center, radius * params.fork_ring, (i as f32 - 0.5) * step);
        p.position += (goal - p.position) * pull;
    }
}

// ── ⑤ Settle ──────────────────────────────────────────────────────────────────

/// Replace non-finite values and keep the node on the canvas.
pub fn settle(p: &mut Placement, viewport: &Viewport) {
    if !p.target.is_finite() {
        p.target = viewport.center();
    }
    if !p.position.is_finite() {
        p.position = p.target;
    }
    p.position = p.position.clamp(Vec2::ZERO, Vec2::new(viewport.width, viewport.height));
}
