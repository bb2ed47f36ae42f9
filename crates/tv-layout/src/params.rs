//! Layout tuning constants.

/// Every constant the layout passes use.
///
/// Strengths are per-frame fractions at 60 frames per second; the engine
/// scales them by the actual frame length (capped at one reference frame).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutParams {
    /// Pairs closer than this are pushed apart.  Two drawn node radii.
    pub min_distance: f32,
    /// Extra distance repulsion aims for beyond `min_distance`, so a pair
    /// actually clears the threshold instead of approaching it forever.
    pub separation_margin: f32,
    pub repulsion: f32,
    /// Pull back into the padded viewport, per pixel of penetration.
    pub boundary: f32,
    /// Global pull toward the viewport center against long-run drift.
    pub center_pull: f32,
    /// Resource → linked-thread centroid pull.
    pub attraction: f32,
    /// Linked thread → resource pull, as a fraction of `attraction`.
    pub thread_attraction: f32,
    /// Pull toward a pattern's bespoke arrangement.
    pub pattern_pull: f32,
    /// Target-approach smoothing per 16 ms of elapsed time.
    pub smoothing: f32,
    /// Upper bound on the smoothing factor.
    pub smoothing_cap: f32,
    /// Smoothing multiplier for RUNNING threads; others use `idle_boost`.
    pub running_boost: f32,
    pub idle_boost: f32,
    /// Snap to target once within this distance on both axes.
    pub snap_epsilon: f32,
    /// Global animation speed multiplier.
    pub speed: f32,
    /// Producer/consumer: horizontal offset of each flank from the buffer.
    pub flank_offset: f32,
    /// Producer/consumer: vertical offset of the first row from the buffer.
    pub flank_top: f32,
    /// Producer/consumer: spacing between rows of a flank.
    pub row_spacing: f32,
    /// Dining philosophers: ring radius as a fraction of the viewport's
    /// half extent.
    pub ring_fraction: f32,
    /// Dining philosophers: fork ring radius relative to the seat ring.
    pub fork_ring: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            min_distance:      80.0,
            separation_margin: 2.0,
            repulsion:         0.8,
            boundary:          0.2,
            center_pull:       0.001,
            attraction:        0.03,
            thread_attraction: 0.75,
            pattern_pull:      0.02,
            smoothing:         0.0125,
            smoothing_cap:     0.05,
            running_boost:     1.2,
            idle_boost:        0.8,
            snap_epsilon:      0.5,
            speed:             1.0,
            flank_offset:      150.0,
            flank_top:         -100.0,
            row_spacing:       60.0,
            ring_fraction:     0.6,
            fork_ring:         0.8,
        }
    }
}
