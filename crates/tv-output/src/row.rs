//! Plain data row types written by output backends.

use tv_entity::SimulationEvent;
use tv_sim::TickReport;

/// One appended event, flattened for tabular output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub event_id:    u64,
    pub tick:        u64,
    /// `SCREAMING_SNAKE_CASE` kind label.
    pub kind:        &'static str,
    pub thread_id:   Option<u32>,
    pub resource_id: Option<u32>,
    pub description: String,
}

impl From<&SimulationEvent> for EventRow {
    fn from(e: &SimulationEvent) -> Self {
        Self {
            event_id:    e.id.0,
            tick:        e.tick.0,
            kind:        e.kind.label(),
            thread_id:   e.thread.map(|t| t.0),
            resource_id: e.resource.map(|r| r.0),
            description: e.description.clone(),
        }
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:            u64,
    pub events:          u64,
    pub blocked_threads: u64,
}

impl From<&TickReport> for TickSummaryRow {
    fn from(r: &TickReport) -> Self {
        Self { tick: r.tick.0, events: r.events, blocked_threads: r.blocked as u64 }
    }
}
