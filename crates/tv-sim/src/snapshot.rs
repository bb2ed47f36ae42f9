//! Owned, read-only copy of a session for renderers and log views.

use tv_core::{NodeRef, PatternKind, Placement, ResourceId, ThreadId};
use tv_entity::{Placements, Resource, SimulationEvent, Thread, ThreadState};
use uuid::Uuid;

/// Everything a view needs to draw one frame or list the event log.
///
/// Taking a snapshot clones the world, so views never hold a borrow of the
/// session while it steps.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub session:    Uuid,
    pub pattern:    PatternKind,
    /// Ticks executed so far.
    pub step:       u64,
    pub running:    bool,
    pub paused:     bool,
    pub threads:    Vec<Thread>,
    pub resources:  Vec<Resource>,
    pub placements: Placements,
    /// Retained events, oldest first.
    pub events:     Vec<SimulationEvent>,
}

impl Snapshot {
    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.get(id.index())
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.index())
    }

    pub fn placement_of(&self, node: NodeRef) -> Option<&Placement> {
        self.placements.get(node)
    }

    /// Threads currently BLOCKED, in id order.
    pub fn blocked_threads(&self) -> impl Iterator<Item = &Thread> {
        self.threads.iter().filter(|t| t.state == ThreadState::Blocked)
    }
}
