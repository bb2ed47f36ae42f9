//! Simulated threads.

use std::collections::BTreeSet;
use std::fmt;

use tv_core::{ResourceId, ThreadId};

/// Lifecycle state of a simulated thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ThreadState {
    New,
    Ready,
    Running,
    /// Doing protected work (eating, reading, smoking, …).
    Waiting,
    /// Contended: parked on the resource(s) in `waiting_for`.
    Blocked,
    /// Absorbing: the engine never touches a terminated thread again.
    Terminated,
}

impl ThreadState {
    /// `true` for states the step engine still advances.
    #[inline]
    pub fn is_live(self) -> bool {
        !matches!(self, ThreadState::New | ThreadState::Terminated)
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThreadState::New        => "NEW",
            ThreadState::Ready      => "READY",
            ThreadState::Running    => "RUNNING",
            ThreadState::Waiting    => "WAITING",
            ThreadState::Blocked    => "BLOCKED",
            ThreadState::Terminated => "TERMINATED",
        };
        f.write_str(s)
    }
}

/// The part a thread plays in its pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Producer,
    Consumer,
    Philosopher,
    Reader,
    Writer,
    Worker,
    Barber,
    Customer,
    Agent,
    Smoker,
}

/// A simulated thread.
///
/// Position lives in the world's [`Placements`][crate::Placements], not
/// here, so the layout engine can move nodes while holding only shared
/// borrows of the semantic state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thread {
    pub id:    ThreadId,
    pub name:  String,
    pub role:  Role,
    pub state: ThreadState,
    /// Resources currently owned.  Disjoint from `waiting_for`.
    pub held: BTreeSet<ResourceId>,
    /// Resources this thread is parked on.  Non-empty iff BLOCKED.
    pub waiting_for: BTreeSet<ResourceId>,
}

impl Thread {
    pub fn new(id: ThreadId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            state: ThreadState::New,
            held: BTreeSet::new(),
            waiting_for: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn holds(&self, resource: ResourceId) -> bool {
        self.held.contains(&resource)
    }

    #[inline]
    pub fn is_waiting_on(&self, resource: ResourceId) -> bool {
        self.waiting_for.contains(&resource)
    }

    /// Every resource this thread is linked to (held or waited on), in id order.
    pub fn links(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.held.iter().chain(self.waiting_for.iter()).copied()
    }
}
