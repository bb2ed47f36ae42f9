//! Shared resources and their FIFO wait queues.

use std::collections::VecDeque;
use std::fmt;

use tv_core::{ResourceId, ThreadId};

/// What kind of synchronisation object a resource models.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ResourceKind {
    Lock,
    Buffer,
    Semaphore,
    Barrier,
    Resource,
}

/// Observable occupancy of a resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ResourceState {
    Free,
    /// In use but shareable (readers, items on a table).
    Occupied,
    Busy,
    /// Exclusively owned.
    Locked,
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceState::Free     => "FREE",
            ResourceState::Occupied => "OCCUPIED",
            ResourceState::Busy     => "BUSY",
            ResourceState::Locked   => "LOCKED",
        };
        f.write_str(s)
    }
}

// ── WaitQueue ─────────────────────────────────────────────────────────────────

/// FIFO queue of parked threads with set semantics: enqueueing a thread
/// that is already queued is a no-op.
///
/// Queues hold a handful of ids, so the linear membership scan is cheaper
/// than maintaining a side index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitQueue(VecDeque<ThreadId>);

impl WaitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `thread` unless it is already queued.  Returns `true` if added.
    pub fn push(&mut self, thread: ThreadId) -> bool {
        if self.contains(thread) {
            return false;
        }
        self.0.push_back(thread);
        true
    }

    /// Remove `thread` wherever it sits.  Returns `true` if it was queued.
    pub fn remove(&mut self, thread: ThreadId) -> bool {
        match self.0.iter().position(|&t| t == thread) {
            Some(i) => {
                self.0.remove(i);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn front(&self) -> Option<ThreadId> {
        self.0.front().copied()
    }

    #[inline]
    pub fn contains(&self, thread: ThreadId) -> bool {
        self.0.contains(&thread)
    }

    pub fn iter(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Resource ──────────────────────────────────────────────────────────────────

/// A shared resource threads contend for.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    pub id:    ResourceId,
    pub name:  String,
    pub kind:  ResourceKind,
    pub state: ResourceState,
    /// Upper bound on `current_value` for counting resources.
    pub capacity: Option<u32>,
    /// Items / arrivals currently counted.  `0 <= current_value <= capacity`.
    pub current_value: Option<u32>,
    /// Threads currently holding this resource, in acquisition order.
    pub holders: Vec<ThreadId>,
    pub waiting: WaitQueue,
}

impl Resource {
    /// A free, non-counting resource.
    pub fn new(id: ResourceId, name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            state: ResourceState::Free,
            capacity: None,
            current_value: None,
            holders: Vec::new(),
            waiting: WaitQueue::new(),
        }
    }

    /// A free counting resource with `current_value = 0`.
    pub fn counting(id: ResourceId, name: impl Into<String>, kind: ResourceKind, capacity: u32) -> Self {
        Self {
            capacity: Some(capacity),
            current_value: Some(0),
            ..Self::new(id, name, kind)
        }
    }

    /// Current count (0 for non-counting resources).
    #[inline]
    pub fn count(&self) -> u32 {
        self.current_value.unwrap_or(0)
    }

    /// `true` if the count can grow by one.
    #[inline]
    pub fn has_space(&self) -> bool {
        match self.capacity {
            Some(cap) => self.count() < cap,
            None      => false,
        }
    }

    #[inline]
    pub fn has_items(&self) -> bool {
        self.count() > 0
    }

    /// Nobody holds it.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.holders.is_empty()
    }

    #[inline]
    pub fn is_held_by(&self, thread: ThreadId) -> bool {
        self.holders.contains(&thread)
    }

    /// `"3/5"`-style fill label; empty for non-counting resources.
    pub fn fill_label(&self) -> String {
        match (self.current_value, self.capacity) {
            (Some(v), Some(c)) => format!("{v}/{c}"),
            _                  => String::new(),
        }
    }
}
