//! The bounded, append-only event log.
//!
//! Insertion order is the causal order.  Events are immutable once
//! appended; the only mutation the log performs is evicting the oldest
//! entries when it grows past its bound.

use std::collections::VecDeque;
use std::fmt;

use tv_core::{EventId, ResourceId, ThreadId, Tick};

/// What happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EventKind {
    ThreadStarted,
    ThreadWaiting,
    ThreadBlocked,
    ThreadResumed,
    ThreadTerminated,
    ResourceAcquired,
    ResourceReleased,
    BufferItemAdded,
    BufferItemRemoved,
    BarrierArrived,
    BarrierReleased,
    CustomerArrived,
    BarberSleeping,
    BarberServing,
    CustomerServed,
    AgentSupplied,
    SmokerSmoking,
    SimulationStarted,
    SimulationPaused,
    SimulationResumed,
    SimulationStopped,
}

impl EventKind {
    /// `SCREAMING_SNAKE_CASE` label, stable for export.
    pub fn label(self) -> &'static str {
        match self {
            EventKind::ThreadStarted     => "THREAD_STARTED",
            EventKind::ThreadWaiting     => "THREAD_WAITING",
            EventKind::ThreadBlocked     => "THREAD_BLOCKED",
            EventKind::ThreadResumed     => "THREAD_RESUMED",
            EventKind::ThreadTerminated  => "THREAD_TERMINATED",
            EventKind::ResourceAcquired  => "RESOURCE_ACQUIRED",
            EventKind::ResourceReleased  => "RESOURCE_RELEASED",
            EventKind::BufferItemAdded   => "BUFFER_ITEM_ADDED",
            EventKind::BufferItemRemoved => "BUFFER_ITEM_REMOVED",
            EventKind::BarrierArrived    => "BARRIER_ARRIVED",
            EventKind::BarrierReleased   => "BARRIER_RELEASED",
            EventKind::CustomerArrived   => "CUSTOMER_ARRIVED",
            EventKind::BarberSleeping    => "BARBER_SLEEPING",
            EventKind::BarberServing     => "BARBER_SERVING",
            EventKind::CustomerServed    => "CUSTOMER_SERVED",
            EventKind::AgentSupplied     => "AGENT_SUPPLIED",
            EventKind::SmokerSmoking     => "SMOKER_SMOKING",
            EventKind::SimulationStarted => "SIMULATION_STARTED",
            EventKind::SimulationPaused  => "SIMULATION_PAUSED",
            EventKind::SimulationResumed => "SIMULATION_RESUMED",
            EventKind::SimulationStopped => "SIMULATION_STOPPED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One appended transition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationEvent {
    pub id:       EventId,
    /// Logical time: the tick during which the event was appended.
    pub tick:     Tick,
    /// The acting thread, if any.
    pub thread:   Option<ThreadId>,
    pub resource: Option<ResourceId>,
    pub kind:     EventKind,
    pub description: String,
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.tick, self.kind, self.description)
    }
}

// ── EventLog ──────────────────────────────────────────────────────────────────

/// Bounded FIFO of [`SimulationEvent`]s.
///
/// `EventId`s are assigned from a monotonically increasing counter that
/// survives eviction, so `total_appended() - len()` is the number of events
/// evicted so far.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventLog {
    events:   VecDeque<SimulationEvent>,
    capacity: usize,
    next_id:  u64,
    /// Unbounded copy of everything appended since `begin_capture`.
    #[cfg_attr(feature = "serde", serde(skip))]
    capture:  Option<Vec<SimulationEvent>>,
}

impl EventLog {
    /// An empty log holding at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(1_024)),
            capacity,
            next_id: 0,
            capture: None,
        }
    }

    /// Append an event, evicting the oldest if the bound is exceeded.
    /// Returns the id assigned to the new event.
    pub fn push(
        &mut self,
        tick:        Tick,
        kind:        EventKind,
        thread:      Option<ThreadId>,
        resource:    Option<ResourceId>,
        description: impl Into<String>,
    ) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;

        let event = SimulationEvent {
            id,
            tick,
            thread,
            resource,
            kind,
            description: description.into(),
        };
        tracing::trace!(%event, "event appended");
        if let Some(captured) = &mut self.capture {
            captured.push(event.clone());
        }
        self.events.push_back(event);

        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
        id
    }

    /// Keep a copy of every event appended from now on, including those the
    /// bound evicts before [`end_capture`](Self::end_capture).  Restarting
    /// discards anything captured so far.
    pub fn begin_capture(&mut self) {
        self.capture = Some(Vec::new());
    }

    /// Stop capturing and return the captured events in causal order.
    pub fn end_capture(&mut self) -> Vec<SimulationEvent> {
        self.capture.take().unwrap_or_default()
    }

    /// Events in causal order, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SimulationEvent> + ExactSizeIterator {
        self.events.iter()
    }

    /// Every retained event appended after `mark` (a value previously
    /// returned by [`total_appended`](Self::total_appended)).
    pub fn since(&self, mark: u64) -> impl Iterator<Item = &SimulationEvent> {
        self.events.iter().filter(move |e| e.id.0 >= mark)
    }

    /// Lookup by id; `None` if never appended or already evicted.
    pub fn get(&self, id: EventId) -> Option<&SimulationEvent> {
        let oldest = self.events.front()?.id.0;
        let offset = id.0.checked_sub(oldest)?;
        self.events.get(offset as usize)
    }

    pub fn last(&self) -> Option<&SimulationEvent> {
        self.events.back()
    }

    /// Count of retained events of `kind`.
    pub fn count_of(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn contains_kind(&self, kind: EventKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }

    /// Events appended over the log's lifetime, evicted ones included.
    #[inline]
    pub fn total_appended(&self) -> u64 {
        self.next_id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Owned copy of the retained events, oldest first.
    pub fn to_vec(&self) -> Vec<SimulationEvent> {
        self.events.iter().cloned().collect()
    }
}
