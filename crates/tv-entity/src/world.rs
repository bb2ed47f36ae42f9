//! The `World` arena: threads, resources, and their placements.
//!
//! # Why placements are a separate struct
//!
//! The layout engine must read thread/resource relationships (`&[Thread]`,
//! `&[Resource]`) while moving nodes (`&mut Placements`) in the same call.
//! Keeping placements in their own struct lets [`World::split_for_layout`]
//! hand out both borrows at once, and it makes "layout never mutates
//! semantic fields" a property the borrow checker enforces:
//!
//! ```ignore
//! let (threads, resources, placements) = world.split_for_layout();
//! layout.frame(kind, threads, resources, placements, elapsed_secs);
//! ```

use tv_core::{InvariantViolation, NodeRef, Placement, ResourceId, ThreadId, TvError, TvResult};

use crate::{Resource, ResourceKind, Thread, ThreadState};

// ── Placements ────────────────────────────────────────────────────────────────

/// Per-node positions, indexed like the thread and resource arenas.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placements {
    pub threads:   Vec<Placement>,
    pub resources: Vec<Placement>,
}

impl Placements {
    pub fn get(&self, node: NodeRef) -> Option<&Placement> {
        match node {
            NodeRef::Thread(id)   => self.threads.get(id.index()),
            NodeRef::Resource(id) => self.resources.get(id.index()),
        }
    }

    pub fn get_mut(&mut self, node: NodeRef) -> Option<&mut Placement> {
        match node {
            NodeRef::Thread(id)   => self.threads.get_mut(id.index()),
            NodeRef::Resource(id) => self.resources.get_mut(id.index()),
        }
    }

    /// Every node in a stable order: threads first, then resources.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        let threads = (0..self.threads.len() as u32).map(|i| NodeRef::Thread(ThreadId(i)));
        let resources = (0..self.resources.len() as u32).map(|i| NodeRef::Resource(ResourceId(i)));
        threads.chain(resources)
    }

    pub fn len(&self) -> usize {
        self.threads.len() + self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Flat owned store of every entity in one simulation.
///
/// `ThreadId(i)` is `threads[i]` and `ResourceId(i)` is `resources[i]`; the
/// arenas never shrink, so ids stay valid for the world's lifetime.  A reset
/// replaces the whole world rather than rebuilding parts of it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    pub threads:    Vec<Thread>,
    pub resources:  Vec<Resource>,
    pub placements: Placements,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Construction (pattern factory) ────────────────────────────────────

    /// Append a NEW thread and return its id.
    pub fn add_thread(&mut self, name: impl Into<String>, role: crate::Role) -> ThreadId {
        let id = ThreadId(self.threads.len() as u32);
        self.threads.push(Thread::new(id, name, role));
        self.placements.threads.push(Placement::at(Default::default()));
        id
    }

    /// Append a FREE non-counting resource.
    pub fn add_resource(&mut self, name: impl Into<String>, kind: ResourceKind) -> ResourceId {
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(Resource::new(id, name, kind));
        self.placements.resources.push(Placement::at(Default::default()));
        id
    }

    /// Append a FREE counting resource with `current_value = 0`.
    pub fn add_counting_resource(
        &mut self,
        name:     impl Into<String>,
        kind:     ResourceKind,
        capacity: u32,
    ) -> ResourceId {
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(Resource::counting(id, name, kind, capacity));
        self.placements.resources.push(Placement::at(Default::default()));
        id
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.get(id.index())
    }

    #[inline]
    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.index())
    }

    /// Like [`thread`](Self::thread) but with a typed error.
    pub fn try_thread(&self, id: ThreadId) -> TvResult<&Thread> {
        self.thread(id).ok_or(TvError::ThreadNotFound(id))
    }

    /// Iterator over all `ThreadId`s in ascending index order.
    pub fn thread_ids(&self) -> impl Iterator<Item = ThreadId> + '_ {
        (0..self.threads.len() as u32).map(ThreadId)
    }

    pub fn count_in_state(&self, state: ThreadState) -> usize {
        self.threads.iter().filter(|t| t.state == state).count()
    }

    /// `true` once every thread is TERMINATED (vacuously true when empty).
    pub fn all_terminated(&self) -> bool {
        self.threads.iter().all(|t| t.state == ThreadState::Terminated)
    }

    /// Shared borrows of the semantic state plus a mutable borrow of the
    /// placements, for the layout engine.
    pub fn split_for_layout(&mut self) -> (&[Thread], &[Resource], &mut Placements) {
        (&self.threads, &self.resources, &mut self.placements)
    }

    // ── Invariants ────────────────────────────────────────────────────────

    /// Verify every structural invariant of the world.
    ///
    /// - held ∩ waiting_for = ∅ for every thread
    /// - BLOCKED ⇔ waiting_for ≠ ∅
    /// - TERMINATED threads hold and wait on nothing
    /// - counting resources stay within `[0, capacity]`
    /// - wait queues have no duplicates and agree with `waiting_for`
    /// - resource holders agree with thread `held` sets
    /// - every cross-reference resolves
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let violation = |msg: String| Err(InvariantViolation(msg));

        for t in &self.threads {
            if let Some(r) = t.held.intersection(&t.waiting_for).next() {
                return violation(format!("{} both holds and waits on {r}", t.name));
            }
            let blocked = t.state == ThreadState::Blocked;
            if blocked == t.waiting_for.is_empty() {
                return violation(format!(
                    "{} is {} with {} pending resources",
                    t.name, t.state, t.waiting_for.len(),
                ));
            }
            if t.state == ThreadState::Terminated && !t.held.is_empty() {
                return violation(format!("{} terminated while holding resources", t.name));
            }
            for r in t.links() {
                let Some(res) = self.resource(r) else {
                    return violation(format!("{} references missing {r}", t.name));
                };
                if t.holds(r) && !res.is_held_by(t.id) {
                    return violation(format!("{} holds {} but is not a holder", t.name, res.name));
                }
                if t.is_waiting_on(r) && !res.waiting.contains(t.id) {
                    return violation(format!("{} waits on {} but is not queued", t.name, res.name));
                }
            }
        }

        for r in &self.resources {
            if let (Some(v), Some(cap)) = (r.current_value, r.capacity) {
                if v > cap {
                    return violation(format!("{} count {v} exceeds capacity {cap}", r.name));
                }
            }
            let mut seen = std::collections::BTreeSet::new();
            for t in r.waiting.iter() {
                if !seen.insert(t) {
                    return violation(format!("{} queues {t} twice", r.name));
                }
                match self.thread(t) {
                    Some(th) if th.is_waiting_on(r.id) => {}
                    _ => return violation(format!("{} queues {t} which is not waiting on it", r.name)),
                }
            }
            for &t in &r.holders {
                match self.thread(t) {
                    Some(th) if th.holds(r.id) => {}
                    _ => return violation(format!("{} lists holder {t} which does not hold it", r.name)),
                }
            }
        }
        Ok(())
    }
}
