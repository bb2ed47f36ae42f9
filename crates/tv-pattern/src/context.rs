//! Mutable per-tick state handed to every [`Pattern`][crate::Pattern] hook.

use std::collections::BTreeSet;

use tv_core::{ResourceId, SimRng, ThreadId, Tick};
use tv_entity::{EventKind, EventLog, Resource, ResourceState, Thread, ThreadState};

/// Everything a pattern may touch during one tick.
///
/// Built once per tick by the step engine from disjoint borrows of the
/// session (`threads`, `resources`, `events`, `rng`), so pattern code can
/// mutate the world, append events, and draw randomness without holding a
/// reference to the session itself.  Placements are deliberately absent.
///
/// The helpers below keep the two sides of every relationship in step: a
/// thread's `held`/`waiting_for` sets and the resource's `holders`/`waiting`
/// queue are always updated together.
///
/// Ids are trusted: every id a pattern sees was produced by the factory for
/// this world, so lookups index directly.
pub struct StepContext<'a> {
    /// The tick being executed.
    pub tick: Tick,

    threads:   &'a mut [Thread],
    resources: &'a mut [Resource],
    events:    &'a mut EventLog,
    rng:       &'a mut SimRng,

    /// Thread whose turn it is.
    actor: Option<ThreadId>,
    /// Threads whose state another thread changed this tick.
    moved: BTreeSet<ThreadId>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        tick:      Tick,
        threads:   &'a mut [Thread],
        resources: &'a mut [Resource],
        events:    &'a mut EventLog,
        rng:       &'a mut SimRng,
    ) -> Self {
        Self { tick, threads, resources, events, rng, actor: None, moved: BTreeSet::new() }
    }

    // ── Turn bookkeeping (engine) ─────────────────────────────────────────

    /// Begin `thread`'s turn.
    pub fn act_as(&mut self, thread: ThreadId) {
        self.actor = Some(thread);
    }

    /// `true` if another thread already changed `thread`'s state this tick;
    /// the engine gives such threads no turn of their own until next tick.
    pub fn was_moved(&self, thread: ThreadId) -> bool {
        self.moved.contains(&thread)
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn thread(&self, id: ThreadId) -> &Thread {
        &self.threads[id.index()]
    }

    #[inline]
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.index()]
    }

    pub fn threads(&self) -> &[Thread] {
        self.threads
    }

    /// Events appended so far, this tick included.
    pub fn events(&self) -> &EventLog {
        self.events
    }

    // ── Randomness ────────────────────────────────────────────────────────

    #[inline]
    pub fn decide(&mut self, probability: f64) -> bool {
        self.rng.decide(probability)
    }

    #[inline]
    pub fn pick(&mut self, n: usize) -> usize {
        self.rng.pick(n)
    }

    // ── Writes ────────────────────────────────────────────────────────────

    pub fn emit(
        &mut self,
        kind:        EventKind,
        thread:      Option<ThreadId>,
        resource:    Option<ResourceId>,
        description: impl Into<String>,
    ) {
        self.events.push(self.tick, kind, thread, resource, description);
    }

    /// Change a thread's lifecycle state.  Emits nothing.
    pub fn set_state(&mut self, thread: ThreadId, state: ThreadState) {
        if self.actor != Some(thread) {
            self.moved.insert(thread);
        }
        self.threads[thread.index()].state = state;
    }

    /// Set a counting resource's value; the state follows it (FREE at zero,
    /// OCCUPIED otherwise).
    pub fn set_count(&mut self, resource: ResourceId, value: u32) {
        let res = &mut self.resources[resource.index()];
        res.current_value = Some(value);
        res.state = if value == 0 { ResourceState::Free } else { ResourceState::Occupied };
    }

    /// Set a resource's state without touching ownership.
    pub fn set_resource_state(&mut self, resource: ResourceId, state: ResourceState) {
        self.resources[resource.index()].state = state;
    }

    /// Make `thread` a holder of `resource` in `state`, leaving its wait
    /// queue if it was parked there, and emit `RESOURCE_ACQUIRED`.
    pub fn grant(
        &mut self,
        thread:      ThreadId,
        resource:    ResourceId,
        state:       ResourceState,
        description: impl Into<String>,
    ) {
        let t = &mut self.threads[thread.index()];
        t.waiting_for.remove(&resource);
        t.held.insert(resource);

        let r = &mut self.resources[resource.index()];
        r.waiting.remove(thread);
        if !r.holders.contains(&thread) {
            r.holders.push(thread);
        }
        r.state = state;

        self.emit(EventKind::ResourceAcquired, Some(thread), Some(resource), description);
    }

    /// Drop `thread`'s hold on `resource` and emit `RESOURCE_RELEASED`.
    /// The resource reverts to FREE once its last holder leaves.
    pub fn release(&mut self, thread: ThreadId, resource: ResourceId, description: impl Into<String>) {
        if !self.threads[thread.index()].held.remove(&resource) {
            return;
        }
        let r = &mut self.resources[resource.index()];
        r.holders.retain(|&h| h != thread);
        if r.holders.is_empty() {
            r.state = ResourceState::Free;
        }
        self.emit(EventKind::ResourceReleased, Some(thread), Some(resource), description);
    }

    /// Release everything `thread` holds, in id order.
    pub fn release_all(&mut self, thread: ThreadId) {
        let held: Vec<ResourceId> = self.threads[thread.index()].held.iter().copied().collect();
        for r in held {
            let desc = format!(
                "{} released {}",
                self.threads[thread.index()].name,
                self.resources[r.index()].name,
            );
            self.release(thread, r, desc);
        }
    }

    /// Park `thread` on `resource` and emit `kind`.
    ///
    /// Returns `false`, emitting nothing, if the thread is already parked on
    /// exactly that resource.  Parking elsewhere first leaves every other
    /// queue, so a thread waits on at most one resource at a time.
    pub fn block(
        &mut self,
        thread:   ThreadId,
        resource: ResourceId,
        kind:     EventKind,
        reason:   impl Into<String>,
    ) -> bool {
        let t = &self.threads[thread.index()];
        if t.state == ThreadState::Blocked
            && t.waiting_for.len() == 1
            && t.is_waiting_on(resource)
        {
            return false;
        }
        self.unpark(thread);
        self.threads[thread.index()].waiting_for.insert(resource);
        self.resources[resource.index()].waiting.push(thread);
        self.set_state(thread, ThreadState::Blocked);
        self.emit(kind, Some(thread), Some(resource), reason);
        true
    }

    /// Remove `thread` from every wait queue.  State is left alone.
    pub fn unpark(&mut self, thread: ThreadId) {
        let waits = std::mem::take(&mut self.threads[thread.index()].waiting_for);
        for r in waits {
            self.resources[r.index()].waiting.remove(thread);
        }
    }

    /// Unpark `thread`, make it RUNNING, and emit `THREAD_RESUMED`.
    pub fn resume(&mut self, thread: ThreadId, description: impl Into<String>) {
        self.unpark(thread);
        self.set_state(thread, ThreadState::Running);
        self.emit(EventKind::ThreadResumed, Some(thread), None, description);
    }
}
