//! Event id generation.

use chrono::Utc;

use crate::event::EventId;

/// Source of fresh event ids.
///
/// The store still checks every minted id against the ids it holds and draws
/// again on a collision, so generators only need to be unique in practice.
pub trait IdGenerator {
    fn next_id(&mut self) -> EventId;

    /// Called for every id already present when a snapshot is restored,
    /// so a generator can move past it.
    fn observe(&mut self, _id: EventId) {}
}

/// Counts up from a starting value. Deterministic, meant for tests.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        SequentialIds { next: first }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> EventId {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        EventId::new(id)
    }

    fn observe(&mut self, id: EventId) {
        self.next = self.next.max(id.get().saturating_add(1));
    }
}

/// Millisecond creation timestamps, bumped so two ids minted in the same
/// millisecond (or after the clock steps back) still differ.
#[derive(Debug, Clone, Default)]
pub struct ClockIds {
    last: u64,
}

impl IdGenerator for ClockIds {
    fn next_id(&mut self) -> EventId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now.max(self.last.saturating_add(1));
        self.last = id;
        EventId::new(id)
    }

    fn observe(&mut self, id: EventId) {
        self.last = self.last.max(id.get());
    }
}
