//! Time conflict detection within a single day.
//!
//! Days hold tens of events at most, so a linear scan is all this needs.

use crate::event::{Event, EventId, TimeSpan};
use crate::time::TimeOfDay;

/// Whether `[start, end)` overlaps any event in `existing`, ignoring the
/// event with id `exclude` (the one being edited).
///
/// An empty or inverted range occupies no time and never conflicts.
pub fn has_conflict(
    start: TimeOfDay,
    end: TimeOfDay,
    existing: &[Event],
    exclude: Option<EventId>,
) -> bool {
    TimeSpan::new(start, end)
        .is_some_and(|candidate| find_conflict(&candidate, existing, exclude).is_some())
}

/// The first event in `existing` that `candidate` overlaps, skipping `exclude`.
pub fn find_conflict<'a>(
    candidate: &TimeSpan,
    existing: &'a [Event],
    exclude: Option<EventId>,
) -> Option<&'a Event> {
    existing
        .iter()
        .filter(|event| Some(event.id) != exclude)
        .find(|event| candidate.overlaps(&event.span()))
}
