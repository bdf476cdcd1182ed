//! Error types for daybook.

use thiserror::Error;

use crate::date_key::DateKey;
use crate::event::{Event, EventId};
use crate::time::TimeOfDay;

/// A draft that cannot become an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields (missing {0})")]
    MissingField(&'static str),

    #[error("Invalid {field} '{value}'. Expected HH:MM")]
    InvalidTime { field: &'static str, value: String },

    #[error("End time must be after start time ({start} >= {end})")]
    EndNotAfterStart { start: TimeOfDay, end: TimeOfDay },
}

/// Errors returned by `EventStore` mutations.
///
/// A failed mutation never changes the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "Event time conflicts with an existing event: '{title}' ({span}) on {date_key}",
        title = .conflicting.title,
        span = .conflicting.span()
    )]
    Conflict {
        date_key: DateKey,
        conflicting: Box<Event>,
    },

    #[error("Event {id} not found on {date_key}")]
    NotFound { date_key: DateKey, id: EventId },

    #[error("Could not mint a unique event id after {0} attempts")]
    IdsExhausted(usize),
}

/// Reasons a persisted snapshot is refused on load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Invalid event {id} on {date_key}: {reason}")]
    InvalidEvent {
        date_key: DateKey,
        id: EventId,
        reason: ValidationError,
    },

    #[error("Event id {0} appears more than once")]
    DuplicateId(EventId),

    #[error("Events {first} and {second} overlap on {date_key}")]
    Overlap {
        date_key: DateKey,
        first: EventId,
        second: EventId,
    },
}

/// Errors from the collaborators around the store (config, persistence, export).
#[derive(Error, Debug)]
pub enum DaybookError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot rejected: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Export error: {0}")]
    Export(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for daybook operations.
pub type DaybookResult<T> = Result<T, DaybookError>;
