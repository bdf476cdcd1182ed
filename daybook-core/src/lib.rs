//! Core types for daybook, a month-view calendar.
//!
//! This crate owns everything below the presentation layer:
//! - `EventStore`, the per-day event buckets and their invariants
//! - `conflict`, the half-open interval overlap check
//! - `persistence` and `export`, the collaborators that read and write snapshots
//! - `DaybookConfig` for user configuration

pub mod config;
pub mod conflict;
pub mod date_key;
pub mod daybook;
pub mod error;
pub mod event;
pub mod export;
pub mod id;
pub mod month;
pub mod persistence;
pub mod store;
pub mod theme;
pub mod time;

pub use date_key::DateKey;
pub use daybook::{Committed, Daybook};
pub use error::{DaybookError, DaybookResult, SnapshotError, StoreError, ValidationError};
pub use event::{DEFAULT_COLOR, Event, EventChange, EventDraft, EventId, PALETTE, TimeSpan};
pub use id::{ClockIds, IdGenerator, SequentialIds};
pub use month::MonthView;
pub use store::{EventMap, EventStore};
pub use theme::Theme;
pub use time::TimeOfDay;
