//! Events, drafts and the time spans they occupy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::TimeOfDay;

/// Color given to events that don't pick one.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// Preset colors offered by the event form.
pub const PALETTE: [&str; 5] = ["#3b82f6", "#ef4444", "#22c55e", "#f59e0b", "#6366f1"];

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Store-assigned event identity. Never reused once minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    pub fn new(raw: u64) -> Self {
        EventId(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EventId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(EventId)
            .map_err(|_| format!("Invalid event id '{}'", s))
    }
}

/// A half-open `[start, end)` interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeSpan {
    /// `None` unless `start` is strictly before `end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Option<Self> {
        (start < end).then_some(TimeSpan { start, end })
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    /// Two spans overlap iff neither ends at or before the other starts.
    /// Touching spans (`end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A stored calendar event.
///
/// Field names serialize in camelCase so snapshots and exports keep the
/// `{id, title, startTime, endTime, description, color}` record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Event {
    pub fn span(&self) -> TimeSpan {
        TimeSpan {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Check the rules a draft must pass, for events that arrive already typed
    /// (e.g. from a snapshot).
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.start_time >= self.end_time {
            return Err(ValidationError::EndNotAfterStart {
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }

    /// Case-insensitive substring match on title or description.
    /// An empty term matches every event.
    pub fn matches_text(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Event field values as entered, before validation and id assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub color: String,
}

impl Default for EventDraft {
    fn default() -> Self {
        EventDraft {
            title: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            description: String::new(),
            color: default_color(),
        }
    }
}

impl EventDraft {
    pub fn new(
        title: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        EventDraft {
            title: title.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// A draft prefilled from an existing event, as an edit form starts out.
    pub fn from_event(event: &Event) -> Self {
        EventDraft {
            title: event.title.clone(),
            start_time: event.start_time.to_string(),
            end_time: event.end_time.to_string(),
            description: event.description.clone(),
            color: event.color.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<ValidDraft, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }

        let start = parse_time_field("start time", &self.start_time)?;
        let end = parse_time_field("end time", &self.end_time)?;
        let span = TimeSpan::new(start, end)
            .ok_or(ValidationError::EndNotAfterStart { start, end })?;

        let color = match self.color.trim() {
            "" => default_color(),
            c => c.to_string(),
        };

        Ok(ValidDraft {
            title: self.title.clone(),
            span,
            description: self.description.clone(),
            color,
        })
    }
}

fn parse_time_field(field: &'static str, raw: &str) -> Result<TimeOfDay, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    raw.parse().map_err(|_| ValidationError::InvalidTime {
        field,
        value: raw.to_string(),
    })
}

/// A draft that passed validation; only the store turns it into an `Event`.
#[derive(Debug, Clone)]
pub(crate) struct ValidDraft {
    pub title: String,
    pub span: TimeSpan,
    pub description: String,
    pub color: String,
}

impl ValidDraft {
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            title: self.title,
            start_time: self.span.start,
            end_time: self.span.end,
            description: self.description,
            color: self.color,
        }
    }
}

/// What an upsert should do: mint a new event, or replace an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventChange {
    Create(EventDraft),
    Update(EventId, EventDraft),
}

impl EventChange {
    pub fn draft(&self) -> &EventDraft {
        match self {
            EventChange::Create(draft) | EventChange::Update(_, draft) => draft,
        }
    }

    /// The id being replaced, if any. Conflict checks skip it.
    pub fn existing_id(&self) -> Option<EventId> {
        match self {
            EventChange::Create(_) => None,
            EventChange::Update(id, _) => Some(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn span(start: &str, end: &str) -> TimeSpan {
        TimeSpan::new(t(start), t(end)).unwrap()
    }

    #[test]
    fn test_span_requires_start_before_end() {
        assert!(TimeSpan::new(t("10:00"), t("10:00")).is_none());
        assert!(TimeSpan::new(t("11:00"), t("10:00")).is_none());
        assert!(TimeSpan::new(t("10:00"), t("10:01")).is_some());
    }

    #[test]
    fn test_touching_spans_do_not_overlap() {
        assert!(!span("09:00", "10:00").overlaps(&span("10:00", "11:00")));
        assert!(!span("10:00", "11:00").overlaps(&span("09:00", "10:00")));
    }

    #[test]
    fn test_overlap_cases() {
        let existing = span("09:00", "10:00");
        // start inside
        assert!(span("09:30", "10:30").overlaps(&existing));
        // end inside
        assert!(span("08:30", "09:30").overlaps(&existing));
        // contains
        assert!(span("08:00", "11:00").overlaps(&existing));
        // contained
        assert!(span("09:10", "09:20").overlaps(&existing));
        // same start
        assert!(span("09:00", "09:05").overlaps(&existing));
    }

    #[test]
    fn test_validate_keeps_title_as_typed_and_defaults_color() {
        let draft = EventDraft::new("  Standup ", "09:00", "09:15").with_color("");
        let valid = draft.validate().unwrap();
        assert_eq!(valid.title, "  Standup ");
        assert_eq!(valid.color, DEFAULT_COLOR);
        assert_eq!(valid.span, span("09:00", "09:15"));
    }

    #[test]
    fn test_validate_errors() {
        assert_eq!(
            EventDraft::new("  ", "09:00", "10:00").validate().unwrap_err(),
            ValidationError::MissingField("title")
        );
        assert_eq!(
            EventDraft::new("A", "", "10:00").validate().unwrap_err(),
            ValidationError::MissingField("start time")
        );
        assert_eq!(
            EventDraft::new("A", "09:00", "later").validate().unwrap_err(),
            ValidationError::InvalidTime {
                field: "end time",
                value: "later".to_string()
            }
        );
        assert_eq!(
            EventDraft::new("A", "10:00", "10:00").validate().unwrap_err(),
            ValidationError::EndNotAfterStart {
                start: t("10:00"),
                end: t("10:00")
            }
        );
    }

    #[test]
    fn test_matches_text() {
        let event = EventDraft::new("Standup", "09:00", "09:15")
            .with_description("Daily sync with Platform")
            .validate()
            .unwrap()
            .into_event(EventId::new(1));

        assert!(event.matches_text("stand"));
        assert!(event.matches_text("PLATFORM"));
        assert!(event.matches_text(""));
        assert!(!event.matches_text("zzz"));
    }

    #[test]
    fn test_event_record_shape() {
        let event = EventDraft::new("Standup", "09:00", "09:15")
            .validate()
            .unwrap()
            .into_event(EventId::new(42));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 42,
                "title": "Standup",
                "startTime": "09:00",
                "endTime": "09:15",
                "description": "",
                "color": "#3b82f6"
            })
        );
    }

    #[test]
    fn test_draft_from_event_round_trips() {
        let event = EventDraft::new("Review", "13:00", "14:30")
            .with_description("Q2")
            .with_color("#ef4444")
            .validate()
            .unwrap()
            .into_event(EventId::new(7));
        let draft = EventDraft::from_event(&event);
        assert_eq!(draft.validate().unwrap().into_event(EventId::new(7)), event);
    }
}
