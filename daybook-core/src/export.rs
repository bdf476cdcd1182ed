//! Exporting the full event mapping to a file.
//!
//! JSON is the primary format: a pretty-printed mapping of date key to the
//! ordered event records, which `from_json` reads back losslessly. `.ics` is
//! offered for importing into other calendar apps.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use icalendar::{Calendar, Component};
use tracing::info;

use crate::date_key::DateKey;
use crate::error::{DaybookError, DaybookResult};
use crate::event::Event;
use crate::store::EventMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Ics,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Ics => "ics",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "ics" | "ical" | "icalendar" => Ok(ExportFormat::Ics),
            other => Err(format!("Unknown export format '{}'. Expected json or ics", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// `calendar-events-<viewed day>.<ext>`
pub fn file_name(format: ExportFormat, viewed: DateKey) -> String {
    format!("calendar-events-{}.{}", viewed, format.extension())
}

pub fn render(map: &EventMap, format: ExportFormat) -> DaybookResult<String> {
    match format {
        ExportFormat::Json => to_json(map),
        ExportFormat::Ics => Ok(to_ics(map)),
    }
}

pub fn to_json(map: &EventMap) -> DaybookResult<String> {
    Ok(serde_json::to_string_pretty(map)?)
}

pub fn from_json(text: &str) -> DaybookResult<EventMap> {
    Ok(serde_json::from_str(text)?)
}

/// One VEVENT per event, with floating (wall-clock) start and end times.
pub fn to_ics(map: &EventMap) -> String {
    let mut cal = Calendar::new();

    for (date_key, events) in map {
        for event in events {
            cal.push(ics_event(*date_key, event));
        }
    }

    strip_ics_bloat(&cal.done().to_string())
}

fn ics_event(date_key: DateKey, event: &Event) -> icalendar::Event {
    let date = date_key.date();
    let start = date.and_time(event.start_time.as_naive());
    let end = date.and_time(event.end_time.as_naive());

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@daybook", event.id));
    ics_event.summary(&event.title);
    ics_event.add_property("DTSTART", start.format("%Y%m%dT%H%M%S").to_string());
    ics_event.add_property("DTEND", end.format("%Y%m%dT%H%M%S").to_string());

    if !event.description.is_empty() {
        ics_event.description(&event.description);
    }

    // RFC 7986 COLOR
    ics_event.add_property("COLOR", &event.color);

    ics_event.done()
}

/// Replace the library PRODID and drop the default CALSCALE line.
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:DAYBOOK\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Write the export into `dir` and return the file's path.
pub fn write_to_dir(
    map: &EventMap,
    format: ExportFormat,
    dir: &Path,
    viewed: DateKey,
) -> DaybookResult<PathBuf> {
    let contents = render(map, format)?;

    std::fs::create_dir_all(dir).map_err(|e| {
        DaybookError::Export(format!("Could not create {}: {}", dir.display(), e))
    })?;

    let path = dir.join(file_name(format, viewed));
    std::fs::write(&path, contents)
        .map_err(|e| DaybookError::Export(format!("Could not write {}: {}", path.display(), e)))?;

    info!(path = %path.display(), %format, "exported events");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;
    use crate::id::SequentialIds;
    use crate::store::EventStore;
    use pretty_assertions::assert_eq;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn sample_map() -> EventMap {
        let mut store = EventStore::with_ids(SequentialIds::default());
        store
            .create(
                key("2024-06-01"),
                EventDraft::new("Standup", "09:00", "09:15").with_description("Daily"),
            )
            .unwrap();
        store
            .create(
                key("2024-06-01"),
                EventDraft::new("Coffee", "08:00", "08:30").with_color("#f59e0b"),
            )
            .unwrap();
        store
            .create(key("2024-06-12"), EventDraft::new("Retro", "16:00", "17:00"))
            .unwrap();
        store.snapshot()
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let map = sample_map();
        let parsed = from_json(&to_json(&map).unwrap()).unwrap();
        assert_eq!(parsed, map);
        let titles: Vec<_> = parsed[&key("2024-06-01")]
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Standup", "Coffee"]);
    }

    #[test]
    fn test_json_shape() {
        let json = to_json(&sample_map()).unwrap();
        assert!(json.starts_with("{\n  \"2024-06-01\": [\n    {\n      \"id\": 1,"));
        assert!(json.contains("\"startTime\": \"09:00\""));
        assert!(json.contains("\"color\": \"#f59e0b\""));
    }

    #[test]
    fn test_empty_map_exports_empty_object() {
        assert_eq!(to_json(&EventMap::new()).unwrap(), "{}");
        assert_eq!(from_json("{}").unwrap(), EventMap::new());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(ExportFormat::Json, key("2024-06-01")),
            "calendar-events-2024-06-01.json"
        );
        assert_eq!(
            file_name(ExportFormat::Ics, key("2024-06-01")),
            "calendar-events-2024-06-01.ics"
        );
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("ical".parse::<ExportFormat>().unwrap(), ExportFormat::Ics);
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_ics_contains_each_event() {
        let ics = to_ics(&sample_map());
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
        assert!(ics.contains("UID:1@daybook"));
        assert!(ics.contains("SUMMARY:Standup"));
        assert!(ics.contains("DTSTART:20240601T090000"));
        assert!(ics.contains("DTEND:20240612T170000"));
        assert!(ics.contains("DESCRIPTION:Daily"));
        assert!(ics.contains("COLOR:#f59e0b"));
        assert!(ics.contains("PRODID:DAYBOOK"));
        assert!(!ics.contains("CALSCALE"));
    }

    #[test]
    fn test_write_to_dir() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let out = tmp_dir.path().join("exports");

        let path = write_to_dir(&sample_map(), ExportFormat::Json, &out, key("2024-06-01")).unwrap();

        assert_eq!(path, out.join("calendar-events-2024-06-01.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(from_json(&written).unwrap(), sample_map());
    }
}
