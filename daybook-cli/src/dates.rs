//! Parsing day and time arguments.

use anyhow::{Context, Result};
use chrono::{Duration, Weekday};
use daybook_core::{DateKey, TimeOfDay};

/// Default event length when neither an end nor a duration is given.
const DEFAULT_LENGTH_MINUTES: i64 = 60;

/// Parse a day argument: `YYYY-MM-DD`, `today`/`tomorrow`/`yesterday`
/// (relative to `today`, which is already pinned to the configured zone), or
/// natural language such as "next friday" or "jun 3".
pub fn parse_date(input: &str, today: DateKey) -> Result<DateKey> {
    let trimmed = input.trim();

    let relative = match trimmed.to_lowercase().as_str() {
        "today" => Some(0),
        "tomorrow" => Some(1),
        "yesterday" => Some(-1),
        _ => None,
    };
    if let Some(offset) = relative {
        return today
            .date()
            .checked_add_signed(Duration::days(offset))
            .map(DateKey::new)
            .with_context(|| format!("Date out of range: \"{}\"", input));
    }

    if let Ok(key) = trimmed.parse::<DateKey>() {
        return Ok(key);
    }

    let expanded = expand_abbreviations(trimmed);
    if let Some(date) = weekday_after(&expanded, today) {
        return Ok(date);
    }

    // Noon keeps the reference clear of DST gaps in the local zone.
    let reference = today
        .date()
        .and_hms_opt(12, 0, 0)
        .with_context(|| format!("Date out of range: \"{}\"", input))?;
    let dt = fuzzydate::parse_relative_to(&expanded, reference)
        .map_err(|_| anyhow::anyhow!("Could not parse date: \"{}\"", input))?;

    Ok(DateKey::new(dt.date()))
}

/// Resolve "friday" (today counts) or "next friday" (strictly after today).
fn weekday_after(phrase: &str, today: DateKey) -> Option<DateKey> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let (name, strictly_after) = match words.as_slice() {
        [name] => (*name, false),
        ["next", name] => (*name, true),
        _ => return None,
    };
    let target: Weekday = name.parse().ok()?;

    let from = today.weekday().num_days_from_monday();
    let mut ahead = (target.num_days_from_monday() + 7 - from) % 7;
    if ahead == 0 && strictly_after {
        ahead = 7;
    }

    today
        .date()
        .checked_add_signed(Duration::days(i64::from(ahead)))
        .map(DateKey::new)
}

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    let abbrevs = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            abbrevs
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| *full)
                .unwrap_or(word)
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turn friendly time input ("9am", "3:30pm", "noon") into `HH:MM`.
/// Anything else is passed through untouched for the store to judge.
pub fn normalize_time(input: &str) -> String {
    let lower = input.trim().to_lowercase();

    match lower.as_str() {
        "noon" => return "12:00".to_string(),
        "midnight" => return "00:00".to_string(),
        _ => {}
    }

    let (clock, pm) = if let Some(rest) = lower.strip_suffix("pm") {
        (rest.trim(), true)
    } else if let Some(rest) = lower.strip_suffix("am") {
        (rest.trim(), false)
    } else {
        return input.trim().to_string();
    };

    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok(), m.parse::<u32>().ok()),
        None => (clock.parse::<u32>().ok(), Some(0)),
    };

    match (hour, minute) {
        (Some(hour @ 1..=12), Some(minute @ 0..=59)) => {
            let hour = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            };
            format!("{:02}:{:02}", hour, minute)
        }
        _ => input.trim().to_string(),
    }
}

/// Normalize and check a time argument, returning it as `HH:MM`.
pub fn parse_time(input: &str) -> Result<String> {
    let normalized = normalize_time(input);
    let time: TimeOfDay = normalized
        .parse()
        .with_context(|| format!("Could not parse time: \"{}\"", input))?;
    Ok(time.to_string())
}

/// Work out the end time for a draft starting at `start`.
///
/// `end` wins over `duration`; with neither the event lasts an hour.
pub fn resolve_end(start: &str, end: Option<&str>, duration: Option<&str>) -> Result<String> {
    if let Some(end) = end {
        return Ok(normalize_time(end));
    }

    let length = match duration {
        Some(input) => parse_duration(input)?,
        None => Duration::minutes(DEFAULT_LENGTH_MINUTES),
    };

    let start: TimeOfDay = start
        .parse()
        .with_context(|| format!("Invalid start time \"{}\". Expected HH:MM", start))?;

    end_after(start, length)
}

/// Parse a reply to "how long?": an end time, or a duration.
pub fn parse_end_input(start: &str, input: &str) -> Result<String> {
    let normalized = normalize_time(input);
    if normalized.parse::<TimeOfDay>().is_ok() {
        return Ok(normalized);
    }
    resolve_end(start, None, Some(input))
}

pub fn end_after(start: TimeOfDay, length: Duration) -> Result<String> {
    start
        .checked_add(length)
        .map(|end| end.to_string())
        .with_context(|| {
            format!("Event starting at {} would run past midnight; use --end", start)
        })
}

fn parse_duration(input: &str) -> Result<Duration> {
    let std_dur = humantime::parse_duration(input.trim())
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    Duration::from_std(std_dur).context("Duration too large")
}
