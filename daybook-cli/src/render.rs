//! Terminal rendering for daybook types.
//!
//! Layout is computed on plain text first so padding stays aligned, then
//! colored with owo_colors according to the active theme.

use chrono::Datelike;
use daybook_core::{DateKey, Event, MonthView, Theme};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Width of one day column, in characters.
pub const CELL_WIDTH: usize = 14;

/// Events listed inside a month cell before collapsing into "+N more".
pub const EVENTS_PER_CELL: usize = 3;

/// Header, the listed events, and the overflow line.
const CELL_HEIGHT: usize = EVENTS_PER_CELL + 2;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const SEPARATOR: &str = "│";

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!(
            "{} {} {} {}",
            swatch(&self.color),
            self.span(),
            self.title.bold(),
            format!("#{}", self.id).dimmed()
        );
        if !self.description.is_empty() {
            line.push_str(&format!("\n              {}", self.description.dimmed()));
        }
        line
    }
}

impl Render for Theme {
    fn render(&self) -> String {
        let (r, g, b) = accent(*self);
        match self {
            Theme::Light => format!("☀ {}", self).truecolor(r, g, b).to_string(),
            Theme::Dark => format!("☾ {}", self).truecolor(r, g, b).to_string(),
        }
    }
}

/// One day of the month grid and the events to show in it.
#[derive(Debug, Clone)]
pub struct DayCell {
    pub date: DateKey,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq)]
enum CellLine {
    Header { day: u32, count: usize },
    Event { title: String, color: String },
    More(usize),
    Blank,
}

impl CellLine {
    /// Plain text, padded or truncated to exactly `CELL_WIDTH`.
    fn plain(&self) -> String {
        match self {
            CellLine::Header { day, count: 0 } => pad(&day.to_string()),
            CellLine::Header { day, count } => pad(&format!("{} ({})", day, count)),
            CellLine::Event { title, .. } => pad(&format!("• {}", title)),
            CellLine::More(n) => pad(&format!("+{} more", n)),
            CellLine::Blank => pad(""),
        }
    }
}

fn cell_lines(cell: &DayCell) -> Vec<CellLine> {
    let mut lines = vec![CellLine::Header {
        day: cell.date.date().day(),
        count: cell.events.len(),
    }];

    lines.extend(cell.events.iter().take(EVENTS_PER_CELL).map(|event| CellLine::Event {
        title: event.title.clone(),
        color: event.color.clone(),
    }));

    if cell.events.len() > EVENTS_PER_CELL {
        lines.push(CellLine::More(cell.events.len() - EVENTS_PER_CELL));
    }

    lines.resize(CELL_HEIGHT, CellLine::Blank);
    lines
}

/// Render a Sunday-first month grid.
///
/// `cells` holds the days to fill in; days of `view` without a cell render
/// empty. `label` is appended to the title (e.g. the time zone).
pub fn render_month(
    view: &MonthView,
    cells: &[DayCell],
    today: DateKey,
    theme: Theme,
    label: &str,
) -> String {
    let (r, g, b) = accent(theme);
    let mut out = Vec::new();

    out.push(format!(
        "{} {}",
        view.title().truecolor(r, g, b).bold(),
        format!("({})", label).dimmed()
    ));
    out.push(String::new());

    let header: Vec<String> = WEEKDAYS.iter().map(|day| pad(day).bold().to_string()).collect();
    out.push(header.join(&SEPARATOR.dimmed().to_string()));
    out.push(rule().dimmed().to_string());

    for week in view.weeks() {
        let columns: Vec<Vec<String>> = week
            .iter()
            .map(|slot| match slot {
                Some(date) => {
                    let events = cells
                        .iter()
                        .find(|cell| cell.date == *date)
                        .map(|cell| cell.events.clone())
                        .unwrap_or_default();
                    let cell = DayCell {
                        date: *date,
                        events,
                    };
                    cell_lines(&cell)
                        .iter()
                        .map(|line| styled(line, *date, today, theme))
                        .collect()
                }
                None => vec![pad(""); CELL_HEIGHT],
            })
            .collect();

        for row in 0..CELL_HEIGHT {
            let line: Vec<&str> = columns.iter().map(|column| column[row].as_str()).collect();
            out.push(line.join(&SEPARATOR.dimmed().to_string()));
        }
        out.push(rule().dimmed().to_string());
    }

    out.join("\n")
}

/// Render one day's events as a list.
pub fn render_day(date: DateKey, events: &[Event], today: DateKey, theme: Theme) -> String {
    let (r, g, b) = accent(theme);
    let mut title = date.date().format("%A, %B %-d %Y").to_string();
    if date == today {
        title.push_str(" (today)");
    }

    let mut lines = vec![title.truecolor(r, g, b).bold().to_string()];
    if events.is_empty() {
        lines.push(format!("  {}", "No events".dimmed()));
    } else {
        lines.extend(events.iter().map(|event| format!("  {}", event.render())));
    }
    lines.join("\n")
}

fn styled(line: &CellLine, date: DateKey, today: DateKey, theme: Theme) -> String {
    let text = line.plain();
    match line {
        CellLine::Header { .. } if date == today => {
            let (r, g, b) = accent(theme);
            text.truecolor(r, g, b).bold().reversed().to_string()
        }
        CellLine::Header { .. } if date.is_weekend() => text.dimmed().to_string(),
        CellLine::Header { .. } => text.bold().to_string(),
        CellLine::Event { color, .. } => {
            // Color only the bullet so the padding stays plain.
            let rest: String = text.chars().skip(1).collect();
            format!("{}{}", swatch_with(color, "•"), rest)
        }
        CellLine::More(_) => text.dimmed().to_string(),
        CellLine::Blank => text,
    }
}

fn accent(theme: Theme) -> (u8, u8, u8) {
    match theme {
        Theme::Light => (37, 99, 235),
        Theme::Dark => (147, 197, 253),
    }
}

fn rule() -> String {
    let width = CELL_WIDTH * WEEKDAYS.len() + WEEKDAYS.len() - 1;
    "─".repeat(width)
}

/// A colored dot for `color`, plain when it isn't `#rrggbb`.
pub fn swatch(color: &str) -> String {
    swatch_with(color, "●")
}

fn swatch_with(color: &str, symbol: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => symbol.truecolor(r, g, b).to_string(),
        None => symbol.to_string(),
    }
}

/// `#rrggbb` to its components.
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Pad or truncate to `CELL_WIDTH` characters, marking truncation with "…".
fn pad(text: &str) -> String {
    if text.chars().count() > CELL_WIDTH {
        let kept: String = text.chars().take(CELL_WIDTH - 1).collect();
        format!("{}…", kept)
    } else {
        format!("{:<width$}", text, width = CELL_WIDTH)
    }
}
