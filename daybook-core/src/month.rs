//! Month arithmetic for the calendar grid.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};

use crate::date_key::DateKey;

/// One calendar month, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthView {
    first: NaiveDate,
}

/// A grid row: Sunday through Saturday, `None` outside the month.
pub type Week = [Option<DateKey>; 7];

impl MonthView {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| MonthView { first })
    }

    pub fn containing(date_key: DateKey) -> Self {
        let date = date_key.date();
        MonthView {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> DateKey {
        DateKey::new(self.first)
    }

    /// The month before, or this one at the edge of the supported range.
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| MonthView { first })
            .unwrap_or(*self)
    }

    /// The month after, or this one at the edge of the supported range.
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| MonthView { first })
            .unwrap_or(*self)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.first.checked_add_months(Months::new(1)) {
            Some(next) => (next - self.first).num_days() as u32,
            // December of the last representable year
            None => 31,
        }
    }

    /// Blank cells before day 1 in a Sunday-first grid.
    pub fn leading_blanks(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn contains(&self, date_key: DateKey) -> bool {
        MonthView::containing(date_key) == *self
    }

    pub fn days(&self) -> impl Iterator<Item = DateKey> {
        self.first
            .iter_days()
            .take(self.days_in_month() as usize)
            .map(DateKey::new)
    }

    /// The month laid out in Sunday-first weeks, padded at both ends.
    pub fn weeks(&self) -> Vec<Week> {
        let cells: Vec<Option<DateKey>> = std::iter::repeat_n(None, self.leading_blanks() as usize)
            .chain(self.days().map(Some))
            .collect();

        cells
            .chunks(7)
            .map(|chunk| {
                let mut week: Week = [None; 7];
                week[..chunk.len()].copy_from_slice(chunk);
                week
            })
            .collect()
    }

    /// e.g. "June 2024"
    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl FromStr for MonthView {
    type Err = String;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(|first| MonthView { first })
            .map_err(|_| format!("Invalid month '{}'. Expected YYYY-MM", s))
    }
}

impl fmt::Display for MonthView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}
