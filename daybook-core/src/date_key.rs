//! Canonical calendar-day keys.
//!
//! Every bucket in the store, every export entry and the export file name use
//! the same `YYYY-MM-DD` form. Instants are converted to a day only through
//! `DateKey::from_instant`, which takes the time zone explicitly so a late
//! evening event never lands in the next day's bucket.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        DateKey(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DateKey)
    }

    /// The calendar day `instant` falls on, as seen from `zone`.
    pub fn from_instant<Z: TimeZone>(instant: &DateTime<Utc>, zone: &Z) -> Self {
        DateKey(instant.with_timezone(zone).date_naive())
    }

    pub fn today<Z: TimeZone>(zone: &Z) -> Self {
        Self::from_instant(&Utc::now(), zone)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl FromStr for DateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(DateKey)
            .map_err(|_| format!("Invalid date '{}'. Expected YYYY-MM-DD", s))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America::New_York, Asia::Tokyo};
    use std::collections::BTreeMap;

    #[test]
    fn test_display_is_zero_padded() {
        let key = DateKey::from_ymd(2024, 6, 1).unwrap();
        assert_eq!(key.to_string(), "2024-06-01");
    }

    #[test]
    fn test_parse_and_reject() {
        assert_eq!(
            "2024-06-01".parse::<DateKey>().unwrap(),
            DateKey::from_ymd(2024, 6, 1).unwrap()
        );
        assert!("2024-02-30".parse::<DateKey>().is_err());
        assert!("06/01/2024".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_from_instant_uses_the_given_zone() {
        // 02:30 UTC on June 1st is still May 31st in New York
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 2, 30, 0).unwrap();
        assert_eq!(
            DateKey::from_instant(&instant, &New_York).to_string(),
            "2024-05-31"
        );
        assert_eq!(DateKey::from_instant(&instant, &Tokyo).to_string(), "2024-06-01");
        assert_eq!(DateKey::from_instant(&instant, &Utc).to_string(), "2024-06-01");
    }

    #[test]
    fn test_weekend() {
        assert!(DateKey::from_ymd(2024, 6, 1).unwrap().is_weekend()); // Saturday
        assert!(DateKey::from_ymd(2024, 6, 2).unwrap().is_weekend()); // Sunday
        assert!(!DateKey::from_ymd(2024, 6, 3).unwrap().is_weekend());
    }

    #[test]
    fn test_usable_as_json_map_key() {
        let mut map = BTreeMap::new();
        map.insert(DateKey::from_ymd(2024, 6, 1).unwrap(), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2024-06-01":1}"#);
        let back: BTreeMap<DateKey, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
