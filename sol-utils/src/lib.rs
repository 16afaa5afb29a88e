//! Shared utility functions for the solar meter crates.

/// Calendar date handling for meter tables.
pub mod dates {
    use crate::error::DateError;
    use chrono::{Datelike, Local, NaiveDate, TimeDelta, Weekday};
    use regex::{Captures, Regex};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::str::FromStr;
    use std::sync::OnceLock;

    /// Date format written back to meter tables: "YYYY-MM-DD"
    pub const ISO_FORMAT: &str = "%Y-%m-%d";

    fn re_iso() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap())
    }

    fn re_month_day_year() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").unwrap())
    }

    /// A calendar date with no time of day and no timezone.
    ///
    /// Only valid calendar dates can be constructed, so month is always in
    /// `1..=12` and day is always valid for its month and year. Ordering is
    /// chronological.
    #[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
    pub struct DatePart(NaiveDate);

    impl DatePart {
        /// Build a date from its parts, or `None` if the parts don't name a real day.
        pub fn from_ymd_opt(year: i32, month: u32, day: u32) -> Option<DatePart> {
            NaiveDate::from_ymd_opt(year, month, day).map(DatePart)
        }

        /// Parse a table cell date: ISO `YYYY-MM-DD`, or `M/D/YYYY` / `M-D-YYYY`.
        pub fn parse(s: &str) -> Result<DatePart, DateError> {
            let trimmed = s.trim();
            if let Some(caps) = re_iso().captures(trimmed) {
                return Self::from_captures(&caps, 1, 2, 3);
            }
            if let Some(caps) = re_month_day_year().captures(trimmed) {
                return Self::from_captures(&caps, 3, 1, 2);
            }
            Err(DateError::Unrecognized(s.to_string()))
        }

        /// Parse a strict ISO `YYYY-MM-DD` date.
        pub fn parse_iso(s: &str) -> Result<DatePart, DateError> {
            match re_iso().captures(s.trim()) {
                Some(caps) => Self::from_captures(&caps, 1, 2, 3),
                None => Err(DateError::Unrecognized(s.to_string())),
            }
        }

        fn from_captures(
            caps: &Captures,
            year_idx: usize,
            month_idx: usize,
            day_idx: usize,
        ) -> Result<DatePart, DateError> {
            let unrecognized = || DateError::Unrecognized(caps[0].to_string());
            let year: i32 = caps[year_idx].parse().map_err(|_| unrecognized())?;
            let month: u32 = caps[month_idx].parse().map_err(|_| unrecognized())?;
            let day: u32 = caps[day_idx].parse().map_err(|_| unrecognized())?;
            Self::from_ymd_opt(year, month, day).ok_or(DateError::OutOfRange { year, month, day })
        }

        /// Today's date on the local calendar.
        pub fn today() -> DatePart {
            DatePart(Local::now().date_naive())
        }

        pub fn year(&self) -> i32 {
            self.0.year()
        }

        pub fn month(&self) -> u32 {
            self.0.month()
        }

        pub fn day(&self) -> u32 {
            self.0.day()
        }

        pub fn weekday(&self) -> Weekday {
            self.0.weekday()
        }

        pub fn as_naive_date(&self) -> NaiveDate {
            self.0
        }

        /// The date `n` days later (`n` may be negative).
        ///
        /// # Panics
        ///
        /// Panics if the result falls outside chrono's supported date range.
        pub fn add_days(&self, n: i64) -> DatePart {
            DatePart(self.0 + TimeDelta::days(n))
        }

        /// Whole days from `self` to `other` (`other - self`).
        pub fn diff_days(&self, other: &DatePart) -> i64 {
            (other.0 - self.0).num_days()
        }

        /// First day of this date's month.
        pub fn start_of_month(&self) -> DatePart {
            self.add_days(1 - i64::from(self.day()))
        }

        /// First day of this date's year.
        pub fn start_of_year(&self) -> DatePart {
            self.add_days(1 - i64::from(self.0.ordinal()))
        }

        /// Number of days in this date's month.
        pub fn days_in_month(&self) -> u32 {
            let next_month = self.start_of_month().add_days(31).start_of_month();
            next_month.add_days(-1).day()
        }
    }

    impl fmt::Display for DatePart {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0.format(ISO_FORMAT))
        }
    }

    impl FromStr for DatePart {
        type Err = DateError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            DatePart::parse(s)
        }
    }

    impl From<NaiveDate> for DatePart {
        fn from(value: NaiveDate) -> Self {
            DatePart(value)
        }
    }

    impl From<DatePart> for NaiveDate {
        fn from(value: DatePart) -> Self {
            value.0
        }
    }

    impl Serialize for DatePart {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for DatePart {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = String::deserialize(deserializer)?;
            DatePart::parse(&raw).map_err(de::Error::custom)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn ymd(year: i32, month: u32, day: u32) -> DatePart {
            DatePart::from_ymd_opt(year, month, day).unwrap()
        }

        #[test]
        fn test_parse_iso() {
            assert_eq!(DatePart::parse("2025-06-01").unwrap(), ymd(2025, 6, 1));
            assert_eq!(DatePart::parse("  2025-06-01 ").unwrap(), ymd(2025, 6, 1));
        }

        #[test]
        fn test_parse_month_day_year() {
            assert_eq!(DatePart::parse("6/1/2025").unwrap(), ymd(2025, 6, 1));
            assert_eq!(DatePart::parse("12/31/2024").unwrap(), ymd(2024, 12, 31));
            assert_eq!(DatePart::parse("06-01-2025").unwrap(), ymd(2025, 6, 1));
        }

        #[test]
        fn test_parse_rejects_other_shapes() {
            for bad in ["", "2025/06/01", "2025-6-1", "June 1, 2025", "1/1/25", "20250601"] {
                assert!(
                    matches!(DatePart::parse(bad), Err(DateError::Unrecognized(_))),
                    "{bad:?} should not parse"
                );
            }
        }

        #[test]
        fn test_parse_rejects_impossible_dates() {
            assert_eq!(
                DatePart::parse("2025-02-30"),
                Err(DateError::OutOfRange {
                    year: 2025,
                    month: 2,
                    day: 30
                })
            );
            assert!(DatePart::parse("13/1/2025").is_err());
            assert!(DatePart::parse("2024-02-29").is_ok());
        }

        #[test]
        fn test_parse_iso_only() {
            assert!(DatePart::parse_iso("2025-06-04").is_ok());
            assert!(DatePart::parse_iso("6/4/2025").is_err());
        }

        #[test]
        fn test_format_zero_pads() {
            assert_eq!(ymd(2025, 3, 7).to_string(), "2025-03-07");
            assert_eq!(ymd(987, 1, 1).to_string(), "0987-01-01");
        }

        #[test]
        fn test_add_days() {
            assert_eq!(ymd(2025, 6, 30).add_days(1), ymd(2025, 7, 1));
            assert_eq!(ymd(2024, 12, 31).add_days(1), ymd(2025, 1, 1));
            assert_eq!(ymd(2024, 2, 28).add_days(1), ymd(2024, 2, 29));
            assert_eq!(ymd(2025, 3, 1).add_days(-1), ymd(2025, 2, 28));
            assert_eq!(ymd(2025, 3, 1).add_days(0), ymd(2025, 3, 1));
        }

        #[test]
        fn test_diff_days() {
            // spans a US daylight-saving change
            assert_eq!(ymd(2025, 3, 8).diff_days(&ymd(2025, 3, 10)), 2);
            assert_eq!(ymd(2025, 6, 4).diff_days(&ymd(2025, 6, 1)), -3);
            assert_eq!(ymd(2024, 1, 1).diff_days(&ymd(2025, 1, 1)), 366);
        }

        #[test]
        fn test_month_and_year_boundaries() {
            let date = ymd(2024, 2, 17);
            assert_eq!(date.start_of_month(), ymd(2024, 2, 1));
            assert_eq!(date.start_of_year(), ymd(2024, 1, 1));
            assert_eq!(date.days_in_month(), 29);
            assert_eq!(ymd(2025, 2, 1).days_in_month(), 28);
            assert_eq!(ymd(2025, 12, 31).days_in_month(), 31);
        }

        #[test]
        fn test_serde_as_iso_string() {
            let json = serde_json::to_string(&ymd(2025, 6, 1)).unwrap();
            assert_eq!(json, "\"2025-06-01\"");
            let back: DatePart = serde_json::from_str("\"6/1/2025\"").unwrap();
            assert_eq!(back, ymd(2025, 6, 1));
        }
    }
}

/// Permissive numeric parsing for user-entered meter values.
pub mod numeric {
    use crate::error::NotANumber;

    /// Parse a number the way a user might type it: thousands separators and
    /// stray whitespace are tolerated, unit suffixes are stripped.
    ///
    /// Returns [`NotANumber`] for empty input or anything that doesn't end up
    /// as a finite `f64`. Callers decide what to do with that; it is never
    /// defaulted here.
    pub fn parse_number(s: &str) -> Result<f64, NotANumber> {
        let trimmed = s.trim();
        let cleaned: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'E' | 'e'))
            .collect();
        if cleaned.is_empty() {
            return Err(NotANumber(s.to_string()));
        }
        match cleaned.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(NotANumber(s.to_string())),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::parse_number;

        #[test]
        fn test_parse_plain_numbers() {
            assert_eq!(parse_number("1030").unwrap(), 1030.0);
            assert_eq!(parse_number("-5").unwrap(), -5.0);
            assert_eq!(parse_number("12.5").unwrap(), 12.5);
            assert_eq!(parse_number("1e3").unwrap(), 1000.0);
        }

        #[test]
        fn test_parse_strips_separators_and_units() {
            assert_eq!(parse_number(" 1,234,567 ").unwrap(), 1_234_567.0);
            assert_eq!(parse_number("1 030").unwrap(), 1030.0);
            assert_eq!(parse_number("42 kWh").unwrap(), 42.0);
            assert_eq!(parse_number("$18.25").unwrap(), 18.25);
        }

        #[test]
        fn test_parse_failures() {
            assert!(parse_number("").is_err());
            assert!(parse_number("   ").is_err());
            assert!(parse_number("n/a").is_err());
            assert!(parse_number("1.2.3").is_err());
            assert!(parse_number("1e999").is_err());
        }
    }
}

/// Error types
pub mod error {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum DateError {
        #[error("unrecognized date {0:?}: expected YYYY-MM-DD or M/D/YYYY")]
        Unrecognized(String),
        #[error("no such calendar date: {year:04}-{month:02}-{day:02}")]
        OutOfRange { year: i32, month: u32, day: u32 },
    }

    /// A value that could not be read as a finite number.
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    #[error("not a number: {0:?}")]
    pub struct NotANumber(pub String);
}
