use serde::{Deserialize, Serialize};
use sol_utils::dates::DatePart;
use std::mem::replace;

/// Number of days in a window when only one bound is known.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Start of the default reporting window. Starting at the beginning of the
/// prior year gives year-to-date comparisons a full previous year to work with.
pub const INITIAL_START_DATE: &str = "2024-01-01";

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub DatePart, pub DatePart);

impl Iterator for DateRange {
    type Item = DatePart;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0.add_days(1);
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

/// An inclusive reporting window.
#[derive(Clone, Eq, PartialEq, Copy, Debug, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: DatePart,
    pub to: DatePart,
}

/// Preset windows offered next to the custom range picker.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub enum QuickPick {
    Last30Days,
    LastQuarter,
    Last6Months,
    Last12Months,
}

impl QuickPick {
    pub fn window(&self, today: DatePart) -> DateWindow {
        match self {
            QuickPick::Last30Days => DateWindow::trailing_days(today, 30),
            QuickPick::LastQuarter => DateWindow::trailing_months(today, 3),
            QuickPick::Last6Months => DateWindow::trailing_months(today, 6),
            QuickPick::Last12Months => DateWindow::trailing_months(today, 12),
        }
    }
}

impl DateWindow {
    /// The window used when nothing has been selected yet:
    /// [`INITIAL_START_DATE`] through today.
    pub fn default_for(today: DatePart) -> DateWindow {
        match DatePart::parse_iso(INITIAL_START_DATE) {
            Ok(from) => DateWindow { from, to: today },
            Err(_) => DateWindow::trailing_days(today, DEFAULT_WINDOW_DAYS),
        }
    }

    /// `days` days ending today, inclusive.
    pub fn trailing_days(today: DatePart, days: u32) -> DateWindow {
        let span = i64::from(days.max(1)) - 1;
        DateWindow {
            from: today.add_days(-span),
            to: today,
        }
    }

    /// From the same day `months` months ago through today. Days that don't
    /// exist in the earlier month clamp to its last day.
    pub fn trailing_months(today: DatePart, months: u32) -> DateWindow {
        let from = today
            .as_naive_date()
            .checked_sub_months(chrono::Months::new(months))
            .map(DatePart::from)
            .unwrap_or(today);
        DateWindow { from, to: today }
    }

    /// Fill in missing bounds and put them in order.
    ///
    /// A lone end date gets a [`DEFAULT_WINDOW_DAYS`] window ending there, a
    /// lone start date one beginning there, and no dates at all gives
    /// [`DateWindow::default_for`]. Reversed bounds are swapped.
    pub fn normalize(from: Option<DatePart>, to: Option<DatePart>, today: DatePart) -> DateWindow {
        let span = i64::from(DEFAULT_WINDOW_DAYS) - 1;
        let (from, to) = match (from, to) {
            (None, None) => {
                let fallback = DateWindow::default_for(today);
                (fallback.from, fallback.to)
            }
            (None, Some(to)) => (to.add_days(-span), to),
            (Some(from), None) => (from, from.add_days(span)),
            (Some(from), Some(to)) => (from, to),
        };
        if from > to {
            DateWindow { from: to, to: from }
        } else {
            DateWindow { from, to }
        }
    }

    pub fn contains(&self, date: DatePart) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        self.from.diff_days(&self.to) + 1
    }
}
