use sol_utils::dates::DatePart;

/// Column holding the reading date in a meter table.
pub const DATE_COLUMN: usize = 0;

/// Column holding the inception-to-date cumulative total.
pub const CUMULATIVE_COLUMN: usize = 1;

/// One row of a meter time series.
///
/// `cumulative_total` is the running total-to-date reported by the meter and
/// `daily_delta` the amount attributed to `date` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterRecord {
    pub date: DatePart,
    pub cumulative_total: f64,
    pub daily_delta: f64,
}

impl MeterRecord {
    pub fn new(date: DatePart, cumulative_total: f64, daily_delta: f64) -> MeterRecord {
        MeterRecord {
            date,
            cumulative_total,
            daily_delta,
        }
    }

    /// Render as a table row: `[YYYY-MM-DD, cumulative, delta]`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.cumulative_total.to_string(),
            self.daily_delta.to_string(),
        ]
    }
}

/// A reading entered by the user for a date after the last recorded row.
///
/// The date is kept as typed so that validation happens where the reading
/// is consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: String,
    pub cumulative_total: f64,
    pub daily_delta: f64,
}

impl Observation {
    pub fn new(date: impl Into<String>, cumulative_total: f64, daily_delta: f64) -> Observation {
        Observation {
            date: date.into(),
            cumulative_total,
            daily_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MeterRecord;
    use sol_utils::dates::DatePart;

    #[test]
    fn test_to_row_formats_like_the_table() {
        let date = DatePart::parse("6/2/2025").unwrap();
        let record = MeterRecord::new(date, 1010.0, 10.0);
        assert_eq!(record.to_row(), vec!["2025-06-02", "1010", "10"]);

        let fractional = MeterRecord::new(date, 1000.25, 0.5);
        assert_eq!(fractional.to_row(), vec!["2025-06-02", "1000.25", "0.5"]);

        let zero = MeterRecord::new(date, 1000.0, 0.0);
        assert_eq!(zero.to_row()[2], "0");
    }
}
