//! Back-fill for gaps between meter readings.
//!
//! Readings are logged by hand and days get skipped. When a new cumulative
//! reading arrives after a gap, the growth not claimed by the new day's own
//! delta is spread evenly over the missing days so daily charts stay smooth,
//! and the user's row is written exactly as entered.

use log::debug;
use sol_meter::date_range::DateRange;
use sol_meter::record::{MeterRecord, Observation, CUMULATIVE_COLUMN, DATE_COLUMN};
use sol_meter::table::locate_last_row;
use sol_utils::dates::DatePart;
use sol_utils::numeric::parse_number;
use thiserror::Error;

/// How far below zero the unclaimed growth may fall before the totals are
/// treated as inconsistent.
pub const INCONSISTENCY_TOLERANCE: f64 = 1e-9;

/// Synthetic deltas smaller than this are written as exactly zero.
pub const ZERO_SNAP_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackfillError {
    #[error("no last row found; the table needs a header row and at least one dated data row")]
    NoAnchorRow,
    #[error("last cumulative total is missing or not numeric: {0:?}")]
    AnchorNotNumeric(String),
    #[error("could not parse last recorded date {0:?}")]
    AnchorDateUnparseable(String),
    #[error("input date must be YYYY-MM-DD, got {0:?}")]
    InputDateInvalid(String),
    #[error("input date {input} must be after the last recorded date {anchor}")]
    InputDateNotAfterAnchor { anchor: DatePart, input: DatePart },
    #[error("input cumulative total or daily delta is not a valid number")]
    NonNumericInput,
    #[error(
        "numbers inconsistent: input total {input_total} is less than last total {anchor_total} plus daily delta {input_delta}"
    )]
    InconsistentTotals {
        anchor_total: f64,
        input_total: f64,
        input_delta: f64,
    },
}

/// Rows to append for a new reading, given the table it will be appended to.
///
/// The anchor is the last row of `table` with a non-blank date. See
/// [`extrapolate`] for the rows produced.
pub fn compute_backfill_rows(
    table: &[Vec<String>],
    input_date: &str,
    input_cumulative_total: f64,
    input_daily_delta: f64,
) -> Result<Vec<MeterRecord>, BackfillError> {
    let last = locate_last_row(table);
    let anchor = last.row.ok_or(BackfillError::NoAnchorRow)?;
    debug!("Anchor row {} of {}: {:?}", last.index, table.len(), anchor);
    let observation = Observation::new(input_date, input_cumulative_total, input_daily_delta);
    extrapolate(&anchor, &observation)
}

/// One row per calendar day from the day after `anchor` through the
/// observation date.
///
/// Only the date and cumulative columns of `anchor` are read. Missing days
/// share `input_total - anchor_total - input_delta` evenly, with the last
/// missing day taking whatever rounding left over so the shares sum exactly.
/// The observation's own row always carries the values as given.
pub fn extrapolate(
    anchor: &[String],
    observation: &Observation,
) -> Result<Vec<MeterRecord>, BackfillError> {
    let anchor_total_cell = anchor.get(CUMULATIVE_COLUMN).map(String::as_str).unwrap_or("");
    let anchor_total = parse_number(anchor_total_cell)
        .map_err(|_| BackfillError::AnchorNotNumeric(anchor_total_cell.to_string()))?;

    let anchor_date_cell = anchor.get(DATE_COLUMN).map(String::as_str).unwrap_or("");
    let anchor_date = DatePart::parse(anchor_date_cell)
        .map_err(|_| BackfillError::AnchorDateUnparseable(anchor_date_cell.to_string()))?;

    let input_date = DatePart::parse_iso(&observation.date)
        .map_err(|_| BackfillError::InputDateInvalid(observation.date.clone()))?;

    let gap_days = anchor_date.diff_days(&input_date);
    if gap_days < 1 {
        return Err(BackfillError::InputDateNotAfterAnchor {
            anchor: anchor_date,
            input: input_date,
        });
    }

    let input_row = MeterRecord::new(
        input_date,
        observation.cumulative_total,
        observation.daily_delta,
    );
    if gap_days == 1 {
        return Ok(vec![input_row]);
    }

    let missing_count = gap_days - 1;
    let delta_total = observation.cumulative_total - anchor_total;
    let missing_sum = delta_total - observation.daily_delta;
    if !delta_total.is_finite() || !missing_sum.is_finite() {
        return Err(BackfillError::NonNumericInput);
    }
    if missing_sum < -INCONSISTENCY_TOLERANCE {
        return Err(BackfillError::InconsistentTotals {
            anchor_total,
            input_total: observation.cumulative_total,
            input_delta: observation.daily_delta,
        });
    }
    debug!(
        "Filling {} missing day(s) after {} with {} total",
        missing_count, anchor_date, missing_sum
    );

    let even_share = missing_sum / missing_count as f64;
    let last_missing = input_date.add_days(-1);
    let mut rows = Vec::with_capacity(gap_days as usize);
    let mut running_total = anchor_total;
    let mut allocated = 0.0;
    for date in DateRange(anchor_date.add_days(1), last_missing) {
        let mut delta = if date < last_missing {
            even_share
        } else {
            missing_sum - allocated
        };
        if delta.abs() < ZERO_SNAP_TOLERANCE {
            delta = 0.0;
        }
        running_total += delta;
        allocated += delta;
        rows.push(MeterRecord::new(date, running_total, delta));
    }
    rows.push(input_row);
    Ok(rows)
}
