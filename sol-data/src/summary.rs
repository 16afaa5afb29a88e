//! KPI metrics, chart series and table rows for the daily dataset.

use serde::Serialize;
use sol_meter::daily_usage::DailyUsage;
use sol_utils::dates::DatePart;
use std::collections::{BTreeMap, HashMap};

/// The best solar day in the selected window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProductionDay {
    pub date: DatePart,
    pub solar_kwh: f64,
    pub home_kwh: f64,
    pub grid_export: f64,
}

/// Solar production for a period-to-date and the comparable stretch of the
/// previous period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub value: f64,
    pub previous: f64,
    pub delta: f64,
    pub start: Option<DatePart>,
    pub end: Option<DatePart>,
    pub current_row_count: usize,
    pub previous_row_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiMetrics {
    pub total_solar: f64,
    pub total_use: f64,
    pub total_import: f64,
    pub total_export: f64,
    pub day_count: usize,
    pub avg_daily_use: f64,
    pub avg_daily_prod: f64,
    pub self_sufficiency: f64,
    pub top_production_day: Option<TopProductionDay>,
    pub week_to_date: PeriodComparison,
    pub month_to_date: PeriodComparison,
    pub year_to_date: PeriodComparison,
}

impl KpiMetrics {
    /// What all home use would have cost from the grid, less the actual
    /// grid bill (imports charged, exports credited). Never negative.
    pub fn estimated_savings(&self, import_rate: f64, export_rate: f64) -> f64 {
        let cost_without_solar = self.total_use * import_rate;
        let cost_with_solar = self.total_import * import_rate - self.total_export * export_rate;
        (cost_without_solar - cost_with_solar).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: DatePart,
    pub usage: f64,
    pub prod: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub month: String,
    pub usage: f64,
    pub prod: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub recent: Vec<DailyPoint>,
    pub monthly: Vec<MonthlyPoint>,
}

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Solar production summed over `rows` dated within `start..=end`.
fn sum_production_between(rows: &[DailyUsage], start: DatePart, end: DatePart) -> (f64, usize) {
    rows.iter()
        .filter(|row| start <= row.date && row.date <= end)
        .fold((0.0, 0), |(sum, count), row| {
            (sum + finite(row.solar_kwh), count + 1)
        })
}

fn comparison(
    (value, current_row_count): (f64, usize),
    (previous, previous_row_count): (f64, usize),
    start: DatePart,
    end: DatePart,
) -> PeriodComparison {
    PeriodComparison {
        value,
        previous,
        delta: value - previous,
        start: Some(start),
        end: Some(end),
        current_row_count,
        previous_row_count,
    }
}

/// KPI metrics for `window_rows`, with period-to-date comparisons drawn from
/// `all_rows`.
///
/// Period-to-date figures are anchored on the latest day that has any data
/// reported, so a trailing run of not-yet-reported days doesn't zero out
/// the current week. When `all_rows` is empty the window rows are used.
pub fn kpi_metrics(window_rows: &[DailyUsage], all_rows: &[DailyUsage]) -> KpiMetrics {
    let all_rows = if all_rows.is_empty() {
        window_rows
    } else {
        all_rows
    };

    let mut metrics = KpiMetrics::default();
    let mut top: Option<TopProductionDay> = None;
    for row in window_rows {
        let solar = finite(row.solar_kwh);
        metrics.total_solar += solar;
        metrics.total_use += finite(row.home_kwh);
        metrics.total_import += finite(row.grid_import);
        metrics.total_export += finite(row.grid_export);
        metrics.day_count += 1;

        let replaces_top = match &top {
            None => true,
            Some(best) => {
                solar > best.solar_kwh || (solar == best.solar_kwh && row.date > best.date)
            }
        };
        if replaces_top {
            top = Some(TopProductionDay {
                date: row.date,
                solar_kwh: solar,
                home_kwh: finite(row.home_kwh),
                grid_export: finite(row.grid_export),
            });
        }
    }
    metrics.top_production_day = top;

    if metrics.day_count > 0 {
        metrics.avg_daily_use = metrics.total_use / metrics.day_count as f64;
        metrics.avg_daily_prod = metrics.total_solar / metrics.day_count as f64;
    }
    if metrics.total_use > 0.0 {
        metrics.self_sufficiency = metrics.total_solar / metrics.total_use;
    }

    let current = all_rows
        .iter()
        .filter(|row| row.has_complete_data())
        .map(|row| row.date)
        .max()
        .or_else(|| all_rows.iter().map(|row| row.date).max());
    if let Some(current) = current {
        metrics.week_to_date = week_to_date(all_rows, current);
        metrics.month_to_date = month_to_date(all_rows, current);
        metrics.year_to_date = year_to_date(all_rows, current);
    }
    metrics
}

/// Sunday through `current`, against the same weekdays one week earlier.
fn week_to_date(rows: &[DailyUsage], current: DatePart) -> PeriodComparison {
    let start_of_week = current.add_days(-i64::from(current.weekday().num_days_from_sunday()));
    let mut week_rows: Vec<&DailyUsage> = rows
        .iter()
        .filter(|row| start_of_week <= row.date && row.date <= current)
        .collect();
    week_rows.sort_by_key(|row| row.date);
    if week_rows.iter().any(|row| row.has_complete_data()) {
        week_rows.retain(|row| row.has_complete_data());
    }

    let by_date: HashMap<DatePart, &DailyUsage> = rows.iter().map(|row| (row.date, row)).collect();
    let value: f64 = week_rows.iter().map(|row| finite(row.solar_kwh)).sum();
    // a weekday with no row a week earlier still counts, as zero
    let previous: f64 = week_rows
        .iter()
        .filter_map(|row| by_date.get(&row.date.add_days(-7)))
        .map(|row| finite(row.solar_kwh))
        .sum();

    let start = week_rows.first().map(|row| row.date).unwrap_or(start_of_week);
    let end = week_rows.last().map(|row| row.date).unwrap_or(current);
    comparison(
        (value, week_rows.len()),
        (previous, week_rows.len()),
        start,
        end,
    )
}

/// First of the month through `current`, against the same number of days
/// at the start of the previous month (capped at that month's length).
fn month_to_date(rows: &[DailyUsage], current: DatePart) -> PeriodComparison {
    let start_of_month = current.start_of_month();
    let prev_month_start = start_of_month.add_days(-1).start_of_month();
    let comparable_days = current.day().min(prev_month_start.days_in_month());
    let prev_month_end = prev_month_start.add_days(i64::from(comparable_days) - 1);
    comparison(
        sum_production_between(rows, start_of_month, current),
        sum_production_between(rows, prev_month_start, prev_month_end),
        start_of_month,
        current,
    )
}

/// 1 January through `current`, against the same number of days from
/// 1 January of the previous year.
fn year_to_date(rows: &[DailyUsage], current: DatePart) -> PeriodComparison {
    let start_of_year = current.start_of_year();
    let ytd_days = start_of_year.diff_days(&current) + 1;
    let prev_year_start = start_of_year.add_days(-1).start_of_year();
    let prev_year_end = prev_year_start.add_days(ytd_days - 1);
    comparison(
        sum_production_between(rows, start_of_year, current),
        sum_production_between(rows, prev_year_start, prev_year_end),
        start_of_year,
        current,
    )
}

/// Daily usage/production points in date order, and per-month totals.
pub fn chart_series(rows: &[DailyUsage]) -> ChartSeries {
    let mut sorted: Vec<&DailyUsage> = rows.iter().collect();
    sorted.sort_by_key(|row| row.date);

    let recent = sorted
        .iter()
        .map(|row| DailyPoint {
            date: row.date,
            usage: finite(row.home_kwh),
            prod: finite(row.solar_kwh),
        })
        .collect();

    let mut monthly: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for row in &sorted {
        let entry = monthly.entry((row.date.year(), row.date.month())).or_default();
        entry.0 += finite(row.home_kwh);
        entry.1 += finite(row.solar_kwh);
    }
    let monthly = monthly
        .into_iter()
        .map(|((year, month), (usage, prod))| MonthlyPoint {
            month: format!("{year:04}-{month:02}"),
            usage,
            prod,
        })
        .collect();

    ChartSeries { recent, monthly }
}

/// Rows for the data table, newest first.
pub fn table_rows(rows: &[DailyUsage]) -> Vec<DailyUsage> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}
