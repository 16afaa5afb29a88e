//! KPI summary of the daily usage/production dataset.

use crate::config::Settings;
use log::info;
use serde::Serialize;
use sol_data::summary::{chart_series, kpi_metrics, table_rows, ChartSeries, KpiMetrics};
use sol_meter::csv_table::read_daily_usage;
use sol_meter::daily_usage::DailyUsage;
use sol_meter::date_range::DateWindow;

/// Everything the dashboard shows for one window.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub window: DateWindow,
    pub kpi: KpiMetrics,
    pub estimated_savings: f64,
    pub chart: ChartSeries,
    pub rows: Vec<DailyUsage>,
}

pub fn build_summary(
    days: &[DailyUsage],
    window: DateWindow,
    settings: &Settings,
) -> SummaryReport {
    let window_rows: Vec<DailyUsage> = days
        .iter()
        .filter(|day| window.contains(day.date))
        .cloned()
        .collect();
    let kpi = kpi_metrics(&window_rows, days);
    let estimated_savings = kpi.estimated_savings(settings.import_rate, settings.export_rate);
    SummaryReport {
        window,
        chart: chart_series(&window_rows),
        rows: table_rows(&window_rows),
        kpi,
        estimated_savings,
    }
}

/// Summarize the daily dataset at `daily_csv` for `window`.
pub fn run_summary(
    daily_csv: &str,
    window: DateWindow,
    settings: &Settings,
) -> anyhow::Result<SummaryReport> {
    let days = read_daily_usage(daily_csv)?;
    info!(
        "Summarizing {} to {} from {} day(s) in {}",
        window.from,
        window.to,
        days.len(),
        daily_csv
    );
    Ok(build_summary(&days, window, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sol_utils::dates::DatePart;
    use std::fs;
    use tempfile::TempDir;

    const DAILY: &str = "\
Date,SolarkWh,HomekWh,NetkWh,GridImport,GridExport
2025-05-31,40,20,-20,0,20
2025-06-01,30,20,-10,0,10
2025-06-02,10,20,10,10,0
";

    fn date(s: &str) -> DatePart {
        DatePart::parse(s).unwrap()
    }

    #[test]
    fn test_summary_only_counts_window_days() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daily.csv");
        fs::write(&path, DAILY).unwrap();

        let window = DateWindow {
            from: date("2025-06-01"),
            to: date("2025-06-30"),
        };
        let settings = Settings {
            import_rate: 0.5,
            export_rate: 0.25,
            ..Settings::default()
        };
        let report = run_summary(path.to_str().unwrap(), window, &settings).unwrap();
        assert_eq!(report.kpi.day_count, 2);
        assert_eq!(report.kpi.total_solar, 40.0);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].date, date("2025-06-02"));
        assert_eq!(report.chart.monthly.len(), 1);
        // year-to-date still sees the day before the window
        assert_eq!(report.kpi.year_to_date.value, 80.0);
        // 40 kWh used would cost 20; the bill was 10 imported less 10 exported
        assert_eq!(report.estimated_savings, 17.5);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["window"]["from"], "2025-06-01");
    }
}
