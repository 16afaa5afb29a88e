use csv::ReaderBuilder;
use log::warn;
use serde::{Deserialize, Serialize};
use sol_utils::{dates::DatePart, numeric::parse_number};

/// One day of the combined usage/production dataset.
///
/// Values are kWh. `net_kwh` is grid import minus export as reported by the
/// utility, so `home_kwh` is `solar_kwh + net_kwh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: DatePart,
    pub solar_kwh: f64,
    pub home_kwh: f64,
    pub net_kwh: f64,
    pub grid_import: f64,
    pub grid_export: f64,
}

/// Raw CSV row. Every numeric column may be blank in the export.
#[derive(Debug, Deserialize)]
struct DailyUsageRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "SolarkWh", default)]
    solar_kwh: Option<String>,
    #[serde(rename = "HomekWh", default)]
    home_kwh: Option<String>,
    #[serde(rename = "NetkWh", default)]
    net_kwh: Option<String>,
    #[serde(rename = "GridImport", default)]
    grid_import: Option<String>,
    #[serde(rename = "GridExport", default)]
    grid_export: Option<String>,
}

/// Blank and unreadable cells count as zero in the daily dataset.
fn kwh(cell: Option<&str>) -> f64 {
    cell.and_then(|s| parse_number(s).ok())
        .unwrap_or(0.0)
}

impl DailyUsage {
    /// True if any of the measured fields is non-zero. Days the utility
    /// hasn't reported yet come through as all zeros.
    pub fn has_complete_data(&self) -> bool {
        [
            self.solar_kwh,
            self.home_kwh,
            self.grid_import,
            self.grid_export,
            self.net_kwh,
        ]
        .iter()
        .any(|v| v.abs() > 0.0)
    }

    /// Parse the daily dataset export.
    ///
    /// Expected CSV columns (with headers):
    /// `Date,SolarkWh,HomekWh,NetkWh,GridImport,GridExport`. Rows whose date
    /// can't be read are skipped with a warning.
    pub fn parse_daily_usage_csv(csv_object: &str) -> anyhow::Result<Vec<DailyUsage>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_object.as_bytes());
        let mut days = Vec::new();
        for result in rdr.deserialize::<DailyUsageRow>() {
            let row = result?;
            let date = match DatePart::parse(&row.date) {
                Ok(date) => date,
                Err(e) => {
                    warn!("Skipping daily usage row: {}", e);
                    continue;
                }
            };
            days.push(DailyUsage {
                date,
                solar_kwh: kwh(row.solar_kwh.as_deref()),
                home_kwh: kwh(row.home_kwh.as_deref()),
                net_kwh: kwh(row.net_kwh.as_deref()),
                grid_import: kwh(row.grid_import.as_deref()),
                grid_export: kwh(row.grid_export.as_deref()),
            });
        }
        Ok(days)
    }
}
