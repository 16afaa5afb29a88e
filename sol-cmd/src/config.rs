//! Settings file for the CLI.
//!
//! All fields are optional; command line arguments take precedence. Rates
//! not given fall back to [`DEFAULT_IMPORT_RATE`] and [`DEFAULT_EXPORT_RATE`].
//!
//! ```json
//! {
//!   "table_csv": "data/meter.csv",
//!   "daily_csv": "data/daily.csv",
//!   "import_rate": 0.42,
//!   "export_rate": 0.08
//! }
//! ```

use anyhow::{anyhow, Context};
use log::debug;
use serde::{Deserialize, Serialize};

/// Price per kWh imported when no rate is configured.
pub const DEFAULT_IMPORT_RATE: f64 = 0.35;

/// Credit per kWh exported when no rate is configured.
pub const DEFAULT_EXPORT_RATE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Meter table that readings are recorded into.
    pub table_csv: Option<String>,
    /// Combined daily usage/production export.
    pub daily_csv: Option<String>,
    /// Price paid per kWh imported from the grid.
    pub import_rate: f64,
    /// Credit received per kWh exported to the grid.
    pub export_rate: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            table_csv: None,
            daily_csv: None,
            import_rate: DEFAULT_IMPORT_RATE,
            export_rate: DEFAULT_EXPORT_RATE,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> anyhow::Result<Settings> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&str>) -> anyhow::Result<Settings> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {path}"))?;
        let settings =
            Settings::from_json(&json).with_context(|| format!("invalid settings {path}"))?;
        debug!("Loaded settings from {}: {:?}", path, settings);
        Ok(settings)
    }

    pub fn resolve_table_csv(&self, arg: Option<String>) -> anyhow::Result<String> {
        arg.or_else(|| self.table_csv.clone())
            .ok_or_else(|| anyhow!("no meter table given; pass --table-csv or set table_csv"))
    }

    pub fn resolve_daily_csv(&self, arg: Option<String>) -> anyhow::Result<String> {
        arg.or_else(|| self.daily_csv.clone())
            .ok_or_else(|| anyhow!("no daily dataset given; pass --daily-csv or set daily_csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings() {
        let settings = Settings::from_json(r#"{"table_csv": "meter.csv"}"#).unwrap();
        assert_eq!(settings.table_csv.as_deref(), Some("meter.csv"));
        assert_eq!(settings.daily_csv, None);
        assert_eq!(settings.import_rate, DEFAULT_IMPORT_RATE);
        assert_eq!(settings.export_rate, DEFAULT_EXPORT_RATE);

        let rated = Settings::from_json(r#"{"import_rate": 0.42}"#).unwrap();
        assert_eq!(rated.import_rate, 0.42);
        assert_eq!(rated.export_rate, 0.05);
    }

    #[test]
    fn test_arguments_override_settings() {
        let settings = Settings {
            table_csv: Some("from-settings.csv".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            settings.resolve_table_csv(Some("from-arg.csv".to_string())).unwrap(),
            "from-arg.csv"
        );
        assert_eq!(settings.resolve_table_csv(None).unwrap(), "from-settings.csv");
        assert!(settings.resolve_daily_csv(None).is_err());
    }

    #[test]
    fn test_no_settings_file() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
        assert!(Settings::load(Some("/definitely/not/here.json")).is_err());
    }
}
