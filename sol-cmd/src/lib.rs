//! Command implementations for the solar meter CLI.
//!
//! Provides subcommands for inspecting a meter table, recording a new
//! reading with back-fill for skipped days, and summarizing the daily
//! usage/production dataset.

use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use crate::config::Settings;
use sol_meter::date_range::{DateWindow, QuickPick};
use sol_utils::dates::DatePart;
use std::io;

pub mod config;
pub mod record;
pub mod summary;

#[derive(Subcommand)]
pub enum Command {
    /// Show the last row of a meter table that has a date filled in
    LastRow {
        /// Path to the meter table CSV
        #[arg(short = 't', long)]
        table_csv: Option<String>,
    },

    /// Record a cumulative reading, back-filling any skipped days
    Record {
        /// Path to the meter table CSV (appended in place)
        #[arg(short = 't', long)]
        table_csv: Option<String>,

        /// Date of the reading as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Inception-to-date total shown on the meter
        #[arg(long, allow_hyphen_values = true)]
        itd: String,

        /// Production for the reading's own day
        #[arg(long, allow_hyphen_values = true)]
        prod: String,

        /// Print the rows without appending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print KPI metrics and chart series for the daily dataset as JSON
    Summary {
        /// Path to the combined daily usage/production CSV
        #[arg(short = 'd', long)]
        daily_csv: Option<String>,

        /// First day of the window (YYYY-MM-DD or M/D/YYYY)
        #[arg(long)]
        from: Option<String>,

        /// Last day of the window (YYYY-MM-DD or M/D/YYYY)
        #[arg(long)]
        to: Option<String>,

        /// Preset window ending today; overrides --from and --to
        #[arg(long, value_enum)]
        range: Option<RangeArg>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RangeArg {
    #[value(name = "30d")]
    Last30Days,
    #[value(name = "quarter")]
    LastQuarter,
    #[value(name = "6mo")]
    Last6Months,
    #[value(name = "12mo")]
    Last12Months,
}

impl From<RangeArg> for QuickPick {
    fn from(value: RangeArg) -> Self {
        match value {
            RangeArg::Last30Days => QuickPick::Last30Days,
            RangeArg::LastQuarter => QuickPick::LastQuarter,
            RangeArg::Last6Months => QuickPick::Last6Months,
            RangeArg::Last12Months => QuickPick::Last12Months,
        }
    }
}

fn parse_bound(raw: Option<&str>, flag: &str) -> anyhow::Result<Option<DatePart>> {
    raw.map(|s| DatePart::parse(s).with_context(|| format!("invalid --{flag} date")))
        .transpose()
}

/// Work out the reporting window from the summary arguments.
pub fn resolve_window(
    from: Option<&str>,
    to: Option<&str>,
    range: Option<RangeArg>,
    today: DatePart,
) -> anyhow::Result<DateWindow> {
    if let Some(range) = range {
        return Ok(QuickPick::from(range).window(today));
    }
    let from = parse_bound(from, "from")?;
    let to = parse_bound(to, "to")?;
    Ok(DateWindow::normalize(from, to, today))
}

pub fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::LastRow { table_csv } => {
            let table_csv = settings.resolve_table_csv(table_csv)?;
            let last = record::run_last_row(&table_csv)?;
            record::write_last_row(io::stdout().lock(), &last)
        }
        Command::Record {
            table_csv,
            date,
            itd,
            prod,
            dry_run,
        } => {
            let table_csv = settings.resolve_table_csv(table_csv)?;
            let rows = record::run_record(&table_csv, date.as_deref(), &itd, &prod, dry_run)?;
            record::write_rows(io::stdout().lock(), &rows)
        }
        Command::Summary {
            daily_csv,
            from,
            to,
            range,
        } => {
            let daily_csv = settings.resolve_daily_csv(daily_csv)?;
            let window = resolve_window(from.as_deref(), to.as_deref(), range, DatePart::today())?;
            let report = summary::run_summary(&daily_csv, window, settings)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
