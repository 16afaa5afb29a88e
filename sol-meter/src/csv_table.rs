//! CSV files as the meter table's row source and row sink.
//!
//! A meter table file looks like the spreadsheet it replaces: a header row
//! followed by `date,cumulative,delta` rows, oldest first.
//!
//! ```text
//! Date,ITD,Prod
//! 2025-06-01,1000,12
//! 6/2/2025,1010,10
//! ```

use crate::daily_usage::DailyUsage;
use crate::record::MeterRecord;
use crate::table::Table;
use anyhow::Context;
use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Parse a meter table from a CSV string. The header row is kept as row 0.
pub fn parse_table(csv_object: &str) -> anyhow::Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv_object.as_bytes());
    let mut table = Table::new();
    for result in rdr.records() {
        let record = result?;
        table.push(record.iter().map(String::from).collect());
    }
    Ok(table)
}

/// Read a meter table file. A file that doesn't exist yet is an empty table.
pub fn read_table(path: impl AsRef<Path>) -> anyhow::Result<Table> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("{} does not exist, treating as empty table", path.display());
        return Ok(Table::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read meter table {}", path.display()))?;
    let table = parse_table(&contents)
        .with_context(|| format!("failed to parse meter table {}", path.display()))?;
    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Append records, in order, to the end of a meter table file.
///
/// Creates the file if needed. If the existing file doesn't end in a
/// newline one is written first so the new rows don't run into the last
/// existing row.
pub fn append_rows(path: impl AsRef<Path>, records: &[MeterRecord]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open meter table {}", path.display()))?;

    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
    }

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
    for record in records {
        wtr.write_record(record.to_row())?;
    }
    wtr.flush()?;
    info!("Appended {} row(s) to {}", records.len(), path.display());
    Ok(())
}

/// Read the combined daily usage/production export.
pub fn read_daily_usage(path: impl AsRef<Path>) -> anyhow::Result<Vec<DailyUsage>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read daily usage {}", path.display()))?;
    DailyUsage::parse_daily_usage_csv(&contents)
        .with_context(|| format!("failed to parse daily usage {}", path.display()))
}
