//! Inspect a meter table and record new readings into it.

use anyhow::Context;
use log::info;
use sol_data::backfill::compute_backfill_rows;
use sol_meter::csv_table::{append_rows, read_table};
use sol_meter::record::MeterRecord;
use sol_meter::table::{locate_last_row, LastRow};
use sol_utils::dates::DatePart;
use sol_utils::numeric::parse_number;
use std::io::Write;

/// Find the last dated row of the meter table at `table_csv`.
pub fn run_last_row(table_csv: &str) -> anyhow::Result<LastRow> {
    let table = read_table(table_csv)?;
    let last = locate_last_row(&table);
    match &last.row {
        Some(_) => info!("Last data row index: {}", last.index),
        None => info!("No data rows yet in {}", table_csv),
    }
    Ok(last)
}

/// Record a reading into the meter table at `table_csv`.
///
/// `itd` and `prod` are parsed permissively so values copied from a meter
/// display ("12,345 kWh") are accepted. Skipped days since the last row are
/// back-filled. Nothing is written when `dry_run` is set or when any check
/// fails. Returns the rows that were (or would be) appended.
pub fn run_record(
    table_csv: &str,
    date: Option<&str>,
    itd: &str,
    prod: &str,
    dry_run: bool,
) -> anyhow::Result<Vec<MeterRecord>> {
    let input_total = parse_number(itd).context("ITD must be a number")?;
    let input_delta = parse_number(prod).context("Prod must be a number")?;
    let date = match date {
        Some(date) => date.to_string(),
        None => DatePart::today().to_string(),
    };

    let table = read_table(table_csv)?;
    let rows = compute_backfill_rows(&table, &date, input_total, input_delta)
        .with_context(|| format!("cannot record {date} into {table_csv}"))?;

    if dry_run {
        info!("Dry run: {} row(s) not written", rows.len());
    } else {
        append_rows(table_csv, &rows)?;
        info!("Saved {} row(s)", rows.len());
    }
    Ok(rows)
}

/// Write a header row and optional data row as CSV. Nothing but CSV goes
/// to `out`.
pub fn write_last_row<W: Write>(out: W, last: &LastRow) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);
    wtr.write_record(&last.headers)?;
    if let Some(row) = &last.row {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write meter records as CSV rows, without headers.
pub fn write_rows<W: Write>(out: W, rows: &[MeterRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    for row in rows {
        wtr.write_record(row.to_row())?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TABLE: &str = "Date,ITD,Prod\n2025-06-01,1000,12\n";

    fn table_file(dir: &TempDir) -> String {
        let path = dir.path().join("meter.csv");
        fs::write(&path, TABLE).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_record_backfills_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = table_file(&dir);

        let rows = run_record(&path, Some("2025-06-04"), "1,030", "10 kWh", false).unwrap();
        assert_eq!(rows.len(), 3);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Date,ITD,Prod\n2025-06-01,1000,12\n\
             2025-06-02,1010,10\n2025-06-03,1020,10\n2025-06-04,1030,10\n"
        );

        let last = run_last_row(&path).unwrap();
        assert_eq!(last.index, 4);
        assert_eq!(last.row.unwrap()[0], "2025-06-04");
    }

    #[test]
    fn test_dry_run_leaves_table_alone() {
        let dir = TempDir::new().unwrap();
        let path = table_file(&dir);
        let rows = run_record(&path, Some("2025-06-02"), "1010", "10", true).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), TABLE);
    }

    #[test]
    fn test_failed_record_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = table_file(&dir);
        assert!(run_record(&path, Some("2025-06-04"), "1005", "10", false).is_err());
        assert!(run_record(&path, Some("2025-06-01"), "1010", "10", false).is_err());
        assert!(run_record(&path, Some("2025-06-02"), "", "10", false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), TABLE);
    }

    #[test]
    fn test_record_into_missing_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.csv");
        let err = run_record(path.to_str().unwrap(), Some("2025-06-02"), "1", "1", false)
            .unwrap_err();
        assert!(format!("{err:#}").contains("no last row found"));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_helpers() {
        let last = LastRow {
            headers: vec!["Date".into(), "ITD".into(), "Prod".into()],
            row: Some(vec!["2025-06-01".into(), "1000".into()]),
            index: 1,
        };
        let mut out = Vec::new();
        write_last_row(&mut out, &last).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Date,ITD,Prod\n2025-06-01,1000\n");

        let rows = vec![MeterRecord::new(DatePart::parse("2025-06-02").unwrap(), 1.5, 0.5)];
        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2025-06-02,1.5,0.5\n");
    }

    #[test]
    fn test_last_row_of_empty_table_is_only_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meter.csv");
        fs::write(&path, "Date,ITD,Prod
").unwrap();

        let last = run_last_row(path.to_str().unwrap()).unwrap();
        assert!(last.row.is_none());
        let mut out = Vec::new();
        write_last_row(&mut out, &last).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Date,ITD,Prod
");
    }
}
