use crate::record::DATE_COLUMN;
use serde::Serialize;

/// A raw meter table: row 0 holds headers, the rest are data rows as read
/// from the row source. Rows may have different lengths.
pub type Table = Vec<Vec<String>>;

/// The last populated row of a table, as found by [`locate_last_row`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LastRow {
    pub headers: Vec<String>,
    /// `None` when the table has no populated data row.
    pub row: Option<Vec<String>>,
    /// Position of `row` in the table, `0` when there is none.
    pub index: usize,
}

/// Find the last data row whose date column is non-blank.
///
/// Scans from the bottom of the table so rows that were only partially
/// written (blank date cell) are skipped. Tables with fewer than two rows
/// have no data rows.
pub fn locate_last_row(table: &[Vec<String>]) -> LastRow {
    let headers = table.first().cloned().unwrap_or_default();
    if table.len() < 2 {
        return LastRow {
            headers,
            row: None,
            index: 0,
        };
    }
    let found = table
        .iter()
        .enumerate()
        .skip(1)
        .rev()
        .find(|(_, row)| {
            row.get(DATE_COLUMN)
                .is_some_and(|cell| !cell.trim().is_empty())
        });
    match found {
        Some((index, row)) => LastRow {
            headers,
            row: Some(row.clone()),
            index,
        },
        None => LastRow {
            headers,
            row: None,
            index: 0,
        },
    }
}
