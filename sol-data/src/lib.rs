//! Data processing for solar meter readings.
//!
//! `backfill` keeps a cumulative meter table dense when readings are
//! recorded after missing days; `summary` turns the combined daily dataset
//! into KPI metrics, chart series and table rows.

pub mod backfill;
pub mod summary;
