pub mod csv_table;
pub mod daily_usage;
pub mod date_range;
pub mod record;
pub mod table;
