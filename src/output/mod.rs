//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use photoop::error::Result;

pub mod json;
pub mod table;

/// Print rows in the requested format
pub fn print_rows<T: Tabled + Serialize>(rows: &[T], format: OutputFormat) -> Result<()> {
    let output = match format {
        OutputFormat::Table => table::format_table(rows),
        OutputFormat::Json => json::format_json(rows)?,
    };
    println!("{}", output);
    Ok(())
}

/// Print any serializable value as JSON, or as a table of rows
pub fn print_value<V, T>(value: &V, rows: &[T], format: OutputFormat) -> Result<()>
where
    V: Serialize + ?Sized,
    T: Tabled,
{
    let output = match format {
        OutputFormat::Table => table::format_table(rows),
        OutputFormat::Json => json::format_json(value)?,
    };
    println!("{}", output);
    Ok(())
}
