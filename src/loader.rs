//! Surgery record loading from CSV
//!
//! Expected header: `management_id,date,weekday,room,start,end,category`.
//! `management_id` and `weekday` may be missing or empty. Cells are kept as
//! text and parsed later by the engine, so row numbers in errors line up with
//! the data rows.

use crate::record::RawRow;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Load raw rows from a CSV file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let file = File::open(path.as_ref()).with_context(|| {
        format!("Failed to open records file: {}", path.as_ref().display())
    })?;
    read_records(file)
        .with_context(|| format!("Failed to read records file: {}", path.as_ref().display()))
}

/// Read raw rows from any CSV source
pub fn read_records<R: Read>(source: R) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<RawRow>().enumerate() {
        let row = result.with_context(|| format!("Malformed CSV data row {}", i + 1))?;
        rows.push(row);
    }
    tracing::debug!("Loaded {} record row(s)", rows.len());
    Ok(rows)
}
