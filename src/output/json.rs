//! JSON catalog output
//!
//! The whole run is emitted as one pretty-printed JSON array of records.

use crate::model::BookRecord;
use crate::CatalogError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Serializes records as a pretty-printed JSON array
pub fn format_catalog(records: &[BookRecord]) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Writes the JSON array to a file, creating parent directories as needed
///
/// # Arguments
///
/// * `records` - The records to write
/// * `output_path` - Destination file
pub fn write_catalog(records: &[BookRecord], output_path: &Path) -> Result<(), CatalogError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = format_catalog(records)?;
    fs::write(output_path, json)?;

    tracing::info!(
        "Written {} books to {}",
        records.len(),
        output_path.display()
    );

    Ok(())
}

/// Writes the JSON array, followed by a newline, to any writer
pub fn write_catalog_to<W: Write>(records: &[BookRecord], mut writer: W) -> Result<(), CatalogError> {
    let json = format_catalog(records)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
