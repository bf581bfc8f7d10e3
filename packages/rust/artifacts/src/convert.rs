//! CSV → JSON records conversion.
//!
//! Any tabular input is accepted: headers are lowercased, every row becomes a
//! JSON object keyed by those headers, values stay the strings found in the
//! file, and row and column order are preserved.

use std::io::Read;
use std::path::Path;

use hcmdoc_shared::{HcmDocError, Result};
use serde_json::{Map, Value};
use tracing::{info, instrument};

/// Convert the CSV at `csv_path` into a pretty JSON array at `json_path`.
///
/// Returns the number of rows written.
#[instrument(skip_all, fields(csv = %csv_path.display(), json = %json_path.display()))]
pub fn convert_csv_to_json(csv_path: &Path, json_path: &Path) -> Result<usize> {
    let file = std::fs::File::open(csv_path).map_err(|e| HcmDocError::io(csv_path, e))?;
    let records = csv_to_records(file).map_err(|e| match e {
        HcmDocError::Validation { message } => {
            HcmDocError::validation(format!("{}: {message}", csv_path.display()))
        }
        other => other,
    })?;

    crate::json::write_json_pretty(json_path, &records)?;

    info!(rows = records.len(), "converted CSV to JSON");
    Ok(records.len())
}

/// Read CSV from `reader` into JSON objects keyed by lowercased header.
///
/// When two headers collide after lowercasing, the later column wins.
/// Ragged rows and invalid UTF-8 are reported as validation errors.
pub fn csv_to_records<R: Read>(reader: R) -> Result<Vec<Map<String, Value>>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| HcmDocError::validation(format!("unreadable CSV header: {e}")))?
        .iter()
        .map(str::to_lowercase)
        .collect();

    rdr.records()
        .map(|row| -> Result<Map<String, Value>> {
            let row = row.map_err(|e| HcmDocError::validation(format!("malformed CSV: {e}")))?;
            Ok(headers
                .iter()
                .zip(row.iter())
                .map(|(key, value)| (key.clone(), Value::String(value.to_string())))
                .collect::<Map<String, Value>>())
        })
        .collect()
}
