//! JSON artifact I/O.

use std::io::{BufWriter, Write};
use std::path::Path;

use hcmdoc_shared::{HcmDocError, LinkRecord, Result};
use serde::Serialize;
use tracing::debug;

/// Read the link list produced by the Format Converter.
///
/// Keys beyond `name` and `url` are ignored; a record missing either key is
/// a validation error for the whole file.
pub fn read_links_json(path: &Path) -> Result<Vec<LinkRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| HcmDocError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| HcmDocError::validation(format!("{}: {e}", path.display())))
}

/// Write `value` as UTF-8 JSON pretty-printed with a 2-space indent.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| HcmDocError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| HcmDocError::Serialization(format!("{}: {e}", path.display())))?;
    writer.flush().map_err(|e| HcmDocError::io(path, e))?;

    debug!(path = %path.display(), "JSON artifact written");
    Ok(())
}
