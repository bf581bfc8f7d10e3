//! `name,url` CSV written by the Link Extractor.

use std::path::Path;

use hcmdoc_shared::{HcmDocError, LinkRecord, Result};
use tracing::debug;

const HEADER: [&str; 2] = ["name", "url"];

/// Write link records as CSV with a `name,url` header, in the given order.
///
/// The header is written even when `links` is empty.
pub fn write_links_csv(path: &Path, links: &[LinkRecord]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| HcmDocError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(HEADER).map_err(|e| csv_error(path, e))?;
    for link in links {
        writer
            .write_record([link.name.as_str(), link.url.as_str()])
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| HcmDocError::io(path, e))?;

    debug!(path = %path.display(), rows = links.len(), "links CSV written");
    Ok(())
}

fn csv_error(path: &Path, e: csv::Error) -> HcmDocError {
    HcmDocError::Serialization(format!("{}: {e}", path.display()))
}
