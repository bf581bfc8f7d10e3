//! File artifacts exchanged between pipeline stages.
//!
//! - [`write_links_csv`]: the Link Extractor's `name,url` table
//! - [`convert_csv_to_json`]: the Format Converter (CSV → JSON records)
//! - [`read_links_json`] / [`write_json_pretty`]: the Metadata Extractor's input and outputs

mod convert;
mod json;
mod links;

pub use convert::{convert_csv_to_json, csv_to_records};
pub use json::{read_links_json, write_json_pretty};
pub use links::write_links_csv;
