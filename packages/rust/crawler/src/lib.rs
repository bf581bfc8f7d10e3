//! Page loading and sequential metadata harvesting.
//!
//! This crate provides:
//! - [`PageSource`]: the rendering session pages are loaded through
//! - [`HttpPageSource`]: the reqwest-backed default source
//! - [`Harvester`]: visits every link in order and sorts the extracted
//!   records into tables and views

mod harvest;
mod source;

pub use harvest::{HarvestProgress, HarvestReport, Harvester, SilentHarvestProgress};
pub use source::{HttpPageSource, PageSource};
