//! Shared types, error model, and configuration for hcmdoc.
//!
//! This crate is the foundation depended on by all other hcmdoc crates.
//! It provides:
//! - [`HcmDocError`]: the unified error type
//! - Domain types ([`LinkRecord`], [`TableMetadata`], [`ViewMetadata`], [`ObjectType`])
//! - Configuration ([`AppConfig`], [`HarvestConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_BASE_URL, HarvestConfig, HarvestPolicyConfig, SourceConfig, config_dir,
    config_file_path, init_config, init_config_at, load_config, load_config_from,
};
pub use error::{HcmDocError, Result};
pub use types::{
    IndexRecord, LinkRecord, ObjectMetadata, ObjectType, PrimaryKey, TableColumn, TableMetadata,
    ViewColumn, ViewMetadata,
};
