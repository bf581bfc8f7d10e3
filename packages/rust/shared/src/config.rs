//! Application configuration for hcmdoc.
//!
//! User config lives at `~/.hcmdoc/hcmdoc.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HcmDocError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "hcmdoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".hcmdoc";

/// Root of the Oracle HCM data-model reference. TOC hrefs are relative to it.
pub const DEFAULT_BASE_URL: &str = "https://docs.oracle.com/en/cloud/saas/human-resources/oedmh/";

// ---------------------------------------------------------------------------
// Config structs (matching hcmdoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Documentation source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Page harvesting policy.
    #[serde(default)]
    pub harvest: HarvestPolicyConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL every TOC href is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

/// `[harvest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestPolicyConfig {
    /// Settling delay after a page load, before extraction (ms).
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Pause after every page attempt, successful or not (ms).
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with page requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HarvestPolicyConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            throttle_ms: default_throttle_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_settle_ms() -> u64 {
    2000
}
fn default_throttle_ms() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("hcmdoc/", env!("CARGO_PKG_VERSION")).into()
}

// ---------------------------------------------------------------------------
// Harvest config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime harvest configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Delay between loading a page and extracting from it.
    pub settle: Duration,
    /// Pause after every attempt.
    pub throttle: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
}

impl HarvestConfig {
    /// A config with no delays, for tests and local fixtures.
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            throttle: Duration::ZERO,
            ..Self::from(&AppConfig::default())
        }
    }
}

impl From<&AppConfig> for HarvestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.harvest.settle_ms),
            throttle: Duration::from_millis(config.harvest.throttle_ms),
            timeout: Duration::from_secs(config.harvest.timeout_secs),
            user_agent: config.harvest.user_agent.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.hcmdoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| HcmDocError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.hcmdoc/hcmdoc.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HcmDocError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| HcmDocError::config(format!("failed to parse {}: {e}", path.display())))?;

    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_file_path()?)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| HcmDocError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HcmDocError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| HcmDocError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

impl AppConfig {
    /// Check that the configured base URL is an absolute http(s) URL.
    ///
    /// Run again after CLI overrides are applied.
    pub fn validate(&self) -> Result<()> {
        let base = &self.source.base_url;
        match url::Url::parse(base) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(()),
            Ok(u) => Err(HcmDocError::config(format!(
                "base_url '{base}' must use http or https, not '{}'",
                u.scheme()
            ))),
            Err(e) => Err(HcmDocError::config(format!("invalid base_url '{base}': {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("throttle_ms"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.source.base_url, DEFAULT_BASE_URL);
        assert_eq!(parsed.harvest.settle_ms, 2000);
        assert_eq!(parsed.harvest.throttle_ms, 1000);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[harvest]
throttle_ms = 250
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.harvest.throttle_ms, 250);
        assert_eq!(config.harvest.settle_ms, 2000);
        assert_eq!(config.source.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn harvest_config_from_app_config() {
        let app = AppConfig::default();
        let harvest = HarvestConfig::from(&app);
        assert_eq!(harvest.settle, Duration::from_secs(2));
        assert_eq!(harvest.throttle, Duration::from_secs(1));
        assert_eq!(harvest.timeout, Duration::from_secs(30));
        assert!(harvest.user_agent.starts_with("hcmdoc/"));
    }

    #[test]
    fn immediate_has_no_delays() {
        let harvest = HarvestConfig::immediate();
        assert!(harvest.settle.is_zero());
        assert!(harvest.throttle.is_zero());
    }

    #[test]
    fn load_rejects_non_http_base_url() {
        let path = std::env::temp_dir().join(format!("hcmdoc-cfg-{}.toml", std::process::id()));
        std::fs::write(&path, "[source]\nbase_url = \"ftp://docs.example.com/\"\n").unwrap();

        let result = load_config_from(&path);
        let _ = std::fs::remove_file(&path);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn validate_accepts_default_and_rejects_garbage() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.source.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(HcmDocError::Config { .. })));
    }

    #[test]
    fn init_config_at_writes_loadable_defaults() {
        let dir = std::env::temp_dir().join(format!("hcmdoc-init-{}", std::process::id()));
        let path = dir.join("nested").join("hcmdoc.toml");

        let written = init_config_at(&path).unwrap();
        let loaded = load_config_from(&written);
        let _ = std::fs::remove_dir_all(&dir);

        let loaded = loaded.unwrap();
        assert_eq!(loaded.source.base_url, DEFAULT_BASE_URL);
        assert_eq!(loaded.harvest.settle_ms, 2000);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("hcmdoc-does-not-exist/hcmdoc.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, HcmDocError::Io { .. }));
    }
}
