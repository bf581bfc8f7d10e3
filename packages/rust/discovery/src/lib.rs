//! TOC loading and link extraction.
//!
//! The first stage of the pipeline: read the documentation's table-of-contents
//! script (from disk or over HTTP), recover its `{title, href}` pairs and turn
//! them into absolute [`LinkRecord`]s.

mod parser;

use std::path::PathBuf;
use std::time::Duration;

use hcmdoc_shared::{HcmDocError, LinkRecord, Result};
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

pub use parser::{TocLink, parse_toc};

/// Maximum number of redirects to follow when fetching a remote TOC.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for fetching a remote TOC.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maximum TOC size we accept (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// User-Agent string for TOC requests.
const USER_AGENT: &str = concat!("hcmdoc/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// TocSource
// ---------------------------------------------------------------------------

/// Where the TOC script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocSource {
    /// A local `toc.js` file.
    File(PathBuf),
    /// An `http(s)` URL serving the script.
    Remote(Url),
}

impl TocSource {
    /// Interpret a CLI argument: `http(s)://` URLs are remote, anything else is a path.
    pub fn parse(arg: &str) -> Self {
        match Url::parse(arg) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Self::Remote(url),
            _ => Self::File(PathBuf::from(arg)),
        }
    }
}

impl std::fmt::Display for TocSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// Options for loading a remote TOC.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry points
// ---------------------------------------------------------------------------

/// Read the TOC script content from its source.
#[instrument(skip_all, fields(source = %source))]
pub async fn load_toc(source: &TocSource, opts: &DiscoveryOptions) -> Result<String> {
    match source {
        TocSource::File(path) => {
            debug!(path = %path.display(), "reading TOC file");
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| HcmDocError::io(path, e))
        }
        TocSource::Remote(url) => {
            info!(%url, "fetching remote TOC");
            let client = build_client(opts)?;
            fetch_toc(&client, url).await
        }
    }
}

/// Turn TOC content into link records rooted at `base_url`.
///
/// The fragment is cut from each href at its first `#`, the remainder is
/// trimmed and appended verbatim to `base_url`; titles are trimmed. Order
/// follows the TOC and duplicates are kept.
pub fn extract_links(content: &str, base_url: &str) -> Vec<LinkRecord> {
    let links: Vec<LinkRecord> = parse_toc(content)
        .into_iter()
        .map(|link| {
            let path = link.href.split('#').next().unwrap_or_default().trim();
            LinkRecord {
                name: link.title.trim().to_string(),
                url: format!("{base_url}{path}"),
            }
        })
        .collect();

    debug!(count = links.len(), "links extracted from TOC");
    links
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &DiscoveryOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| HcmDocError::Network(format!("failed to build HTTP client: {e}")))
}

/// Fetch a remote TOC script.
async fn fetch_toc(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| HcmDocError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HcmDocError::Network(format!("{url}: HTTP {status}")));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_RESPONSE_SIZE {
            return Err(HcmDocError::validation(format!(
                "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
            )));
        }
    }

    response
        .text()
        .await
        .map_err(|e| HcmDocError::Network(format!("{url}: failed to read body: {e}")))
}
