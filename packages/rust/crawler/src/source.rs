//! Page sources: where rendered page HTML comes from.

use std::future::Future;

use hcmdoc_shared::{HarvestConfig, HcmDocError, Result};
use reqwest::Client;
use tracing::debug;

/// Maximum number of redirects followed per page.
const MAX_REDIRECTS: usize = 5;

/// A session that turns a page URL into its rendered HTML.
///
/// One source is opened per harvest and reused for every URL.
pub trait PageSource {
    /// Load `url` and return the page's HTML.
    fn load(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// HttpPageSource
// ---------------------------------------------------------------------------

/// Loads pages with plain HTTP GET requests.
///
/// The documentation pages are served pre-rendered, so the response body is
/// the DOM the extractor expects.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    /// Build a source using the harvest config's user agent and timeout.
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| HcmDocError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    async fn load(&self, url: &str) -> Result<String> {
        debug!(url, "loading page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HcmDocError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HcmDocError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| HcmDocError::Network(format!("{url}: body read failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn http_source_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oedmh/perallpeoplef-1234.html"))
            .and(header("user-agent", "hcmdoc-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>PER_ALL_PEOPLE_F</h1>"))
            .expect(1)
            .mount(&server)
            .await;

        let config = HarvestConfig {
            user_agent: "hcmdoc-test".into(),
            ..HarvestConfig::immediate()
        };
        let source = HttpPageSource::new(&config).unwrap();
        let html = source
            .load(&format!("{}/oedmh/perallpeoplef-1234.html", server.uri()))
            .await
            .unwrap();

        assert_eq!(html, "<h1>PER_ALL_PEOPLE_F</h1>");
    }

    #[tokio::test]
    async fn http_source_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HttpPageSource::new(&HarvestConfig::immediate()).unwrap();
        let err = source
            .load(&format!("{}/missing.html", server.uri()))
            .await
            .unwrap_err();

        match err {
            HcmDocError::Network(msg) => assert!(msg.contains("503"), "{msg}"),
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
