//! The three-stage run: TOC → links CSV → links JSON → tables/views JSON.
//!
//! Stages communicate only through their file artifacts. Each one runs when
//! both its input and output paths are configured; otherwise it is skipped.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use hcmdoc_crawler::{HarvestProgress, Harvester, HttpPageSource};
use hcmdoc_discovery::{DiscoveryOptions, TocSource};
use hcmdoc_shared::{HarvestConfig, Result};

/// Everything one invocation may do.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// TOC script location (Link Extractor input).
    pub toc: Option<TocSource>,
    /// Links CSV (Link Extractor output, Format Converter input).
    pub csv: Option<PathBuf>,
    /// Links JSON (Format Converter output, Metadata Extractor input).
    pub json: Option<PathBuf>,
    /// Tables output.
    pub tables: Option<PathBuf>,
    /// Views output.
    pub views: Option<PathBuf>,
    /// Base URL TOC hrefs are appended to.
    pub base_url: String,
    /// Page loading policy for the Metadata Extractor.
    pub harvest: HarvestConfig,
    /// Remote TOC fetch options.
    pub discovery: DiscoveryOptions,
}

/// Result of the Link Extractor stage.
#[derive(Debug, Clone)]
pub struct LinksSummary {
    pub links: usize,
    pub csv: PathBuf,
}

/// Result of the Format Converter stage.
#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub rows: usize,
    pub json: PathBuf,
}

/// Result of the Metadata Extractor stage.
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub tables: usize,
    pub views: usize,
    /// Dropped pages (URL, error message).
    pub failures: Vec<(String, String)>,
    pub tables_path: PathBuf,
    pub views_path: PathBuf,
    pub elapsed: Duration,
}

/// What a whole run did. `None` marks a skipped stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub links: Option<LinksSummary>,
    pub convert: Option<ConvertSummary>,
    pub harvest: Option<HarvestSummary>,
    pub elapsed: Duration,
}

impl PipelineSummary {
    /// True when no stage had both of its paths configured.
    pub fn is_empty(&self) -> bool {
        self.links.is_none() && self.convert.is_none() && self.harvest.is_none()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a stage starts.
    fn phase(&self, name: &str);
    /// Called before each page of the Metadata Extractor is loaded.
    fn page_started(&self, current: usize, total: usize, name: &str);
    /// Called when a page is dropped.
    fn page_failed(&self, url: &str, error: &str);
    /// Called when the run completes.
    fn done(&self, summary: &PipelineSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_started(&self, _current: usize, _total: usize, _name: &str) {}
    fn page_failed(&self, _url: &str, _error: &str) {}
    fn done(&self, _summary: &PipelineSummary) {}
}

/// Run every stage whose paths are configured, in order.
#[instrument(skip_all)]
pub async fn run_pipeline(
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<PipelineSummary> {
    let start = Instant::now();
    let mut summary = PipelineSummary::default();

    if let (Some(toc), Some(csv)) = (&config.toc, &config.csv) {
        progress.phase("Extracting links");
        summary.links =
            Some(extract_links_stage(toc, csv, &config.base_url, &config.discovery).await?);
    }

    if let (Some(csv), Some(json)) = (&config.csv, &config.json) {
        progress.phase("Converting links to JSON");
        summary.convert = Some(convert_stage(csv, json)?);
    }

    if let (Some(json), Some(tables), Some(views)) = (&config.json, &config.tables, &config.views)
    {
        progress.phase("Extracting metadata");
        summary.harvest =
            Some(extract_metadata_stage(json, tables, views, &config.harvest, progress).await?);
    }

    summary.elapsed = start.elapsed();
    progress.done(&summary);

    info!(
        links = summary.links.as_ref().map(|s| s.links),
        rows = summary.convert.as_ref().map(|s| s.rows),
        tables = summary.harvest.as_ref().map(|s| s.tables),
        views = summary.harvest.as_ref().map(|s| s.views),
        elapsed_ms = summary.elapsed.as_millis(),
        "pipeline complete"
    );

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Link Extractor: TOC script → `name,url` CSV.
///
/// A TOC with no recognizable entries yields a header-only CSV.
#[instrument(skip_all, fields(toc = %toc, csv = %csv_path.display()))]
pub async fn extract_links_stage(
    toc: &TocSource,
    csv_path: &Path,
    base_url: &str,
    opts: &DiscoveryOptions,
) -> Result<LinksSummary> {
    let content = hcmdoc_discovery::load_toc(toc, opts).await?;
    let links = hcmdoc_discovery::extract_links(&content, base_url);
    hcmdoc_artifacts::write_links_csv(csv_path, &links)?;

    info!(links = links.len(), "links written");
    Ok(LinksSummary {
        links: links.len(),
        csv: csv_path.to_path_buf(),
    })
}

/// Format Converter: CSV → JSON array with lowercased keys.
pub fn convert_stage(csv_path: &Path, json_path: &Path) -> Result<ConvertSummary> {
    let rows = hcmdoc_artifacts::convert_csv_to_json(csv_path, json_path)?;
    Ok(ConvertSummary {
        rows,
        json: json_path.to_path_buf(),
    })
}

/// Metadata Extractor: links JSON → tables JSON + views JSON.
///
/// One page source serves the whole stage. Both outputs are written after
/// every link has been visited; per-page failures do not fail the stage.
#[instrument(skip_all, fields(json = %json_path.display()))]
pub async fn extract_metadata_stage(
    json_path: &Path,
    tables_path: &Path,
    views_path: &Path,
    harvest: &HarvestConfig,
    progress: &dyn ProgressReporter,
) -> Result<HarvestSummary> {
    let links = hcmdoc_artifacts::read_links_json(json_path)?;
    info!(links = links.len(), "links loaded");

    let source = HttpPageSource::new(harvest)?;
    let harvester = Harvester::new(harvest.clone());
    let report = harvester
        .harvest(&links, &source, &PipelineHarvestProgress { inner: progress })
        .await;
    drop(source);

    hcmdoc_artifacts::write_json_pretty(tables_path, &report.tables)?;
    hcmdoc_artifacts::write_json_pretty(views_path, &report.views)?;

    Ok(HarvestSummary {
        tables: report.tables.len(),
        views: report.views.len(),
        failures: report.failures,
        tables_path: tables_path.to_path_buf(),
        views_path: views_path.to_path_buf(),
        elapsed: report.elapsed,
    })
}

// ---------------------------------------------------------------------------
// Harvest progress adapter
// ---------------------------------------------------------------------------

/// Adapts a `ProgressReporter` to the `HarvestProgress` interface.
struct PipelineHarvestProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl HarvestProgress for PipelineHarvestProgress<'_> {
    fn page_started(&self, current: usize, total: usize, name: &str) {
        self.inner.page_started(current, total, name);
    }

    fn page_failed(&self, url: &str, error: &str) {
        self.inner.page_failed(url, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        pages: Mutex<Vec<String>>,
        done: Mutex<bool>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn page_started(&self, current: usize, total: usize, name: &str) {
            self.pages
                .lock()
                .unwrap()
                .push(format!("{current}/{total}: {name}"));
        }
        fn page_failed(&self, _url: &str, _error: &str) {}
        fn done(&self, _summary: &PipelineSummary) {
            *self.done.lock().unwrap() = true;
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hcmdoc-pipeline-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("../../../fixtures/{name}")).unwrap()
    }

    fn empty_config() -> PipelineConfig {
        PipelineConfig {
            toc: None,
            csv: None,
            json: None,
            tables: None,
            views: None,
            base_url: "https://docs.example.com/oedmh/".into(),
            harvest: HarvestConfig::immediate(),
            discovery: DiscoveryOptions::default(),
        }
    }

    #[tokio::test]
    async fn links_stage_writes_csv_from_toc_fixture() {
        let dir = temp_dir("links");
        let csv = dir.join("links.csv");
        let toc = TocSource::File(PathBuf::from("../../../fixtures/toc/toc.js"));

        let summary = extract_links_stage(
            &toc,
            &csv,
            "https://docs.example.com/oedmh/",
            &DiscoveryOptions::default(),
        )
        .await
        .unwrap();
        let content = std::fs::read_to_string(&csv).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(summary.links, 4);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "name,url");
        assert!(lines[2].starts_with("PER_ALL_ASSIGNMENTS_M,https://docs.example.com/oedmh/"));
        assert!(lines.iter().all(|l| !l.contains('#')));
    }

    #[tokio::test]
    async fn missing_companion_path_skips_stage() {
        let dir = temp_dir("skip");
        let config = PipelineConfig {
            toc: Some(TocSource::File(PathBuf::from("../../../fixtures/toc/toc.js"))),
            json: Some(dir.join("links.json")),
            tables: Some(dir.join("tables.json")),
            ..empty_config()
        };
        let progress = RecordingProgress::default();

        let summary = run_pipeline(&config, &progress).await.unwrap();
        let created = std::fs::read_dir(&dir).unwrap().count();
        let _ = std::fs::remove_dir_all(&dir);

        assert!(summary.is_empty());
        assert_eq!(created, 0);
        assert!(progress.phases.lock().unwrap().is_empty());
        assert!(*progress.done.lock().unwrap());
    }

    #[tokio::test]
    async fn convert_only_run() {
        let dir = temp_dir("convert");
        let csv = dir.join("links.csv");
        let json = dir.join("links.json");
        std::fs::write(&csv, "Name,URL\nPER,https://x/per.html\n").unwrap();

        let config = PipelineConfig {
            csv: Some(csv),
            json: Some(json.clone()),
            ..empty_config()
        };
        let summary = run_pipeline(&config, &SilentProgress).await.unwrap();
        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert!(summary.links.is_none());
        assert_eq!(summary.convert.unwrap().rows, 1);
        assert!(summary.harvest.is_none());
        assert_eq!(parsed[0]["url"], "https://x/per.html");
    }

    #[tokio::test]
    async fn malformed_links_json_fails_stage() {
        let dir = temp_dir("badjson");
        let json = dir.join("links.json");
        std::fs::write(&json, "{not json").unwrap();

        let err = extract_metadata_stage(
            &json,
            &dir.join("tables.json"),
            &dir.join("views.json"),
            &HarvestConfig::immediate(),
            &SilentProgress,
        )
        .await
        .unwrap_err();
        let _ = std::fs::remove_dir_all(&dir);

        assert!(matches!(err, hcmdoc_shared::HcmDocError::Validation { .. }));
    }

    #[tokio::test]
    async fn full_run_against_mock_docs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oedmh/perallpeoplef-1234.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("html/table_page.html")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oedmh/perpersonnamesfv-1234.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("html/view_page.html")))
            .mount(&server)
            .await;

        let dir = temp_dir("full");
        let toc = dir.join("toc.js");
        std::fs::write(
            &toc,
            r#"define({"toc":[
                {"title": "PER_ALL_PEOPLE_F", "href": "perallpeoplef-1234.html#PER_ALL_PEOPLE_F"},
                {"title": "Gone", "href": "gone.html"},
                {"title": "PER_PERSON_NAMES_F_V", "href": "perpersonnamesfv-1234.html"}
            ]});"#,
        )
        .unwrap();

        let config = PipelineConfig {
            toc: Some(TocSource::File(toc)),
            csv: Some(dir.join("links.csv")),
            json: Some(dir.join("links.json")),
            tables: Some(dir.join("tables.json")),
            views: Some(dir.join("views.json")),
            base_url: format!("{}/oedmh/", server.uri()),
            ..empty_config()
        };
        let progress = RecordingProgress::default();

        let summary = run_pipeline(&config, &progress).await.unwrap();
        let tables: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("tables.json")).unwrap())
                .unwrap();
        let views: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("views.json")).unwrap())
                .unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(summary.links.unwrap().links, 3);
        assert_eq!(summary.convert.unwrap().rows, 3);
        let harvest = summary.harvest.unwrap();
        assert_eq!((harvest.tables, harvest.views), (1, 1));
        assert_eq!(harvest.failures.len(), 1);
        assert!(harvest.failures[0].0.ends_with("/oedmh/gone.html"));

        assert_eq!(tables[0]["table_name"], "PER_ALL_PEOPLE_F");
        assert_eq!(tables[0]["primary_key"]["name"], "PER_PEOPLE_F_PK");
        assert_eq!(views[0]["view_name"], "PER_PERSON_NAMES_F_V");
        assert_eq!(views[0]["columns"][0]["column_name"], "PERSON_ID");

        assert_eq!(
            *progress.phases.lock().unwrap(),
            vec!["Extracting links", "Converting links to JSON", "Extracting metadata"]
        );
        assert_eq!(progress.pages.lock().unwrap()[1], "2/3: Gone");
    }
}
