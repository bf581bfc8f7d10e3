//! Sequential harvest of table/view metadata from a link list.

use std::time::{Duration, Instant};

use hcmdoc_extract::extract_object_metadata;
use hcmdoc_shared::{
    HarvestConfig, LinkRecord, ObjectMetadata, Result, TableMetadata, ViewMetadata,
};
use tracing::{debug, info, instrument, warn};

use crate::source::PageSource;

// ---------------------------------------------------------------------------
// HarvestReport
// ---------------------------------------------------------------------------

/// Everything a harvest produced, in input order.
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    /// Records of pages classified as TABLE (or unclassified).
    pub tables: Vec<TableMetadata>,
    /// Records of pages classified as VIEW.
    pub views: Vec<ViewMetadata>,
    /// Pages that produced no record (URL, error message).
    pub failures: Vec<(String, String)>,
    /// Wall-clock time of the harvest.
    pub elapsed: Duration,
}

impl HarvestReport {
    /// Number of links visited.
    pub fn attempted(&self) -> usize {
        self.tables.len() + self.views.len() + self.failures.len()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Per-page progress hooks for a harvest.
pub trait HarvestProgress: Send + Sync {
    /// Called before page `current` of `total` is loaded.
    fn page_started(&self, current: usize, total: usize, name: &str);
    /// Called when a page is dropped.
    fn page_failed(&self, url: &str, error: &str);
}

/// No-op harvest progress.
pub struct SilentHarvestProgress;

impl HarvestProgress for SilentHarvestProgress {
    fn page_started(&self, _current: usize, _total: usize, _name: &str) {}
    fn page_failed(&self, _url: &str, _error: &str) {}
}

// ---------------------------------------------------------------------------
// Harvester
// ---------------------------------------------------------------------------

/// Visits links one at a time: load, settle, extract, throttle.
#[derive(Debug, Clone)]
pub struct Harvester {
    config: HarvestConfig,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Harvest every link through `source`.
    ///
    /// A page that fails to load or parse is logged, recorded in
    /// [`HarvestReport::failures`] and skipped. The throttle pause follows
    /// every attempt, including failed ones.
    #[instrument(skip_all, fields(links = links.len()))]
    pub async fn harvest<S: PageSource>(
        &self,
        links: &[LinkRecord],
        source: &S,
        progress: &dyn HarvestProgress,
    ) -> HarvestReport {
        let start = Instant::now();
        let total = links.len();
        let mut report = HarvestReport::default();

        info!(
            settle_ms = self.config.settle.as_millis(),
            throttle_ms = self.config.throttle.as_millis(),
            "starting harvest"
        );

        for (i, link) in links.iter().enumerate() {
            progress.page_started(i + 1, total, &link.name);

            match self.harvest_one(link, source).await {
                Ok(ObjectMetadata::Table(table)) => report.tables.push(table),
                Ok(ObjectMetadata::View(view)) => report.views.push(view),
                Err(e) => {
                    warn!(url = %link.url, error = %e, "failed to harvest page, skipping");
                    let message = e.to_string();
                    progress.page_failed(&link.url, &message);
                    report.failures.push((link.url.clone(), message));
                }
            }

            pause(self.config.throttle).await;
        }

        report.elapsed = start.elapsed();

        info!(
            tables = report.tables.len(),
            views = report.views.len(),
            failures = report.failures.len(),
            elapsed_ms = report.elapsed.as_millis(),
            "harvest completed"
        );

        report
    }

    async fn harvest_one<S: PageSource>(
        &self,
        link: &LinkRecord,
        source: &S,
    ) -> Result<ObjectMetadata> {
        let html = source.load(&link.url).await?;
        pause(self.config.settle).await;

        let record = extract_object_metadata(&html, &link.url, &link.name)?;
        debug!(url = %link.url, name = record.name(), "page harvested");
        Ok(record)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
