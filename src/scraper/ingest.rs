//! Ingest orchestration
//!
//! Sequences one full collection run: category discovery, per-category
//! traversal, run-scoped deduplication, and a single batched store upsert.
//! Category failures are isolated; they become report data, not errors.

use crate::config::Config;
use crate::model::{FailedCategory, IngestReport};
use crate::scraper::categories::discover_categories;
use crate::scraper::dedup::SeenUrls;
use crate::scraper::extract::Extractor;
use crate::scraper::fetcher::build_http_client;
use crate::scraper::pacing::Pacer;
use crate::scraper::traversal::traverse_category;
use crate::storage::{BookStore, SqliteStore};
use crate::HarvestError;
use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs ingest operations against a configured catalog site
pub struct IngestRunner {
    config: Config,
    client: Client,
}

impl IngestRunner {
    /// Creates a runner with its own HTTP client
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.crawler)?;
        Ok(Self { config, client })
    }

    /// Runs one full ingest and returns its report
    ///
    /// Category order follows the landing page. The cancellation token is
    /// checked between categories; a cancelled run still upserts what it
    /// staged. Only a landing-page discovery failure under strict policy
    /// fails the whole operation.
    pub async fn run(
        &self,
        store: &Mutex<SqliteStore>,
        cancel: &CancellationToken,
    ) -> Result<IngestReport, HarvestError> {
        let landing_url = self.config.site.base();
        let mut report = IngestReport::default();

        let categories = match discover_categories(&self.client, &landing_url).await {
            Ok(categories) => categories,
            Err(e) if self.config.crawler.strict_discovery => {
                return Err(HarvestError::Discovery(e));
            }
            Err(e) => {
                tracing::warn!(error = %e, "category discovery failed, nothing to crawl");
                Vec::new()
            }
        };
        report.discovered = categories.len();
        tracing::info!(categories = categories.len(), "starting ingest run");

        let extractor = Extractor::new(
            self.config.site.base(),
            self.config.site.catalogue_base(),
        );
        let mut pacer = Pacer::new(Duration::from_millis(self.config.crawler.request_delay_ms));
        let mut seen = SeenUrls::new();
        let mut staged = Vec::new();

        for category in &categories {
            if cancel.is_cancelled() {
                tracing::info!(category = %category.name, "cancelled before category, stopping run");
                break;
            }

            let (records, outcome) = traverse_category(
                &self.client,
                &mut pacer,
                &extractor,
                category,
                self.config.crawler.page_budget,
            )
            .await;

            report.extract_failures += outcome.extract_failures;

            for record in records {
                if seen.check_and_mark(&record.source_url) {
                    staged.push(record);
                } else {
                    report.skipped_duplicate += 1;
                }
            }

            if let Some(error) = outcome.error {
                report.failed_categories.push(FailedCategory {
                    category: category.name.clone(),
                    error: error.to_string(),
                });
            }
        }

        // One batched upsert after all categories; duplicate keys are absorbed
        // by the store, never raised.
        let summary = {
            let mut store = store.lock().unwrap();
            store.upsert_books(&staged)?
        };
        report.inserted = summary.inserted;
        report.skipped_duplicate += summary.ignored_duplicate;

        tracing::info!(
            discovered = report.discovered,
            inserted = report.inserted,
            skipped_duplicate = report.skipped_duplicate,
            failed_categories = report.failed_categories.len(),
            "ingest run finished"
        );

        Ok(report)
    }
}

/// Runs a complete ingest operation
///
/// This is the single entry point the serving layer calls after the auth
/// gate has passed.
pub async fn run_ingest(
    config: &Config,
    store: &Mutex<SqliteStore>,
    cancel: &CancellationToken,
) -> Result<IngestReport, HarvestError> {
    let runner = IngestRunner::new(config.clone())?;
    runner.run(store, cancel).await
}
