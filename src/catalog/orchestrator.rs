//! Catalog orchestrator - main scrape loop
//!
//! This module contains the straight-line loop that ties the pipeline together:
//! - Walking each requested imprint's listing with a [`Paginator`]
//! - Fetching and extracting every detail page
//! - Applying the global record limit
//! - Recording skipped detail pages and failed imprints
//!
//! Failure policy is asymmetric. A detail page that cannot be fetched or parsed
//! costs one record and is logged; a listing page that cannot be fetched ends
//! that imprint, because the rest of its listing is unreachable. Records gathered
//! before either failure are kept.

use crate::catalog::extractor::extract;
use crate::catalog::fetcher::Fetcher;
use crate::catalog::paginator::Paginator;
use crate::catalog::throttle::{PageKind, Throttle};
use crate::config::Config;
use crate::model::{BookRecord, Imprint};
use crate::url::parse_base_url;
use crate::{CatalogError, PageFetchError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// A detail page that produced no record
#[derive(Debug)]
pub struct SkippedItem {
    /// The detail page URL
    pub url: String,

    /// The imprint being scraped
    pub imprint: Imprint,

    /// Why the page was skipped
    pub reason: CatalogError,
}

/// An imprint whose listing could not be walked to the end
#[derive(Debug)]
pub struct ImprintFailure {
    pub imprint: Imprint,

    /// Records contributed by the imprint before the failure
    pub records_before_failure: usize,

    pub error: PageFetchError,
}

/// Outcome of one catalog run
#[derive(Debug, Default)]
pub struct CatalogReport {
    /// Extracted records in scrape order
    pub records: Vec<BookRecord>,

    /// Detail pages that were skipped
    pub skipped: Vec<SkippedItem>,

    /// Imprints whose pagination failed
    pub failed_imprints: Vec<ImprintFailure>,

    /// Detail URLs listed more than once and fetched only the first time
    pub duplicates: usize,

    /// Whether the run stopped early because of an interrupt
    pub interrupted: bool,

    /// Cumulative inter-request delay
    pub total_delay: Duration,
}

impl CatalogReport {
    /// True when every requested imprint was walked to its last listing page
    pub fn is_complete(&self) -> bool {
        self.failed_imprints.is_empty() && !self.interrupted
    }
}

/// Main orchestrator structure
pub struct Catalog {
    fetcher: Fetcher,
    base_url: Url,
    stop: Option<Arc<AtomicBool>>,
}

impl Catalog {
    pub fn new(fetcher: Fetcher, base_url: Url) -> Self {
        Self {
            fetcher,
            base_url,
            stop: None,
        }
    }

    /// Creates an orchestrator from the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Catalog)` - Ready to run
    /// * `Err(CatalogError)` - Invalid base URL or HTTP client construction failure
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        let base_url = parse_base_url(&config.site.base_url)?;
        let fetcher = Fetcher::from_config(config)?;
        Ok(Self::new(fetcher, base_url))
    }

    /// Installs a flag that, once set, ends the run at the next iteration boundary
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Runs the scrape
    ///
    /// Imprints are processed in the given order. `limit` caps the total number of
    /// records across all imprints; `Some(0)` returns immediately without any
    /// request. A URL seen earlier in the same run is not fetched again.
    ///
    /// # Arguments
    ///
    /// * `imprints` - The imprints to scrape
    /// * `limit` - Optional global record limit
    /// * `throttle` - Receives the post-fetch pauses
    pub async fn run(
        &self,
        imprints: &[Imprint],
        limit: Option<usize>,
        throttle: &mut Throttle,
    ) -> CatalogReport {
        let mut report = CatalogReport::default();
        let started = Instant::now();

        if limit == Some(0) {
            tracing::info!("Record limit is 0, nothing to scrape");
            return report;
        }

        let mut seen: HashSet<String> = HashSet::new();

        'imprints: for &imprint in imprints {
            if self.stop_requested() {
                report.interrupted = true;
                break;
            }

            tracing::info!("Collecting titles for imprint: {}", imprint.display_name());

            let mut paginator = Paginator::new(imprint, self.base_url.clone());
            let imprint_start = report.records.len();

            loop {
                if self.stop_requested() {
                    tracing::warn!("Interrupted, stopping after {} records", report.records.len());
                    report.interrupted = true;
                    break 'imprints;
                }

                let url = match paginator.next_url(&self.fetcher, throttle).await {
                    Ok(Some(url)) => url,
                    Ok(None) => break,
                    Err(e) => {
                        let contributed = report.records.len() - imprint_start;
                        tracing::error!(
                            "Pagination of {} aborted after {} records: {}",
                            imprint,
                            contributed,
                            e
                        );
                        report.failed_imprints.push(ImprintFailure {
                            imprint,
                            records_before_failure: contributed,
                            error: e,
                        });
                        break;
                    }
                };

                if !seen.insert(url.clone()) {
                    tracing::debug!("Skipping duplicate listing entry {}", url);
                    report.duplicates += 1;
                    continue;
                }

                match self.scrape_detail(&url, imprint, throttle).await {
                    Ok(record) => {
                        tracing::info!(
                            "Scraped {}: {}",
                            report.records.len() + 1,
                            url.rsplit('/').next().unwrap_or(&url)
                        );
                        report.records.push(record);
                    }
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", url, e);
                        report.skipped.push(SkippedItem {
                            url,
                            imprint,
                            reason: e,
                        });
                    }
                }

                if limit.is_some_and(|limit| report.records.len() >= limit) {
                    tracing::info!("Reached limit of {} records", report.records.len());
                    break 'imprints;
                }
            }

            tracing::info!(
                "{}: {} records",
                imprint,
                report.records.len() - imprint_start
            );
        }

        report.total_delay = throttle.total_delay();

        tracing::info!(
            "Scraped {} records ({} skipped, {} duplicates) in {:?}",
            report.records.len(),
            report.skipped.len(),
            report.duplicates,
            started.elapsed()
        );

        report
    }

    /// Fetches one detail page and extracts its record
    async fn scrape_detail(
        &self,
        url: &str,
        imprint: Imprint,
        throttle: &mut Throttle,
    ) -> Result<BookRecord, CatalogError> {
        let html = self.fetcher.fetch(url, PageKind::Detail, throttle).await?;
        Ok(extract(&html, url, imprint)?)
    }
}
