//! Catalog scraping pipeline
//!
//! This module contains the crawl-and-parse pipeline:
//! - Paced HTTP fetching with a descriptive user agent
//! - Listing pagination per imprint
//! - Detail page field extraction
//! - Overall run orchestration

mod extractor;
mod fetcher;
mod orchestrator;
mod paginator;
mod throttle;

pub use extractor::{extract, extract_from_document};
pub use fetcher::{build_http_client, Fetcher};
pub use orchestrator::{Catalog, CatalogReport, ImprintFailure, SkippedItem};
pub use paginator::{parse_listing, ListingPage, Paginator};
pub use throttle::{DelayPolicy, PageKind, Throttle};

use crate::config::Config;
use crate::model::Imprint;
use crate::CatalogError;

/// Scrapes the catalog with the given configuration
///
/// This is the main programmatic entry point. It paces requests in real time.
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `imprints` - Imprints to scrape, in order
/// * `limit` - Optional global record limit
///
/// # Example
///
/// ```no_run
/// use matthes_seitz_catalog::catalog::scrape_catalog;
/// use matthes_seitz_catalog::config::Config;
/// use matthes_seitz_catalog::model::Imprint;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = scrape_catalog(&Config::default(), &[Imprint::FriedenauerPresse], Some(10)).await?;
/// println!("{} books", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn scrape_catalog(
    config: &Config,
    imprints: &[Imprint],
    limit: Option<usize>,
) -> Result<CatalogReport, CatalogError> {
    let catalog = Catalog::from_config(config)?;
    let mut throttle = Throttle::real();
    Ok(catalog.run(imprints, limit, &mut throttle).await)
}
