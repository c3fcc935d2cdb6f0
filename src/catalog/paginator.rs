//! Listing page pagination
//!
//! This module handles walking an imprint's paginated catalog listing:
//! - Building listing page URLs (`lieferbar.html?p=N`)
//! - Extracting detail page links from each listing page
//! - Detecting the last page
//!
//! The walk ends at the first listing page that contains no detail links. The
//! pager's title count is only informational: the catalog can change while a
//! run is in progress, so it never decides when to stop.

use crate::catalog::fetcher::Fetcher;
use crate::catalog::throttle::{PageKind, Throttle};
use crate::model::Imprint;
use crate::url::{listing_url, resolve_detail_url};
use crate::PageFetchError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::VecDeque;
use url::Url;

/// Detail links inside listing items
const DETAIL_LINK_SELECTOR: &str = "li.item.item_product h3.title a[href]";

/// Pager paragraph, e.g. "Anzahl: 1.587"
const PAGER_SELECTOR: &str = "div#listpager p";

/// A number with optional German thousands separators
static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d.]*").expect("count pattern is valid"));

/// Extracted information from a listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Detail page URLs in listing order (absolute, without query)
    pub links: Vec<String>,

    /// Title count announced by the pager, if present
    pub total: Option<u32>,
}

/// Parses a listing page
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `base_url` - The site root for resolving relative links
///
/// # Example
///
/// ```
/// use matthes_seitz_catalog::catalog::parse_listing;
/// use url::Url;
///
/// let html = r#"<ul><li class="item item_product"><h3 class="title"><a href="/buch/a.html?lid=1">A</a></h3></li></ul>"#;
/// let base = Url::parse("https://www.matthes-seitz-berlin.de").unwrap();
/// let page = parse_listing(html, &base);
/// assert_eq!(page.links, vec!["https://www.matthes-seitz-berlin.de/buch/a.html"]);
/// ```
pub fn parse_listing(html: &str, base_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    ListingPage {
        links: extract_detail_links(&document, base_url),
        total: extract_total(&document),
    }
}

fn extract_detail_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse(DETAIL_LINK_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_detail_url(href, base_url))
        .collect()
}

fn extract_total(document: &Html) -> Option<u32> {
    let selector = Selector::parse(PAGER_SELECTOR).ok()?;
    let text = document.select(&selector).next()?.text().collect::<String>();
    let digits = COUNT_PATTERN.find(&text)?.as_str().replace('.', "");
    digits.parse().ok()
}

/// Lazily yields the detail URLs of one imprint
///
/// A listing page is fetched only once every link of the previous page has
/// been handed out. After the terminal (empty) page or a fetch error the
/// paginator yields nothing more; a new paginator restarts from page 0.
/// Duplicate links are passed through unchanged.
#[derive(Debug)]
pub struct Paginator {
    imprint: Imprint,
    base_url: Url,
    next_page: u32,
    buffer: VecDeque<String>,
    finished: bool,
}

impl Paginator {
    pub fn new(imprint: Imprint, base_url: Url) -> Self {
        Self {
            imprint,
            base_url,
            next_page: 0,
            buffer: VecDeque::new(),
            finished: false,
        }
    }

    pub fn imprint(&self) -> Imprint {
        self.imprint
    }

    /// Number of listing pages that produced links
    pub fn pages_with_links(&self) -> u32 {
        self.next_page
    }

    /// Returns the next detail URL, fetching the next listing page when needed
    ///
    /// # Returns
    ///
    /// * `Ok(Some(url))` - The next detail page URL
    /// * `Ok(None)` - The listing is exhausted
    /// * `Err(PageFetchError)` - A listing page could not be fetched
    pub async fn next_url(
        &mut self,
        fetcher: &Fetcher,
        throttle: &mut Throttle,
    ) -> Result<Option<String>, PageFetchError> {
        loop {
            if let Some(url) = self.buffer.pop_front() {
                return Ok(Some(url));
            }

            if self.finished {
                return Ok(None);
            }

            self.fetch_next_page(fetcher, throttle).await?;
        }
    }

    /// Drains the whole listing into a vector
    pub async fn collect_urls(
        &mut self,
        fetcher: &Fetcher,
        throttle: &mut Throttle,
    ) -> Result<Vec<String>, PageFetchError> {
        let mut urls = Vec::new();
        while let Some(url) = self.next_url(fetcher, throttle).await? {
            urls.push(url);
        }
        Ok(urls)
    }

    async fn fetch_next_page(
        &mut self,
        fetcher: &Fetcher,
        throttle: &mut Throttle,
    ) -> Result<(), PageFetchError> {
        let page_url = listing_url(&self.base_url, self.imprint, self.next_page);

        let html = match fetcher
            .fetch(page_url.as_str(), PageKind::Listing, throttle)
            .await
        {
            Ok(html) => html,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        let page = parse_listing(&html, &self.base_url);

        if self.next_page == 0 {
            if let Some(total) = page.total {
                tracing::info!("{}: {} titles announced", self.imprint, total);
            }
        }

        if page.links.is_empty() {
            tracing::debug!(
                "{}: listing page {} is empty, pagination complete",
                self.imprint,
                self.next_page + 1
            );
            self.finished = true;
            return Ok(());
        }

        tracing::info!(
            "{}: listing page {} with {} titles",
            self.imprint,
            self.next_page + 1,
            page.links.len()
        );

        self.next_page += 1;
        self.buffer.extend(page.links);
        Ok(())
    }
}
