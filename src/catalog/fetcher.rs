//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper:
//! - Building the HTTP client with the descriptive user agent string
//! - GET requests for listing and detail pages
//! - Error classification into [`PageFetchError`]
//! - The unconditional post-fetch pause
//!
//! There is no retry. Failures go back to the caller, which decides whether a
//! failure is fatal (listing pages) or skippable (detail pages).

use crate::catalog::throttle::{DelayPolicy, PageKind, Throttle};
use crate::config::{Config, PolitenessConfig, UserAgentConfig};
use crate::PageFetchError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `politeness` - Supplies the request timeout
///
/// # Example
///
/// ```no_run
/// use matthes_seitz_catalog::catalog::build_http_client;
/// use matthes_seitz_catalog::config::{PolitenessConfig, UserAgentConfig};
///
/// let client =
///     build_http_client(&UserAgentConfig::default(), &PolitenessConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    politeness: &PolitenessConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(politeness.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited page fetcher
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: DelayPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: DelayPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds the client and delay policy from the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, &config.politeness)?;
        Ok(Self::new(client, DelayPolicy::from(&config.politeness)))
    }

    pub fn policy(&self) -> &DelayPolicy {
        &self.policy
    }

    /// Fetches a page and returns its body
    ///
    /// The throttle pauses after the request whatever its outcome, so two
    /// consecutive requests are always at least one delay apart.
    ///
    /// # Errors
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | non-2xx status | `PageFetchError::Status` |
    /// | connect, timeout, TLS, body read failure | `PageFetchError::Transport` |
    pub async fn fetch(
        &self,
        url: &str,
        kind: PageKind,
        throttle: &mut Throttle,
    ) -> Result<String, PageFetchError> {
        tracing::debug!("GET {} ({:?})", url, kind);

        let result = self.request(url).await;
        throttle.pause(self.policy.delay_for(kind)).await;

        if let Err(e) = &result {
            tracing::debug!("Fetch failed: {}", e);
        }

        result
    }

    async fn request(&self, url: &str) -> Result<String, PageFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| PageFetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageFetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| PageFetchError::Transport {
                url: url.to_string(),
                source,
            })
    }
}
