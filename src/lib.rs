//! Matthes & Seitz Catalog: a polite bibliographic scraper
//!
//! This crate walks the public catalog of Matthes & Seitz Berlin and its imprints,
//! visits every book's detail page and turns it into a structured [`BookRecord`],
//! emitted as a single JSON array.

pub mod catalog;
pub mod config;
pub mod model;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] PageFetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are raised before any network activity starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown imprint '{0}' (expected one of: matthes-seitz-berlin, friedenauer-presse, august-verlag)")]
    UnknownImprint(String),
}

/// Failure to fetch a listing or detail page
#[derive(Debug, Error)]
pub enum PageFetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl PageFetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Transport { url, .. } => url,
        }
    }
}

/// A detail page was fetched but its mandatory fields could not be located
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No title found on {url}")]
    MissingTitle { url: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogReport, Fetcher, PageKind, Throttle};
pub use config::Config;
pub use model::{BookRecord, Imprint};
