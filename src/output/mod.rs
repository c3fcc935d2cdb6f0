//! Output module for emitting scraped records and run summaries
//!
//! This module handles:
//! - Serializing the record list as a JSON array to a file or stdout
//! - Computing and printing run statistics

mod json;
pub mod stats;

pub use json::{format_catalog, write_catalog, write_catalog_to};
pub use stats::{format_statistics, print_statistics, CatalogStatistics};
