//! Data model for scraped catalog entries
//!
//! This module defines the imprints the catalog is partitioned into and the
//! record produced for every book.

mod imprint;
mod record;

pub use imprint::Imprint;
pub use record::BookRecord;
