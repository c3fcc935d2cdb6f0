//! Statistics over a finished run
//!
//! This module summarises field coverage, imprint breakdown and the most
//! frequent series of the scraped records, together with the run's failures.

use crate::catalog::CatalogReport;
use crate::model::{BookRecord, Imprint};
use std::collections::HashMap;

/// Number of series listed in the summary
const TOP_SERIES: usize = 10;

/// Run statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStatistics {
    /// Total number of records
    pub total_books: usize,

    pub with_description: usize,
    pub with_keywords: usize,
    pub with_series: usize,
    pub with_isbn: usize,

    /// Record count per imprint, largest first
    pub by_imprint: Vec<(Imprint, usize)>,

    /// Most frequent series, largest first
    pub top_series: Vec<(String, usize)>,

    /// Detail pages that produced no record
    pub skipped: usize,

    /// Imprints whose pagination failed
    pub failed_imprints: Vec<Imprint>,
}

impl CatalogStatistics {
    /// Computes statistics over a set of records
    pub fn from_records(records: &[BookRecord]) -> Self {
        let mut imprint_counts: HashMap<Imprint, usize> = HashMap::new();
        let mut series_counts: HashMap<&str, usize> = HashMap::new();

        for record in records {
            *imprint_counts.entry(record.imprint).or_default() += 1;
            if let Some(series) = &record.series {
                *series_counts.entry(series.as_str()).or_default() += 1;
            }
        }

        // Ties keep the declared imprint order
        let mut by_imprint: Vec<(Imprint, usize)> = Imprint::ALL
            .iter()
            .filter_map(|imprint| imprint_counts.get(imprint).map(|count| (*imprint, *count)))
            .collect();
        by_imprint.sort_by(|a, b| b.1.cmp(&a.1));

        let mut top_series: Vec<(String, usize)> = series_counts
            .into_iter()
            .map(|(series, count)| (series.to_string(), count))
            .collect();
        top_series.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_series.truncate(TOP_SERIES);

        Self {
            total_books: records.len(),
            with_description: records.iter().filter(|r| r.description.is_some()).count(),
            with_keywords: records.iter().filter(|r| !r.keywords.is_empty()).count(),
            with_series: records.iter().filter(|r| r.series.is_some()).count(),
            with_isbn: records.iter().filter(|r| r.isbn.is_some()).count(),
            by_imprint,
            top_series,
            skipped: 0,
            failed_imprints: Vec::new(),
        }
    }

    /// Computes statistics over a run, including its failures
    pub fn from_report(report: &CatalogReport) -> Self {
        Self {
            skipped: report.skipped.len(),
            failed_imprints: report.failed_imprints.iter().map(|f| f.imprint).collect(),
            ..Self::from_records(&report.records)
        }
    }
}

fn percentage(count: usize, total: usize) -> usize {
    100 * count / total.max(1)
}

/// Formats statistics as a plain-text block
pub fn format_statistics(stats: &CatalogStatistics) -> String {
    let rule = "=".repeat(60);
    let total = stats.total_books;
    let mut text = String::new();

    text.push_str(&format!("\n{}\n", rule));
    text.push_str("Scrape Statistics\n");
    text.push_str(&format!("{}\n", rule));
    text.push_str(&format!("Total books:           {}\n", total));
    text.push_str(&format!(
        "With description:      {} ({}%)\n",
        stats.with_description,
        percentage(stats.with_description, total)
    ));
    text.push_str(&format!(
        "With keywords:         {} ({}%)\n",
        stats.with_keywords,
        percentage(stats.with_keywords, total)
    ));
    text.push_str(&format!(
        "With series:           {} ({}%)\n",
        stats.with_series,
        percentage(stats.with_series, total)
    ));
    text.push_str(&format!(
        "With ISBN:             {} ({}%)\n",
        stats.with_isbn,
        percentage(stats.with_isbn, total)
    ));

    if !stats.by_imprint.is_empty() {
        text.push_str("\nBy imprint:\n");
        for (imprint, count) in &stats.by_imprint {
            text.push_str(&format!("  {:30} {:5}\n", imprint.slug(), count));
        }
    }

    if !stats.top_series.is_empty() {
        text.push_str("\nTop series:\n");
        for (series, count) in &stats.top_series {
            text.push_str(&format!("  {:40} {:4}\n", series, count));
        }
    }

    if stats.skipped > 0 || !stats.failed_imprints.is_empty() {
        text.push_str("\nProblems:\n");
        text.push_str(&format!("  Skipped detail pages: {}\n", stats.skipped));
        for imprint in &stats.failed_imprints {
            text.push_str(&format!("  Incomplete imprint:   {}\n", imprint.slug()));
        }
    }

    text.push_str(&format!("{}\n", rule));
    text
}

/// Prints statistics to stderr, keeping stdout free for JSON
pub fn print_statistics(stats: &CatalogStatistics) {
    eprint!("{}", format_statistics(stats));
}
