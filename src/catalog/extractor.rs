//! Detail page field extraction
//!
//! Each book page is reduced to a [`BookRecord`] by a fixed table of lookup
//! rules, one row per field. A row names the CSS selector that locates the
//! field, the label variants that may prefix its text, and the shape of the
//! value. When the site's markup changes, the table is what needs editing.
//!
//! Only the title is mandatory. Every other field silently degrades to absent.

use crate::model::{BookRecord, Imprint};
use crate::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// First ISBN-13 run of digits and hyphens, not preceded by another digit
static ISBN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(97[89][\d-]{10,})").expect("ISBN pattern is valid"));

/// First free-standing four-digit number
static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("year pattern is valid"));

const TITLE_SELECTOR: &str = "h1.title";

/// Class marking the compact, screen-reader-only ISBN duplicate
const INVISIBLE_CLASS: &str = "invisible";

/// Record fields filled from the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Subtitle,
    Authors,
    Isbn,
    Price,
    PagesBinding,
    Year,
    Series,
    Keywords,
    Description,
}

/// How the located element is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Whitespace-collapsed text of the first match
    Line,
    /// Whitespace-collapsed text of every match, in document order
    EachMatch,
    /// Text of the first match split on commas
    CommaList,
    /// First ISBN-13 in the visible text of the first match
    Isbn,
    /// First four-digit year in the text of the first match
    Year,
    /// Text nodes of the first match, one per line
    Paragraphs,
}

impl Shape {
    fn is_list(&self) -> bool {
        matches!(self, Self::EachMatch | Self::CommaList)
    }
}

#[derive(Debug)]
struct FieldRule {
    field: Field,
    selector: &'static str,
    /// Label variants stripped from the front of the text, case-insensitively
    labels: &'static [&'static str],
    shape: Shape,
}

const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Subtitle,
        selector: "h2.subtitle",
        labels: &[],
        shape: Shape::Line,
    },
    FieldRule {
        field: Field::Authors,
        selector: "div.authors a.author",
        labels: &[],
        shape: Shape::EachMatch,
    },
    FieldRule {
        field: Field::Isbn,
        selector: "div.number",
        labels: &["ISBN-13", "ISBN"],
        shape: Shape::Isbn,
    },
    FieldRule {
        field: Field::Price,
        selector: "div.price span",
        labels: &["Preis"],
        shape: Shape::Line,
    },
    FieldRule {
        field: Field::PagesBinding,
        selector: "div.info",
        labels: &["Seiten", "Umfang", "Ausstattung", "Format"],
        shape: Shape::Line,
    },
    FieldRule {
        field: Field::Year,
        selector: "div.dateof",
        labels: &["Veröffentlicht", "Erscheinungstermin", "Erschienen"],
        shape: Shape::Year,
    },
    FieldRule {
        field: Field::Series,
        selector: "div.serial a",
        labels: &["Reihe"],
        shape: Shape::Line,
    },
    FieldRule {
        field: Field::Keywords,
        selector: "div.keywords",
        labels: &["Schlagworte", "Schlagwörter", "Stichworte"],
        shape: Shape::CommaList,
    },
    FieldRule {
        field: Field::Description,
        selector: "div#pdesc div.description",
        labels: &[],
        shape: Shape::Paragraphs,
    },
];

enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// Extracts a book record from a detail page
///
/// # Arguments
///
/// * `html` - The detail page body
/// * `url` - The page URL, stored as the record identity
/// * `imprint` - The imprint whose listing led to the page
///
/// # Returns
///
/// * `Ok(BookRecord)` - The extracted record
/// * `Err(ExtractionError)` - No non-empty title was found
///
/// # Example
///
/// ```
/// use matthes_seitz_catalog::catalog::extract;
/// use matthes_seitz_catalog::model::Imprint;
///
/// let html = r#"<html><body><h1 class="title">Die Welt</h1></body></html>"#;
/// let record = extract(html, "https://example.com/buch/welt.html", Imprint::AugustVerlag).unwrap();
/// assert_eq!(record.title, "Die Welt");
/// assert!(record.authors.is_empty());
/// ```
pub fn extract(html: &str, url: &str, imprint: Imprint) -> Result<BookRecord, ExtractionError> {
    let document = Html::parse_document(html);
    extract_from_document(&document, url, imprint)
}

/// Extracts a book record from an already parsed detail page
pub fn extract_from_document(
    document: &Html,
    url: &str,
    imprint: Imprint,
) -> Result<BookRecord, ExtractionError> {
    let title = select_first(document, TITLE_SELECTOR)
        .and_then(|element| collapsed_text(&element))
        .ok_or_else(|| ExtractionError::MissingTitle {
            url: url.to_string(),
        })?;

    let mut record = BookRecord::new(url, imprint, title);

    for rule in FIELD_RULES {
        if let Some(value) = apply_rule(document, rule) {
            assign(&mut record, rule.field, value);
        }
    }

    Ok(record)
}

fn apply_rule(document: &Html, rule: &FieldRule) -> Option<FieldValue> {
    if rule.shape == Shape::EachMatch {
        let selector = Selector::parse(rule.selector).ok()?;
        let items: Vec<String> = document
            .select(&selector)
            .filter_map(|element| collapsed_text(&element))
            .map(|text| strip_label(&text, rule.labels).to_string())
            .filter(|text| !text.is_empty())
            .collect();
        return non_empty_list(items);
    }

    let element = select_first(document, rule.selector)?;

    match rule.shape {
        Shape::Line => {
            let text = collapsed_text(&element)?;
            non_empty_text(strip_label(&text, rule.labels))
        }
        Shape::CommaList => {
            let text = collapsed_text(&element)?;
            let items = strip_label(&text, rule.labels)
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
            non_empty_list(items)
        }
        Shape::Isbn => {
            let text = collapse_whitespace(&visible_text(&element));
            let isbn = ISBN_PATTERN
                .captures(strip_label(&text, rule.labels))?
                .get(1)?;
            non_empty_text(isbn.as_str().trim_end_matches('-'))
        }
        Shape::Year => {
            let text = collapsed_text(&element)?;
            let year = YEAR_PATTERN.find(strip_label(&text, rule.labels))?;
            non_empty_text(year.as_str())
        }
        Shape::Paragraphs => {
            let lines: Vec<String> = element
                .text()
                .map(collapse_whitespace)
                .filter(|line| !line.is_empty())
                .collect();
            non_empty_text(&lines.join("\n"))
        }
        Shape::EachMatch => None,
    }
}

fn assign(record: &mut BookRecord, field: Field, value: FieldValue) {
    match value {
        FieldValue::List(items) => match field {
            Field::Authors => record.authors = items,
            Field::Keywords => record.keywords = items,
            other => tracing::trace!("List value ignored for scalar field {:?}", other),
        },
        FieldValue::Text(text) => {
            let slot = match field {
                Field::Subtitle => &mut record.subtitle,
                Field::Isbn => &mut record.isbn,
                Field::Price => &mut record.price,
                Field::PagesBinding => &mut record.pages_binding,
                Field::Year => &mut record.year,
                Field::Series => &mut record.series,
                Field::Description => &mut record.description,
                Field::Authors | Field::Keywords => return,
            };
            *slot = Some(text);
        }
    }
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

/// Text content with runs of whitespace collapsed; None when blank
fn collapsed_text(element: &ElementRef<'_>) -> Option<String> {
    let text = collapse_whitespace(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content skipping anything inside a `span.invisible`
fn visible_text(element: &ElementRef<'_>) -> String {
    let root = element.id();
    let mut text = String::new();

    for node in element.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root)
            .filter_map(ElementRef::wrap)
            .any(|ancestor| {
                ancestor.value().name() == "span"
                    && ancestor.value().classes().any(|c| c == INVISIBLE_CLASS)
            });

        if !hidden {
            text.push_str(fragment);
        }
    }

    text
}

/// Removes the first matching label, plus a following colon, from the front of `text`
///
/// The label must be followed by whitespace, a colon or the end of the text, so
/// "ISBN" is stripped from "ISBN: 978-…" but a word merely starting with a
/// label is left alone.
fn strip_label<'a>(text: &'a str, labels: &[&str]) -> &'a str {
    let text = text.trim();

    for label in labels {
        let Some(rest) = strip_prefix_ignore_case(text, label) else {
            continue;
        };

        if !(rest.is_empty() || rest.starts_with(':') || rest.starts_with(char::is_whitespace)) {
            continue;
        }

        let rest = rest.trim_start();
        return rest.strip_prefix(':').unwrap_or(rest).trim_start();
    }

    text
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.chars();
    for expected in prefix.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}

fn non_empty_text(text: &str) -> Option<FieldValue> {
    let text = text.trim();
    (!text.is_empty()).then(|| FieldValue::Text(text.to_string()))
}

fn non_empty_list(items: Vec<String>) -> Option<FieldValue> {
    (!items.is_empty()).then_some(FieldValue::List(items))
}
