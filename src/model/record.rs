use crate::model::Imprint;
use serde::{Deserialize, Serialize};

/// One book's bibliographic data, as extracted from its detail page
///
/// `url` and `imprint` are always present. Every other field is either a
/// non-empty value or absent: absent strings and empty sequences are left out
/// of the serialized object entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Detail page URL, the record's identity
    pub url: String,

    /// Imprint whose listing led to this book
    pub imprint: Imprint,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Authors in page order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    /// ISBN-13 as printed on the page (hyphens kept)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,

    /// Localized price text, e.g. "22,00 €"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    /// Page count and binding, e.g. "92 Seiten, Klappenbroschur"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_binding: Option<String>,

    /// Four-digit publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Blurb text, paragraphs separated by newlines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BookRecord {
    /// Creates a record holding only the mandatory fields
    pub fn new(url: impl Into<String>, imprint: Imprint, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            imprint,
            title: title.into(),
            subtitle: None,
            authors: Vec::new(),
            isbn: None,
            price: None,
            pages_binding: None,
            year: None,
            series: None,
            keywords: Vec::new(),
            description: None,
        }
    }
}
