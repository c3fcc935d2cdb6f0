use crate::{UrlError, UrlResult};
use url::Url;

/// Parses the configured site root
///
/// Only HTTP and HTTPS are accepted; plain HTTP is needed for local mock servers.
pub fn parse_base_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Resolves a detail link href to its canonical absolute form
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - invalid URLs or non-HTTP(S) URLs after resolution
///
/// The query string and fragment are dropped: the listing decorates links with
/// tracking parameters (`?lid=1`) that must not leak into record identity.
///
/// # Examples
///
/// ```
/// use matthes_seitz_catalog::url::resolve_detail_url;
/// use url::Url;
///
/// let base = Url::parse("https://www.matthes-seitz-berlin.de").unwrap();
/// let url = resolve_detail_url("/buch/die-welt.html?lid=1", &base).unwrap();
/// assert_eq!(url, "https://www.matthes-seitz-berlin.de/buch/die-welt.html");
/// ```
pub fn resolve_detail_url(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_query(None);
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
