//! URL handling for the catalog site
//!
//! Builds listing page URLs per imprint and turns the hrefs found on listing
//! pages into canonical detail page URLs.

mod normalize;

use crate::model::Imprint;
use url::Url;

pub use normalize::{parse_base_url, resolve_detail_url};

/// Path of an imprint's "available titles" listing, relative to the site root
const LISTING_PAGE: &str = "lieferbar.html";

/// Query parameter carrying the 0-based listing page index
const PAGE_PARAM: &str = "p";

/// Builds the URL of one listing page of an imprint
///
/// # Arguments
///
/// * `base_url` - The site root
/// * `imprint` - The imprint whose catalog is listed
/// * `page` - 0-based page index
///
/// # Examples
///
/// ```
/// use matthes_seitz_catalog::model::Imprint;
/// use matthes_seitz_catalog::url::listing_url;
/// use url::Url;
///
/// let base = Url::parse("https://www.matthes-seitz-berlin.de").unwrap();
/// let url = listing_url(&base, Imprint::AugustVerlag, 2);
/// assert_eq!(
///     url.as_str(),
///     "https://www.matthes-seitz-berlin.de/august-verlag/lieferbar.html?p=2"
/// );
/// ```
pub fn listing_url(base_url: &Url, imprint: Imprint, page: u32) -> Url {
    let mut url = base_url.clone();
    let path = format!(
        "{}/{}/{}",
        base_url.path().trim_end_matches('/'),
        imprint.slug(),
        LISTING_PAGE
    );
    url.set_path(&path);
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair(PAGE_PARAM, &page.to_string());
    url
}
