//! Integration tests for the catalog scraper
//!
//! These tests use wiremock to serve listing and detail pages and run the
//! full pipeline end-to-end with a simulated throttle.

use matthes_seitz_catalog::catalog::{build_http_client, Catalog, DelayPolicy, Fetcher, Throttle};
use matthes_seitz_catalog::config::{resolve_config, PolitenessConfig, UserAgentConfig};
use matthes_seitz_catalog::model::{BookRecord, Imprint};
use matthes_seitz_catalog::output::{format_catalog, write_catalog};
use matthes_seitz_catalog::PageFetchError;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an orchestrator pointed at the mock server
fn create_test_catalog(server: &MockServer) -> Catalog {
    let client = build_http_client(&UserAgentConfig::default(), &PolitenessConfig::default())
        .expect("Failed to build HTTP client");
    let fetcher = Fetcher::new(client, DelayPolicy::default());
    let base_url = Url::parse(&server.uri()).expect("Failed to parse mock server URL");
    Catalog::new(fetcher, base_url)
}

fn listing_html(hrefs: &[String]) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<li class="item item_product"><h3 class="title"><a href="{}?lid=7">Titel</a></h3></li>"#,
                href
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="listpager"><p>Anzahl: {}</p></div><ul class="products">{}</ul></body></html>"#,
        hrefs.len(),
        items
    )
}

fn detail_html(title: &str, series: Option<&str>) -> String {
    let series = series
        .map(|s| format!(r#"<div class="serial">Reihe: <a href="/reihe.html">{}</a></div>"#, s))
        .unwrap_or_default();
    format!(
        r#"<html><body>
        <h1 class="title">{}</h1>
        <div class="authors"><a class="author">Anna Autorin</a></div>
        <div class="number">ISBN: 978-3-95757-000-1</div>
        <div class="price"><span>20,00 €</span></div>
        {}
        </body></html>"#,
        title, series
    )
}

/// Serves listing page `page` of an imprint
async fn mount_listing(server: &MockServer, imprint: Imprint, page: u32, hrefs: &[String]) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/lieferbar.html", imprint.slug())))
        .and(query_param("p", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(hrefs)))
        .mount(server)
        .await;
}

/// Serves a listing failure for page `page` of an imprint
async fn mount_listing_error(server: &MockServer, imprint: Imprint, page: u32, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/lieferbar.html", imprint.slug())))
        .and(query_param("p", page.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serves a detail page per href, titled after its file name
async fn mount_details(server: &MockServer, hrefs: &[String]) {
    for href in hrefs {
        Mock::given(method("GET"))
            .and(path(href.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_html(href, None)))
            .mount(server)
            .await;
    }
}

fn hrefs(prefix: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|n| format!("/buch/{}-{}.html", prefix, n))
        .collect()
}

#[tokio::test]
async fn test_full_scrape_single_imprint() {
    let server = MockServer::start().await;
    let page_one = hrefs("msb", 3);
    let page_two = hrefs("msb-late", 1);

    mount_listing(&server, Imprint::MatthesSeitzBerlin, 0, &page_one).await;
    mount_listing(&server, Imprint::MatthesSeitzBerlin, 1, &page_two).await;
    mount_listing(&server, Imprint::MatthesSeitzBerlin, 2, &[]).await;
    mount_details(&server, &page_one).await;
    mount_details(&server, &page_two).await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog
        .run(&[Imprint::MatthesSeitzBerlin], None, &mut throttle)
        .await;

    assert!(report.is_complete());
    assert!(report.skipped.is_empty());
    assert_eq!(report.records.len(), 4);

    let expected: Vec<String> = page_one
        .iter()
        .chain(page_two.iter())
        .map(|href| format!("{}{}", server.uri(), href))
        .collect();
    let urls: Vec<&str> = report.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, expected);

    for record in &report.records {
        assert_eq!(record.imprint, Imprint::MatthesSeitzBerlin);
        assert_eq!(record.authors, vec!["Anna Autorin".to_string()]);
        assert_eq!(record.isbn.as_deref(), Some("978-3-95757-000-1"));
        assert_eq!(record.price.as_deref(), Some("20,00 €"));
    }

    // Three listing pages at 1s plus four detail pages at 0.5s
    assert_eq!(throttle.total_delay(), Duration::from_secs(5));
    assert_eq!(report.total_delay, Duration::from_secs(5));
    assert_eq!(throttle.pause_count(), 7);
}

#[tokio::test]
async fn test_only_requested_imprint_is_scraped() {
    let server = MockServer::start().await;
    let presse = hrefs("fp", 2);

    mount_listing(&server, Imprint::FriedenauerPresse, 0, &presse).await;
    mount_listing(&server, Imprint::FriedenauerPresse, 1, &[]).await;
    mount_details(&server, &presse).await;

    // Any request for another imprint's listing would fail the test
    Mock::given(method("GET"))
        .and(path("/matthes-seitz-berlin/lieferbar.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog
        .run(&[Imprint::FriedenauerPresse], None, &mut throttle)
        .await;

    assert!(report.is_complete());
    assert_eq!(report.records.len(), 2);
    assert!(report
        .records
        .iter()
        .all(|r| r.imprint == Imprint::FriedenauerPresse));
}

#[tokio::test]
async fn test_limit_stops_across_imprints() {
    let server = MockServer::start().await;
    let first = hrefs("msb", 1);
    let second = hrefs("fp", 3);

    mount_listing(&server, Imprint::MatthesSeitzBerlin, 0, &first).await;
    mount_listing(&server, Imprint::MatthesSeitzBerlin, 1, &[]).await;
    mount_listing(&server, Imprint::FriedenauerPresse, 0, &second).await;
    mount_details(&server, &first).await;
    mount_details(&server, &second).await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog
        .run(
            &[Imprint::MatthesSeitzBerlin, Imprint::FriedenauerPresse],
            Some(2),
            &mut throttle,
        )
        .await;

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].imprint, Imprint::MatthesSeitzBerlin);
    assert_eq!(report.records[1].imprint, Imprint::FriedenauerPresse);
    assert_eq!(report.records[1].url, format!("{}{}", server.uri(), second[0]));

    // Nothing after the second record is fetched
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(!requests
        .iter()
        .any(|r| r.url.path() == second[1] || r.url.path() == second[2]));
}

#[tokio::test]
async fn test_limit_above_available_returns_everything() {
    let server = MockServer::start().await;
    let books = hrefs("av", 2);

    mount_listing(&server, Imprint::AugustVerlag, 0, &books).await;
    mount_listing(&server, Imprint::AugustVerlag, 1, &[]).await;
    mount_details(&server, &books).await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog
        .run(&[Imprint::AugustVerlag], Some(50), &mut throttle)
        .await;

    assert!(report.is_complete());
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn test_zero_limit_makes_no_requests() {
    let server = MockServer::start().await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog.run(&Imprint::ALL, Some(0), &mut throttle).await;

    assert!(report.records.is_empty());
    assert_eq!(throttle.total_delay(), Duration::ZERO);
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_listing_failure_keeps_other_imprints() {
    let server = MockServer::start().await;
    let msb = hrefs("msb", 2);
    let august = hrefs("av", 1);

    mount_listing(&server, Imprint::MatthesSeitzBerlin, 0, &msb).await;
    mount_listing(&server, Imprint::MatthesSeitzBerlin, 1, &[]).await;
    mount_listing_error(&server, Imprint::FriedenauerPresse, 0, 500).await;
    mount_listing(&server, Imprint::AugustVerlag, 0, &august).await;
    mount_listing(&server, Imprint::AugustVerlag, 1, &[]).await;
    mount_details(&server, &msb).await;
    mount_details(&server, &august).await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog.run(&Imprint::ALL, None, &mut throttle).await;

    assert!(!report.is_complete());
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.failed_imprints.len(), 1);

    let failure = &report.failed_imprints[0];
    assert_eq!(failure.imprint, Imprint::FriedenauerPresse);
    assert_eq!(failure.records_before_failure, 0);
    assert!(matches!(
        failure.error,
        PageFetchError::Status { status: 500, .. }
    ));
    assert!(failure.error.url().contains("friedenauer-presse/lieferbar.html"));

    assert_eq!(report.records[2].imprint, Imprint::AugustVerlag);
}

#[tokio::test]
async fn test_failure_on_later_listing_page_keeps_earlier_records() {
    let server = MockServer::start().await;
    let page_one = hrefs("msb", 2);

    mount_listing(&server, Imprint::MatthesSeitzBerlin, 0, &page_one).await;
    mount_listing_error(&server, Imprint::MatthesSeitzBerlin, 1, 502).await;
    mount_details(&server, &page_one).await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog
        .run(&[Imprint::MatthesSeitzBerlin], None, &mut throttle)
        .await;

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.failed_imprints.len(), 1);
    assert_eq!(report.failed_imprints[0].records_before_failure, 2);
}

#[tokio::test]
async fn test_failing_detail_page_is_skipped() {
    let server = MockServer::start().await;
    let books = hrefs("msb", 3);

    mount_listing(&server, Imprint::MatthesSeitzBerlin, 0, &books).await;
    mount_listing(&server, Imprint::MatthesSeitzBerlin, 1, &[]).await;
    mount_details(&server, &[books[0].clone()]).await;
    Mock::given(method("GET"))
        .and(path(books[1].as_str()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    // A page without a title yields no record either
    Mock::given(method("GET"))
        .and(path(books[2].as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog
        .run(&[Imprint::MatthesSeitzBerlin], None, &mut throttle)
        .await;

    assert!(report.is_complete());
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].url, format!("{}{}", server.uri(), books[1]));
    assert_eq!(report.skipped[1].url, format!("{}{}", server.uri(), books[2]));

    // Failed detail fetches are paced like successful ones
    assert_eq!(
        throttle.total_delay(),
        Duration::from_secs(2) + Duration::from_millis(1500)
    );
}

#[tokio::test]
async fn test_duplicate_listing_entry_fetched_once() {
    let server = MockServer::start().await;
    let book = "/buch/doppelt.html".to_string();

    mount_listing(&server, Imprint::MatthesSeitzBerlin, 0, &[book.clone()]).await;
    mount_listing(&server, Imprint::MatthesSeitzBerlin, 1, &[]).await;
    mount_listing(&server, Imprint::FriedenauerPresse, 0, &[book.clone()]).await;
    mount_listing(&server, Imprint::FriedenauerPresse, 1, &[]).await;

    Mock::given(method("GET"))
        .and(path(book.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html("Doppelt", None)))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog
        .run(
            &[Imprint::MatthesSeitzBerlin, Imprint::FriedenauerPresse],
            None,
            &mut throttle,
        )
        .await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.records[0].imprint, Imprint::MatthesSeitzBerlin);
}

#[tokio::test]
async fn test_json_output_omits_missing_series() {
    let server = MockServer::start().await;
    let books = vec!["/buch/mit.html".to_string(), "/buch/ohne.html".to_string()];

    mount_listing(&server, Imprint::MatthesSeitzBerlin, 0, &books).await;
    mount_listing(&server, Imprint::MatthesSeitzBerlin, 1, &[]).await;
    Mock::given(method("GET"))
        .and(path("/buch/mit.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_html("Mit Reihe", Some("Naturkunden"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/buch/ohne.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html("Ohne Reihe", None)))
        .mount(&server)
        .await;

    let catalog = create_test_catalog(&server);
    let mut throttle = Throttle::simulated();
    let report = catalog
        .run(&[Imprint::MatthesSeitzBerlin], None, &mut throttle)
        .await;

    let json = format_catalog(&report.records).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let items = parsed.as_array().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["series"], "Naturkunden");
    assert_eq!(items[0]["imprint"], "matthes-seitz-berlin");
    assert!(items[1].get("series").is_none());
    assert!(items[1].get("description").is_none());
    assert!(items[1].get("keywords").is_none());
}

#[tokio::test]
async fn test_scrape_from_config_file_to_output_file() {
    let server = MockServer::start().await;
    let books = hrefs("av", 2);

    mount_listing(&server, Imprint::AugustVerlag, 0, &books).await;
    mount_listing(&server, Imprint::AugustVerlag, 1, &[]).await;
    mount_details(&server, &books).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = dir.path().join("catalog.toml");
    let output_path = dir.path().join("out").join("books.json");
    std::fs::write(
        &config_path,
        format!(
            r#"
[site]
base-url = "{}"

[user-agent]
crawler-name = "TestCatalog"

[politeness]
listing-delay-ms = 0
detail-delay-ms = 0

[output]
imprints = ["august-verlag"]
"#,
            server.uri()
        ),
    )
    .expect("Failed to write config");

    let (config, hash) = resolve_config(Some(config_path.as_path())).unwrap();
    assert_eq!(hash.map(|h| h.len()), Some(64));

    let imprints = config.output.imprints.clone().unwrap();
    let catalog = Catalog::from_config(&config).unwrap();
    let mut throttle = Throttle::real();
    let report = catalog.run(&imprints, None, &mut throttle).await;

    assert!(report.is_complete());
    assert_eq!(report.total_delay, Duration::ZERO);

    write_catalog(&report.records, &output_path).unwrap();
    let written: Vec<BookRecord> =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written, report.records);
    assert_eq!(written.len(), 2);

    assert!(config
        .user_agent
        .header_value()
        .starts_with("TestCatalog/1.0 (+"));
}
