//! Integration tests for single-asset fetching.
//!
//! Each test drives an [`AssetFetcher`] against a wiremock server.

mod support;

use std::time::Duration;

use packager_core::download::{AssetError, AssetFetcher, AssetKind, ByteBudget};
use support::socket_guard::start_mock_server_or_skip;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_URL: &str = "https://blog.example.com/posts/42";

fn fetcher(timeout: Duration, max_asset_bytes: u64) -> AssetFetcher {
    AssetFetcher::with_client(reqwest::Client::new(), timeout, max_asset_bytes)
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_sends_article_referer() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/img/cover.jpg"))
        .and(header("referer", ARTICLE_URL))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let budget = ByteBudget::new(1024);
    let asset = fetcher(Duration::from_secs(5), 1024)
        .try_fetch(
            &format!("{}/img/cover.jpg", server.uri()),
            ARTICLE_URL,
            AssetKind::Image,
            &budget,
        )
        .await
        .expect("image should be fetched");

    assert_eq!(asset.filename, "cover.jpg");
    assert_eq!(asset.content, vec![0xFF, 0xD8, 0xFF]);
    assert_eq!(budget.used(), 3);
}

#[tokio::test]
async fn test_fetch_uses_content_disposition_filename() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/download/3",
        ResponseTemplate::new(200)
            .insert_header("content-type", "application/pdf")
            .insert_header(
                "content-disposition",
                r#"attachment; filename="annual-report.pdf""#,
            )
            .set_body_bytes(b"%PDF-1.7".to_vec()),
    )
    .await;

    let budget = ByteBudget::new(1024);
    let asset = fetcher(Duration::from_secs(5), 1024)
        .try_fetch(
            &format!("{}/download/3", server.uri()),
            ARTICLE_URL,
            AssetKind::File,
            &budget,
        )
        .await
        .expect("file should be fetched");

    assert_eq!(asset.filename, "annual-report.pdf");
    assert_eq!(asset.content_type.as_deref(), Some("application/pdf"));
}

#[tokio::test]
async fn test_fetch_infers_extension_from_content_type() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/media/chart",
        ResponseTemplate::new(200)
            .insert_header("content-type", "image/png")
            .set_body_bytes(vec![1u8; 8]),
    )
    .await;

    let budget = ByteBudget::new(1024);
    let asset = fetcher(Duration::from_secs(5), 1024)
        .try_fetch(
            &format!("{}/media/chart", server.uri()),
            ARTICLE_URL,
            AssetKind::Image,
            &budget,
        )
        .await
        .expect("image should be fetched");

    assert_eq!(asset.filename, "chart.png");
}

#[tokio::test]
async fn test_fetch_rejects_html_served_as_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/paper.pdf",
        ResponseTemplate::new(200)
            .set_body_raw("<html>login required</html>", "text/html; charset=utf-8"),
    )
    .await;

    let budget = ByteBudget::new(1024);
    let result = fetcher(Duration::from_secs(5), 1024)
        .try_fetch(
            &format!("{}/paper.pdf", server.uri()),
            ARTICLE_URL,
            AssetKind::File,
            &budget,
        )
        .await;

    assert!(
        matches!(result, Err(AssetError::DisallowedContentType { .. })),
        "expected content type rejection, got {result:?}"
    );
    assert_eq!(budget.used(), 0);
}

#[tokio::test]
async fn test_fetch_reports_http_status() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(&server, "/missing.png", ResponseTemplate::new(404)).await;

    let budget = ByteBudget::new(1024);
    let result = fetcher(Duration::from_secs(5), 1024)
        .try_fetch(
            &format!("{}/missing.png", server.uri()),
            ARTICLE_URL,
            AssetKind::Image,
            &budget,
        )
        .await;

    assert!(matches!(
        result,
        Err(AssetError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_fetch_rejects_empty_body() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/blank.png",
        ResponseTemplate::new(200).insert_header("content-type", "image/png"),
    )
    .await;

    let budget = ByteBudget::new(1024);
    let result = fetcher(Duration::from_secs(5), 1024)
        .try_fetch(
            &format!("{}/blank.png", server.uri()),
            ARTICLE_URL,
            AssetKind::Image,
            &budget,
        )
        .await;

    assert!(matches!(result, Err(AssetError::EmptyBody { .. })));
}

#[tokio::test]
async fn test_fetch_enforces_per_asset_limit() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/huge.zip",
        ResponseTemplate::new(200)
            .insert_header("content-type", "application/zip")
            .set_body_bytes(vec![0u8; 2048]),
    )
    .await;

    let budget = ByteBudget::new(1_000_000);
    let result = fetcher(Duration::from_secs(5), 1024)
        .try_fetch(
            &format!("{}/huge.zip", server.uri()),
            ARTICLE_URL,
            AssetKind::File,
            &budget,
        )
        .await;

    assert!(matches!(
        result,
        Err(AssetError::TooLarge { limit: 1024, .. })
    ));
    assert_eq!(budget.used(), 0);
}

#[tokio::test]
async fn test_fetch_times_out_slow_responses() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/slow.png",
        ResponseTemplate::new(200)
            .insert_header("content-type", "image/png")
            .set_body_bytes(vec![1u8; 4])
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let budget = ByteBudget::new(1024);
    let started = std::time::Instant::now();
    let result = fetcher(Duration::from_millis(200), 1024)
        .try_fetch(
            &format!("{}/slow.png", server.uri()),
            ARTICLE_URL,
            AssetKind::Image,
            &budget,
        )
        .await;

    assert!(matches!(result, Err(AssetError::Timeout { .. })));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_fetch_stops_when_budget_is_exhausted() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/a.png",
        ResponseTemplate::new(200)
            .insert_header("content-type", "image/png")
            .set_body_bytes(vec![1u8; 10]),
    )
    .await;

    let budget = ByteBudget::new(15);
    let fetcher = fetcher(Duration::from_secs(5), 1024);
    let url = format!("{}/a.png", server.uri());

    let first = fetcher
        .fetch(&url, ARTICLE_URL, AssetKind::Image, &budget)
        .await;
    assert!(first.is_some());

    let second = fetcher
        .try_fetch(&url, ARTICLE_URL, AssetKind::Image, &budget)
        .await;
    assert!(matches!(
        second,
        Err(AssetError::BudgetExhausted {
            size: 10,
            remaining: 5,
            ..
        })
    ));
    assert_eq!(budget.used(), 10);
}
