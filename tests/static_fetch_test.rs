use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use price_tracker::adapters::static_fetcher::StaticFetcher;
use price_tracker::config::toml_config::DEFAULT_USER_AGENT;
use price_tracker::core::PriceStore;
use price_tracker::{FetchError, PricePipeline, RefreshOrchestrator, SqliteStore, TokioSleeper};
use tempfile::TempDir;

fn static_pipeline(timeout: Duration) -> PricePipeline {
    PricePipeline::new(Arc::new(
        StaticFetcher::new(DEFAULT_USER_AGENT, timeout).unwrap(),
    ))
}

#[tokio::test]
async fn test_matched_selector_text_is_normalized() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET)
            .path("/phone")
            .header("user-agent", DEFAULT_USER_AGENT);
        then.status(200).header("content-type", "text/html").body(
            r#"<html><body>
                <h1>Phone 12 (128 GB)</h1>
                <div class="product-price">Rs. 45,000.00</div>
            </body></html>"#,
        );
    });

    let price = static_pipeline(Duration::from_secs(5))
        .fetch_price(&server.url("/phone"))
        .await;

    page.assert();
    assert_eq!(price, Some(45000.00));
}

#[tokio::test]
async fn test_structured_metadata_is_preferred() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/item");
        then.status(200).body(
            r#"<html><head><meta itemprop="price" content="1299.99"></head>
               <body><span class="was-price">$1,499.99</span></body></html>"#,
        );
    });

    let price = static_pipeline(Duration::from_secs(5))
        .fetch_price(&server.url("/item"))
        .await;

    assert_eq!(price, Some(1299.99));
}

#[tokio::test]
async fn test_whole_page_fallback() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/plain");
        then.status(200)
            .body("<html><body><p>Deal of the day:</p><p>$89 only</p></body></html>");
    });

    let price = static_pipeline(Duration::from_secs(5))
        .fetch_price(&server.url("/plain"))
        .await;

    assert_eq!(price, Some(89.0));
}

#[tokio::test]
async fn test_non_success_status_is_absent() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("<html><body>Not found: error 404</body></html>");
    });

    let pipeline = static_pipeline(Duration::from_secs(5));
    let url = server.url("/missing");

    assert_eq!(pipeline.fetch_price(&url).await, None);
    assert!(matches!(
        pipeline.try_fetch_price(&url).await,
        Err(FetchError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200)
            .delay(Duration::from_millis(1500))
            .body("<html><body>$10</body></html>");
    });

    let result = static_pipeline(Duration::from_millis(200))
        .try_fetch_price(&server.url("/slow"))
        .await;

    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_bad_inputs_never_fail() {
    let pipeline = static_pipeline(Duration::from_secs(2));

    for url in ["", "   ", "not a url", "http://", "mailto:someone@example.com"] {
        assert_eq!(pipeline.fetch_price(url).await, None, "input {:?}", url);
    }

    // Nothing listens on port 9 of localhost
    assert_eq!(pipeline.fetch_price("http://127.0.0.1:9/item").await, None);
}

#[tokio::test]
async fn test_refresh_all_against_sqlite_and_live_pages() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(temp_dir.path().join("prices.sqlite")).unwrap());

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(200)
            .body(r#"<html><body><span id="price">999.00</span></body></html>"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/b");
        then.status(500);
    });

    let product = store.add_product("Laptop", Some("Electronics")).unwrap();
    let vendor_a = store.add_vendor("A", Some(server.url("/a").as_str())).unwrap();
    let vendor_b = store.add_vendor("B", Some(server.url("/b").as_str())).unwrap();
    let vendor_c = store.add_vendor("C", None).unwrap();
    store.insert_price_record(product, vendor_a, 1.0).await.unwrap();
    store.insert_price_record(product, vendor_b, 2.0).await.unwrap();
    store.insert_price_record(product, vendor_c, 3.0).await.unwrap();

    let orchestrator = RefreshOrchestrator::new(
        static_pipeline(Duration::from_secs(5)),
        store.clone(),
        Arc::new(TokioSleeper),
        Duration::ZERO,
    );
    let summary = orchestrator.refresh_all().await.unwrap();

    let price_of = |vendor| {
        let store = store.clone();
        async move {
            store
                .find_price_record(product, vendor)
                .await
                .unwrap()
                .map(|r| r.price)
        }
    };
    assert_eq!(price_of(vendor_a).await, Some(999.0));
    assert_eq!(price_of(vendor_b).await, Some(2.0));
    assert_eq!(price_of(vendor_c).await, Some(3.0));
    assert_eq!(store.count_price_records().unwrap(), 3);
    assert_eq!(
        (summary.updated, summary.failed, summary.skipped),
        (1, 1, 1)
    );
}
