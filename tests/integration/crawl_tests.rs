//! Integration tests for the crawl cycle
//!
//! These tests use wiremock to stand in for the retail source, the
//! secondary market and the translation site, and run the source client and
//! the full cycle against them.

use async_trait::async_trait;
use catalog_harvest::config::{parse_config, Config};
use catalog_harvest::cycle::run_cycle_with;
use catalog_harvest::model::{EnrichedProduct, LocalizedDescription, StoredRecord};
use catalog_harvest::pipeline::Translator;
use catalog_harvest::source::{CatalogSource, HttpCatalogSource};
use catalog_harvest::storage::{
    DiffSplit, ProductStore, RunRecord, RunStatus, SqliteStorage, StorageError, StorageResult,
};
use catalog_harvest::{run_cycle, CrawlPhase, FetchError, HarvestError, TranslationError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MENU_HTML: &str = r#"
<html><body>
  <nav>
    <span>Kitchen</span>
    <ul>
      <li><a data-tracking-label="ka001">Cabinets</a></li>
      <li><a data-tracking-label="ka002">Sinks</a></li>
      <li><a data-tracking-label="all">All kitchen</a></li>
    </ul>
  </nav>
  <nav>
    <span>Food</span>
    <ul><li><a data-tracking-label="fd001">Restoran i Bistro</a></li></ul>
  </nav>
</body></html>"#;

const DETAIL_HTML: &str = r#"
<html><body>
  <div class="pip-product-details__container">
    <p class="pip-product-details__paragraph">Adjustable shelves.</p>
  </div>
</body></html>"#;

const MARKET_HTML: &str = r#"
<div class="pip-temp-price-module__price">
  <span class="pip-temp-price__integer">1.299</span>
  <span class="pip-temp-price__decimal">,99</span>
</div>"#;

/// Builds a validated configuration pointing every endpoint at `server`
fn create_test_config(server: &str, db_path: &str, crawler: &str) -> Config {
    let toml = format!(
        r#"
[source]
category-menu-url = "{server}/rs/sr/cat/"
listing-url = "{server}/listing"
category-tags-url = "{server}/statics/{{product_id}}"
consumer-id = "test-consumer"

[crawler]
{crawler}

[retry]
max-retries = 5
backoff-base-ms = 1

[timeouts]
lookup-ms = 2000
listing-ms = 2000

[translation]
base-url = "{server}/translate"

[user-agent]
crawler-name = "TestHarvester"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
database-path = "{db_path}"
summary-path = "./summary.md"
"#
    );
    parse_config(&toml).expect("test config should be valid")
}

fn listing(server: &str, id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "mainImageAlt": format!("{} Bookcase, white", name),
        "mainImageUrl": format!("{}/img/{}.jpg", server, id),
        "pipUrl": format!("{}/rs/sr/p/{}-{}/", server, name.to_lowercase(), id),
        "salesPrice": { "numeral": 5999.0 },
        "availability": [{ "store": "Beograd", "status": "IN_STOCK" }],
        "categoryPath": [{ "key": "st001" }]
    })
}

fn window(listings: Vec<serde_json::Value>) -> serde_json::Value {
    json!({ "moreProducts": { "productWindow": listings } })
}

async fn mount_menu(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rs/sr/cat/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MENU_HTML))
        .mount(server)
        .await;
}

async fn mount_window(server: &MockServer, category: &str, start: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("category", category))
        .and(query_param("start", start))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Detail and market pages for every product, tag lookups failing
async fn mount_product_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/rs/sr/p/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL_HTML))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/hr/hr/p/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MARKET_HTML))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/statics/.+"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

async fn mount_translation_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/translate/locale/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/translate/product/\d{8}$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="product__info"><p>Stellazh</p></div>
               <div class="product__description">Polki</div>"#,
        ))
        .mount(server)
        .await;
}

async fn translation_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with("/translate/product/"))
        .count()
}

/// Translator double that counts calls
#[derive(Default)]
struct CountingTranslator {
    calls: AtomicUsize,
}

#[async_trait]
impl Translator for CountingTranslator {
    async fn translate(
        &self,
        _product_id: u64,
        _locale: &str,
    ) -> Result<LocalizedDescription, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LocalizedDescription::new("translated", "translated long"))
    }
}

/// Store double whose diff always fails
#[derive(Default)]
struct UnreachableStore {
    upserted: usize,
}

impl ProductStore for UnreachableStore {
    fn diff(&self, _batch: Vec<EnrichedProduct>) -> StorageResult<DiffSplit> {
        Err(StorageError::Database("connection refused".to_string()))
    }

    fn upsert(&mut self, records: &[StoredRecord]) -> StorageResult<usize> {
        self.upserted += records.len();
        Ok(records.len())
    }

    fn all(&self) -> StorageResult<Vec<StoredRecord>> {
        Err(StorageError::Database("connection refused".to_string()))
    }

    fn count(&self) -> StorageResult<u64> {
        Ok(0)
    }

    fn create_run(&mut self, _config_hash: &str) -> StorageResult<i64> {
        Ok(1)
    }

    fn complete_run(&mut self, _run_id: i64, _report_json: &str) -> StorageResult<()> {
        Ok(())
    }

    fn fail_run(&mut self, _run_id: i64, _message: &str) -> StorageResult<()> {
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_listing_pages_until_empty_window() {
    let server = MockServer::start().await;
    let base = server.uri();
    let config = create_test_config(&base, "./unused.db", "page-size = 2");

    mount_window(
        &server,
        "ka001",
        "0",
        window(vec![listing(&base, "1", "A"), listing(&base, "2", "B")]),
    )
    .await;
    mount_window(&server, "ka001", "2", window(vec![listing(&base, "3", "C")])).await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("start", "4"))
        .and(query_param("end", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(window(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpCatalogSource::new(&config).unwrap();
    let listings = source.list_products_in_category("ka001").await.unwrap();

    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_malformed_listing_entry_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let config = create_test_config(&base, "./unused.db", "");

    mount_window(
        &server,
        "ka001",
        "0",
        window(vec![listing(&base, "1", "A"), json!({ "name": "no id" })]),
    )
    .await;
    mount_window(&server, "ka001", "1000", window(vec![])).await;

    let source = HttpCatalogSource::new(&config).unwrap();
    let listings = source.list_products_in_category("ka001").await.unwrap();

    assert_eq!(listings.len(), 1);
}

#[tokio::test]
async fn test_window_of_only_malformed_entries_keeps_paging() {
    let server = MockServer::start().await;
    let base = server.uri();
    let config = create_test_config(&base, "./unused.db", "page-size = 2");

    mount_window(
        &server,
        "ka001",
        "0",
        window(vec![json!({ "name": "bad1" }), json!({ "name": "bad2" })]),
    )
    .await;
    mount_window(&server, "ka001", "2", window(vec![listing(&base, "3", "C")])).await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("start", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(window(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpCatalogSource::new(&config).unwrap();
    let listings = source.list_products_in_category("ka001").await.unwrap();

    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["3"]);
}

#[tokio::test]
async fn test_listing_gives_up_after_retries() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri(), "./unused.db", "");

    // One attempt plus five retries
    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(ResponseTemplate::new(503))
        .expect(6)
        .mount(&server)
        .await;

    let source = HttpCatalogSource::new(&config).unwrap();
    let result = source.list_products_in_category("ka001").await;

    assert!(matches!(
        result,
        Err(HarvestError::Fetch(FetchError::Status { status: 503, .. }))
    ));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri(), "./unused.db", "");

    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpCatalogSource::new(&config).unwrap();
    assert!(source.list_products_in_category("ka001").await.is_err());
}

#[tokio::test]
async fn test_category_tags_lookup() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri(), "./unused.db", "");

    Mock::given(method("GET"))
        .and(path("/statics/10123456"))
        .and(header("x-consumer-id", "test-consumer"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "rangeIds": ["fu003", "fu004"] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/statics/20000001"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/statics/30000001"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = HttpCatalogSource::new(&config).unwrap();

    assert_eq!(
        source.get_category_tags(10123456).await,
        Some(vec!["fu003".to_string(), "fu004".to_string()])
    );
    assert_eq!(source.get_category_tags(20000001).await, None);
    assert_eq!(source.get_category_tags(30000001).await, None);
}

#[tokio::test]
async fn test_category_menu_is_parsed() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri(), "./unused.db", "");
    mount_menu(&server).await;

    let source = HttpCatalogSource::new(&config).unwrap();
    let tree = source.list_categories().await.unwrap();

    assert_eq!(tree.categories().len(), 2);
    let kitchen = &tree.categories()[0];
    assert_eq!(kitchen.node.display_name, "Kitchen");
    let subs: Vec<&str> = kitchen.subcategories.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(subs, vec!["ka001", "ka002"]);
}

#[tokio::test]
async fn test_full_cycle_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");
    let config = create_test_config(&base, db_path.to_str().unwrap(), "");

    mount_menu(&server).await;
    mount_product_pages(&server).await;
    mount_translation_site(&server).await;

    // Cabinets lists the same product twice
    mount_window(
        &server,
        "ka001",
        "0",
        window(vec![
            listing(&base, "10123456", "BILLY"),
            listing(&base, "10123456", "BILLY"),
            listing(&base, "20000001", "LACK"),
        ]),
    )
    .await;
    mount_window(&server, "ka001", "1000", window(vec![])).await;

    // Sinks never answers
    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("category", "ka002"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    // The excluded subcategory is never listed
    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("category", "fd001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(window(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = run_cycle(&config, "hash-1").await.unwrap();

    assert_eq!(outcome.phase, CrawlPhase::Done);
    assert_eq!(outcome.stats.subcategories_failed, 1);
    assert_eq!(outcome.stats.subcategories_excluded, 1);

    let mut ids: Vec<u64> = outcome.records.iter().map(|r| r.product_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![10123456, 20000001]);
    assert_eq!(outcome.new, 2);
    assert_eq!(outcome.written, 2);

    let billy = outcome
        .records
        .iter()
        .find(|r| r.product_id == 10123456)
        .unwrap();
    assert_eq!(billy.product_description, "Bookcase, white");
    assert_eq!(billy.price, Some(74));
    assert!((billy.price_hr.unwrap() - 1299.99).abs() < 1e-9);
    assert!(billy.availability);
    assert_eq!(billy.category_tags, r#"["st001"]"#);
    assert_eq!(billy.translations["ru"].description, "Stellazh");
    assert_eq!(billy.translations["en"].long_description, "Polki");

    assert_eq!(outcome.crawl_report.total_records, 2);
    assert_eq!(outcome.crawl_report.percent("price_hr"), Some(100));
    assert_eq!(outcome.crawl_report.percent("materials"), Some(0));
    assert_eq!(outcome.database_report.total_records, 2);

    // 2 products x 2 locales
    assert_eq!(translation_requests(&server).await, 4);

    // A second cycle finds both products stored and translates nothing
    let second = run_cycle(&config, "hash-1").await.unwrap();
    assert_eq!(second.existing, 2);
    assert_eq!(second.new, 0);
    assert_eq!(translation_requests(&server).await, 4);

    // Stored translations survive the second upsert
    let storage = SqliteStorage::new(&db_path).unwrap();
    let stored = storage.all().unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored
        .iter()
        .all(|r| r.translations["ru"].description == "Stellazh"));
    assert_eq!(
        storage.latest_run().unwrap().unwrap().status,
        RunStatus::Completed
    );
}

#[tokio::test]
async fn test_unreachable_store_skips_translation() {
    let server = MockServer::start().await;
    let base = server.uri();
    let config = create_test_config(&base, "./unused.db", "");

    mount_menu(&server).await;
    mount_product_pages(&server).await;
    mount_window(
        &server,
        "ka001",
        "0",
        window(vec![listing(&base, "10123456", "BILLY")]),
    )
    .await;
    mount_window(&server, "ka001", "1000", window(vec![])).await;
    mount_window(&server, "ka002", "0", window(vec![])).await;

    let source: Arc<dyn CatalogSource> = Arc::new(HttpCatalogSource::new(&config).unwrap());
    let mut store = UnreachableStore::default();
    let translator = CountingTranslator::default();

    let outcome = run_cycle_with(&config, "hash", source, &mut store, &translator)
        .await
        .unwrap();

    assert!(outcome.diff_degraded);
    assert_eq!(outcome.existing, 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.crawl_report.total_records, 1);
    assert_eq!(store.upserted, 1);
}

#[tokio::test]
async fn test_cap_stops_the_cycle() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("capped.db");
    let config = create_test_config(&base, db_path.to_str().unwrap(), "max-products = 2");

    mount_menu(&server).await;
    mount_product_pages(&server).await;
    mount_window(
        &server,
        "ka001",
        "0",
        window(
            (1..=6)
                .map(|i| listing(&base, &format!("1000000{}", i), "ITEM"))
                .collect(),
        ),
    )
    .await;
    mount_window(&server, "ka001", "1000", window(vec![])).await;

    // Nothing after the cap is walked
    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("category", "ka002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(window(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let source: Arc<dyn CatalogSource> = Arc::new(HttpCatalogSource::new(&config).unwrap());
    let mut store = SqliteStorage::new(&db_path).unwrap();
    let translator = CountingTranslator::default();

    let outcome = run_cycle_with(&config, "hash", source, &mut store, &translator)
        .await
        .unwrap();

    assert_eq!(outcome.phase, CrawlPhase::Capped);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(translator.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_cap_reached_on_last_listing_ends_capped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("capped_last.db");
    let config = create_test_config(&base, db_path.to_str().unwrap(), "max-products = 3");

    mount_menu(&server).await;
    mount_product_pages(&server).await;
    mount_window(
        &server,
        "ka001",
        "0",
        window(vec![
            listing(&base, "10000001", "ONE"),
            listing(&base, "10000002", "TWO"),
        ]),
    )
    .await;
    mount_window(&server, "ka001", "1000", window(vec![])).await;
    mount_window(
        &server,
        "ka002",
        "0",
        window(vec![listing(&base, "10000003", "THREE")]),
    )
    .await;
    mount_window(&server, "ka002", "1000", window(vec![])).await;

    let source: Arc<dyn CatalogSource> = Arc::new(HttpCatalogSource::new(&config).unwrap());
    let mut store = SqliteStorage::new(&db_path).unwrap();
    let translator = CountingTranslator::default();

    let outcome = run_cycle_with(&config, "hash", source, &mut store, &translator)
        .await
        .unwrap();

    assert_eq!(outcome.phase, CrawlPhase::Capped);
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test]
async fn test_zero_cap_enriches_nothing() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("zero_cap.db");
    let mut config = create_test_config(&base, db_path.to_str().unwrap(), "");
    config.crawler.max_products = Some(0);

    mount_menu(&server).await;
    mount_window(
        &server,
        "ka001",
        "0",
        window(vec![listing(&base, "10000001", "ONE")]),
    )
    .await;
    mount_window(&server, "ka001", "1000", window(vec![])).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/rs/sr/p/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL_HTML))
        .expect(0)
        .mount(&server)
        .await;

    let source: Arc<dyn CatalogSource> = Arc::new(HttpCatalogSource::new(&config).unwrap());
    let mut store = SqliteStorage::new(&db_path).unwrap();
    let translator = CountingTranslator::default();

    let outcome = run_cycle_with(&config, "hash", source, &mut store, &translator)
        .await
        .unwrap();

    assert_eq!(outcome.phase, CrawlPhase::Capped);
    assert!(outcome.records.is_empty());
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_zero_cap_in_config_is_rejected() {
    let toml = r#"
[source]
category-menu-url = "http://localhost/rs/sr/cat/"
listing-url = "http://localhost/listing"
category-tags-url = "http://localhost/statics/{product_id}"

[crawler]
max-products = 0

[translation]
base-url = "http://localhost/translate"

[user-agent]
crawler-name = "TestHarvester"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
database-path = "./unused.db"
summary-path = "./summary.md"
"#;
    assert!(parse_config(toml).is_err());
}

#[tokio::test]
async fn test_unreachable_menu_fails_the_run() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("failed.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap(), "");

    Mock::given(method("GET"))
        .and(path("/rs/sr/cat/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let source: Arc<dyn CatalogSource> = Arc::new(HttpCatalogSource::new(&config).unwrap());
    let mut store = SqliteStorage::new(&db_path).unwrap();
    let translator = CountingTranslator::default();

    let result = run_cycle_with(&config, "hash", source, &mut store, &translator).await;

    assert!(matches!(result, Err(HarvestError::Fetch(_))));
    let run = store.latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error_message.is_some());
}
