//! Tests for the ingestion pipeline with stubbed enrichment collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use linkmark::database::Database;
use linkmark::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use linkmark::managers::category_manager::{CategoryManager, CategoryManagerTrait};
use linkmark::services::ingestion::{validate_url, IngestionPipeline};
use linkmark::services::http_client::HttpClientTrait;
use linkmark::services::metadata_extractor::{favicon_url, MetadataExtractor, MetadataExtractorTrait};
use linkmark::services::summarizer::{unavailable_summary, Summarizer, SummarizerTrait};
use linkmark::types::category::NewCategory;
use linkmark::types::errors::{BookmarkError, FetchError};
use linkmark::types::settings::{FetchSettings, SummarizerSettings};
use rstest::rstest;
use serde_json::{json, Value};

/// Returns a fixed title and counts how often it was asked.
struct StubExtractor {
    title: String,
    calls: AtomicUsize,
}

#[async_trait]
impl MetadataExtractorTrait for StubExtractor {
    async fn extract_title(&self, _url: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.title.clone()
    }

    fn extract_favicon(&self, url: &str) -> String {
        favicon_url(url)
    }
}

/// Echoes a fixed summary, or the unavailable fallback when `summary` is `None`.
struct StubSummarizer {
    summary: Option<String>,
}

#[async_trait]
impl SummarizerTrait for StubSummarizer {
    async fn generate_summary(&self, _url: &str, title: &str) -> String {
        self.summary.clone().unwrap_or_else(|| unavailable_summary(title))
    }
}

/// How the unreliable network behaves for one test.
#[derive(Clone, Copy)]
enum Network {
    /// Every request times out.
    TimingOut,
    /// Pages load without a `<title>`; completions come back without `choices`.
    Malformed,
}

#[async_trait]
impl HttpClientTrait for Network {
    async fn get_text(&self, _url: &str, timeout: Duration) -> Result<String, FetchError> {
        match self {
            Network::TimingOut => Err(FetchError::Timeout(timeout.as_secs())),
            Network::Malformed => Ok("<html><body><p>untitled page</p></body></html>".to_string()),
        }
    }

    async fn post_json(
        &self,
        _url: &str,
        _bearer_token: Option<&str>,
        _body: &Value,
        timeout: Duration,
    ) -> Result<Value, FetchError> {
        match self {
            Network::TimingOut => Err(FetchError::Timeout(timeout.as_secs())),
            Network::Malformed => Ok(json!({"object": "error", "message": "overloaded"})),
        }
    }
}

/// Pipeline with the real extractor and summarizer over the given network.
fn composed_pipeline(network: Network) -> (Arc<Database>, IngestionPipeline) {
    let db = Arc::new(Database::open_in_memory().expect("Failed to open in-memory database"));
    let http: Arc<dyn HttpClientTrait> = Arc::new(network);
    let fetch = FetchSettings::default();
    let extractor = Arc::new(MetadataExtractor::new(http.clone(), &fetch));
    let summarizer = Arc::new(Summarizer::new(http, &fetch, SummarizerSettings::default()));
    let pipeline = IngestionPipeline::new(db.clone(), extractor, summarizer);
    (db, pipeline)
}

fn pipeline(title: &str, summary: Option<&str>) -> (Arc<Database>, Arc<StubExtractor>, IngestionPipeline) {
    let db = Arc::new(Database::open_in_memory().expect("Failed to open in-memory database"));
    let extractor = Arc::new(StubExtractor {
        title: title.to_string(),
        calls: AtomicUsize::new(0),
    });
    let summarizer = Arc::new(StubSummarizer { summary: summary.map(str::to_string) });
    let pipeline = IngestionPipeline::new(db.clone(), extractor.clone(), summarizer);
    (db, extractor, pipeline)
}

#[tokio::test]
async fn test_add_bookmark_end_to_end() {
    let (db, _, pipeline) = pipeline("Example Domain", Some("A simple example site."));

    let bm = pipeline
        .add_bookmark("u1", "https://example.com", Some("news, tech"), None)
        .await
        .unwrap();

    assert_eq!(bm.url, "https://example.com");
    assert_eq!(bm.title, "Example Domain");
    assert_eq!(bm.favicon, "https://example.com/favicon.ico");
    assert_eq!(bm.summary, "A simple example site.");
    assert_eq!(bm.tags, "news, tech");
    assert_eq!(bm.user_id, "u1");
    assert!(bm.category_id.is_none());

    let conn = db.connection();
    let stored = BookmarkManager::new(&conn).list_for_user("u1").unwrap();
    assert_eq!(stored, vec![bm]);
}

#[tokio::test]
async fn test_fallback_summary_still_names_the_page() {
    let (_, _, pipeline) = pipeline("Example Domain", None);
    let bm = pipeline.add_bookmark("u1", "https://example.com", None, None).await.unwrap();

    assert!(bm.summary.contains("Example Domain"));
    assert_eq!(bm.tags, "");
}

#[rstest]
#[case::timeout(Network::TimingOut)]
#[case::malformed_response(Network::Malformed)]
#[tokio::test]
async fn test_unreliable_network_still_stores_bookmark(#[case] network: Network) {
    let (db, pipeline) = composed_pipeline(network);

    let bm = pipeline
        .add_bookmark("u1", "https://www.example.com/article", Some("news"), None)
        .await
        .unwrap();

    assert_eq!(bm.title, "example.com");
    assert_eq!(bm.favicon, "https://www.example.com/favicon.ico");
    assert!(bm.summary.contains("example.com"));
    assert_eq!(bm.summary, unavailable_summary("example.com"));
    assert!(bm.summary.contains("This is a fallback summary."));

    let conn = db.connection();
    assert_eq!(BookmarkManager::new(&conn).get_by_id(&bm.id, "u1").unwrap(), bm);
}

#[tokio::test]
async fn test_blank_title_from_extractor_uses_hostname() {
    let (_, _, pipeline) = pipeline("   ", Some("s"));
    let bm = pipeline
        .add_bookmark("u1", "https://www.rust-lang.org/learn", None, None)
        .await
        .unwrap();
    assert_eq!(bm.title, "rust-lang.org");
}

#[tokio::test]
async fn test_input_url_is_trimmed_not_normalized() {
    let (_, _, pipeline) = pipeline("T", Some("s"));
    let bm = pipeline
        .add_bookmark("u1", "  https://Example.com/Path?q=1  ", None, None)
        .await
        .unwrap();
    assert_eq!(bm.url, "https://Example.com/Path?q=1");
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("example.com")]
#[case("ftp://example.com/file")]
#[case("javascript:alert(1)")]
#[case("https://")]
#[tokio::test]
async fn test_invalid_urls_fail_before_any_fetch(#[case] url: &str) {
    let (db, extractor, pipeline) = pipeline("T", Some("s"));

    let err = pipeline.add_bookmark("u1", url, None, None).await.unwrap_err();
    assert!(matches!(err, BookmarkError::Validation(_)), "{url}: {err:?}");
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);

    let conn = db.connection();
    assert!(BookmarkManager::new(&conn).list_for_user("u1").unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_category_fails_before_any_fetch() {
    let (_, extractor, pipeline) = pipeline("T", Some("s"));

    let err = pipeline
        .add_bookmark("u1", "https://example.com", None, Some("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, BookmarkError::CategoryNotFound(_)));
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_add_into_own_category() {
    let (db, _, pipeline) = pipeline("T", Some("s"));
    let cat = {
        let conn = db.connection();
        CategoryManager::new(&conn)
            .create("u1", NewCategory { name: "Work".into(), color: None, parent_id: None })
            .unwrap()
    };

    let bm = pipeline
        .add_bookmark("u1", "https://example.com", None, Some(&cat.id))
        .await
        .unwrap();
    assert_eq!(bm.category_id.as_deref(), Some(cat.id.as_str()));
    assert_eq!(bm.category.unwrap().name, "Work");
}

#[tokio::test]
async fn test_concurrent_adds_all_land() {
    let (db, _, pipeline) = pipeline("T", Some("s"));
    let pipeline = Arc::new(pipeline);

    let mut handles = Vec::new();
    for i in 0..8 {
        let p = pipeline.clone();
        handles.push(tokio::spawn(async move {
            p.add_bookmark("u1", &format!("https://site{i}.example"), None, None).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let conn = db.connection();
    assert_eq!(BookmarkManager::new(&conn).list_for_user("u1").unwrap().len(), 8);
}

#[test]
fn test_validate_url_accepts_http_and_https() {
    assert_eq!(validate_url("http://a.com").unwrap().host_str(), Some("a.com"));
    assert!(validate_url(" https://a.com/x ").is_ok());
}
