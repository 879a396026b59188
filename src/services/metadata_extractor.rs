//! Metadata Extractor for linkmark.
//!
//! Derives a display title and a favicon URL for a bookmarked page. Title
//! extraction fetches the page; favicon derivation is pure. Neither ever fails:
//! every failure path resolves to a deterministic fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use url::Url;

use crate::services::html_text;
use crate::services::http_client::HttpClientTrait;
use crate::types::enrichment::Enrichment;
use crate::types::settings::FetchSettings;

/// Title used when not even a hostname can be recovered from the URL.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Trait defining metadata extraction operations.
#[async_trait]
pub trait MetadataExtractorTrait: Send + Sync {
    /// Page title, or a hostname/literal fallback. Never empty.
    async fn extract_title(&self, url: &str) -> String;
    /// `{scheme}://{host}/favicon.ico`, or `""` if the URL does not parse.
    fn extract_favicon(&self, url: &str) -> String;
}

/// Metadata extractor backed by an injectable HTTP client.
pub struct MetadataExtractor {
    http: Arc<dyn HttpClientTrait>,
    timeout: Duration,
}

impl MetadataExtractor {
    pub fn new(http: Arc<dyn HttpClientTrait>, settings: &FetchSettings) -> Self {
        Self {
            http,
            timeout: Duration::from_secs(settings.title_timeout_secs),
        }
    }

    /// Fetches the page and reads its `<title>`, reporting whether a fallback was used.
    pub async fn fetch_title(&self, url: &str) -> Enrichment<String> {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => return Enrichment::degraded(UNKNOWN_TITLE.to_string(), format!("unparseable url: {e}")),
        };

        match self.http.get_text(url, self.timeout).await {
            Ok(html) => match html_text::extract_title(&html) {
                Some(title) => Enrichment::Ok(title),
                None => Enrichment::degraded(hostname_title(&parsed), "page has no <title>"),
            },
            Err(e) => Enrichment::degraded(hostname_title(&parsed), e.to_string()),
        }
    }
}

/// Hostname with a leading `www.` removed, or [`UNKNOWN_TITLE`] for host-less URLs.
pub fn hostname_title(url: &Url) -> String {
    match url.host_str() {
        Some(host) if !host.is_empty() => host.strip_prefix("www.").unwrap_or(host).to_string(),
        _ => UNKNOWN_TITLE.to_string(),
    }
}

/// Conventional favicon location for the URL's origin. No network access.
pub fn favicon_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => format!("{}://{}/favicon.ico", parsed.scheme(), host),
            _ => String::new(),
        },
        Err(_) => String::new(),
    }
}

#[async_trait]
impl MetadataExtractorTrait for MetadataExtractor {
    async fn extract_title(&self, url: &str) -> String {
        let result = self.fetch_title(url).await;
        if let Some(reason) = result.reason() {
            warn!(url, reason, "title extraction degraded to fallback");
        }
        result.into_value()
    }

    fn extract_favicon(&self, url: &str) -> String {
        favicon_url(url)
    }
}
