//! Summarizer for linkmark.
//!
//! Produces a short summary of a bookmarked page by sending its visible text
//! to an OpenAI-compatible chat completions endpoint. Any failure degrades to
//! a placeholder that still names the page, so a bookmark never ends up with a
//! blank summary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::services::html_text;
use crate::services::http_client::HttpClientTrait;
use crate::types::enrichment::Enrichment;
use crate::types::settings::{FetchSettings, SummarizerSettings};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that creates concise, informative summaries of web content. Focus on the main points and key information.";

/// Placeholder used when the service answered without any summary text.
pub fn empty_response_summary(title: &str) -> String {
    format!("Summary for: {title}\n\nUnable to generate AI summary at this time.")
}

/// Placeholder used when the page or the service could not be reached.
pub fn unavailable_summary(title: &str) -> String {
    format!("Summary for: {title}\n\nThis is a fallback summary. The AI summary service is currently unavailable.")
}

/// Trait defining summary generation.
#[async_trait]
pub trait SummarizerTrait: Send + Sync {
    /// Model summary, or a fallback containing `title`. Never fails.
    async fn generate_summary(&self, url: &str, title: &str) -> String;
}

/// Summarizer backed by an injectable HTTP client.
pub struct Summarizer {
    http: Arc<dyn HttpClientTrait>,
    page_timeout: Duration,
    settings: SummarizerSettings,
}

impl Summarizer {
    pub fn new(http: Arc<dyn HttpClientTrait>, fetch: &FetchSettings, settings: SummarizerSettings) -> Self {
        Self {
            http,
            page_timeout: Duration::from_secs(fetch.page_timeout_secs),
            settings,
        }
    }

    /// Full chat completions URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    /// Request body for one summary.
    pub fn build_request(&self, title: &str, content: &str) -> Value {
        json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "Please provide a brief summary of this webpage content:\n\nTitle: {title}\n\nContent: {content}"
                    )
                }
            ],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
        })
    }

    /// `choices[0].message.content` when it holds non-blank text.
    ///
    /// A body without a `choices` array is not a completion at all and yields
    /// `Err`; an empty array or a blank message yields `Ok(None)`.
    pub fn response_content(response: &Value) -> Result<Option<&str>, &'static str> {
        let choices = response
            .get("choices")
            .and_then(Value::as_array)
            .ok_or("completion response has no choices")?;
        Ok(choices
            .first()
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty()))
    }

    /// Runs fetch → extract → complete, reporting whether a fallback was used.
    pub async fn summarize(&self, url: &str, title: &str) -> Enrichment<String> {
        let html = match self.http.get_text(url, self.page_timeout).await {
            Ok(html) => html,
            Err(e) => return Enrichment::degraded(unavailable_summary(title), format!("page fetch failed: {e}")),
        };

        let content = html_text::visible_text(&html, self.settings.max_content_chars);
        debug!(url, content_chars = content.chars().count(), "requesting summary");

        let body = self.build_request(title, &content);
        let response = match self
            .http
            .post_json(
                &self.endpoint(),
                self.settings.api_key.as_deref(),
                &body,
                Duration::from_secs(self.settings.timeout_secs),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => return Enrichment::degraded(unavailable_summary(title), format!("completion failed: {e}")),
        };

        match Self::response_content(&response) {
            Ok(Some(summary)) => Enrichment::Ok(summary.to_string()),
            Ok(None) => Enrichment::degraded(empty_response_summary(title), "completion had no content"),
            Err(reason) => Enrichment::degraded(unavailable_summary(title), reason),
        }
    }
}

#[async_trait]
impl SummarizerTrait for Summarizer {
    async fn generate_summary(&self, url: &str, title: &str) -> String {
        let result = self.summarize(url, title).await;
        if let Some(reason) = result.reason() {
            warn!(url, reason, "summary generation degraded to fallback");
        }
        result.into_value()
    }
}
