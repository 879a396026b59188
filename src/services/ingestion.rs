//! Ingestion pipeline for linkmark.
//!
//! Turns a raw URL into a stored, enriched bookmark:
//! validate → title → favicon → summary → insert.
//!
//! Title and summary come from collaborators that always resolve to a string,
//! so the only hard failures are validation (before any network I/O) and the
//! final database write.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use url::Url;

use crate::database::Database;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::services::metadata_extractor::{hostname_title, MetadataExtractorTrait};
use crate::services::summarizer::SummarizerTrait;
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::errors::BookmarkError;

/// Composes metadata extraction, summarization and the bookmark store.
///
/// Holds no per-request state; concurrent `add_bookmark` calls proceed
/// independently and only serialize on the final insert.
pub struct IngestionPipeline {
    db: Arc<Database>,
    extractor: Arc<dyn MetadataExtractorTrait>,
    summarizer: Arc<dyn SummarizerTrait>,
}

/// Parses `raw` as an absolute `http`/`https` URL with a host.
pub fn validate_url(raw: &str) -> Result<Url, BookmarkError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BookmarkError::Validation("URL is required".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| BookmarkError::Validation(format!("invalid url '{trimmed}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BookmarkError::Validation(format!(
            "invalid url '{trimmed}': must start with http:// or https://"
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(BookmarkError::Validation(format!("invalid url '{trimmed}': missing host")));
    }
    Ok(url)
}

impl IngestionPipeline {
    pub fn new(
        db: Arc<Database>,
        extractor: Arc<dyn MetadataExtractorTrait>,
        summarizer: Arc<dyn SummarizerTrait>,
    ) -> Self {
        Self {
            db,
            extractor,
            summarizer,
        }
    }

    /// Adds a bookmark for `user_id`.
    ///
    /// # Errors
    /// `Validation` for a missing or malformed URL, `CategoryNotFound` when
    /// `category_id` is not visible to the user, `DatabaseError` if the insert
    /// fails. Fetch and summarization failures never surface here.
    pub async fn add_bookmark(
        &self,
        user_id: &str,
        url: &str,
        tags: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<Bookmark, BookmarkError> {
        let started = Instant::now();
        let parsed = validate_url(url)?;
        let url = url.trim();
        let category_id = category_id.map(str::trim).filter(|c| !c.is_empty());

        if let Some(cid) = category_id {
            let conn = self.db.connection();
            BookmarkManager::new(&conn).ensure_category_visible(cid, user_id)?;
        }

        let mut title = self.extractor.extract_title(url).await;
        if title.trim().is_empty() {
            title = hostname_title(&parsed);
        }
        let favicon = self.extractor.extract_favicon(url);
        let summary = self.summarizer.generate_summary(url, &title).await;

        let input = NewBookmark {
            url: url.to_string(),
            title,
            favicon,
            summary,
            tags: tags.unwrap_or_default().to_string(),
            category_id: category_id.map(str::to_string),
        };

        let bookmark = {
            let conn = self.db.connection();
            BookmarkManager::new(&conn).create(user_id, input)?
        };

        info!(
            user_id,
            bookmark_id = %bookmark.id,
            url = %bookmark.url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "bookmark ingested"
        );
        Ok(bookmark)
    }
}
