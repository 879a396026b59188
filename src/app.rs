//! App Core for linkmark.
//!
//! Central struct holding the database and the ingestion pipeline.

use std::sync::Arc;

use tracing::info;

use crate::database::connection::Database;
use crate::services::http_client::{HttpClientTrait, ReqwestHttpClient};
use crate::services::ingestion::IngestionPipeline;
use crate::services::metadata_extractor::{MetadataExtractor, MetadataExtractorTrait};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::summarizer::{Summarizer, SummarizerTrait};
use crate::types::errors::AppError;
use crate::types::settings::Settings;

/// Central application struct.
///
/// Bookmark and category managers are created on demand from a locked
/// connection because they borrow it with a lifetime.
pub struct App {
    pub db: Arc<Database>,
    pub pipeline: IngestionPipeline,
}

impl App {
    /// Opens the configured database and wires real HTTP-backed collaborators.
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let db = Arc::new(Database::open(&settings.database_path)?);
        let http: Arc<dyn HttpClientTrait> = Arc::new(
            ReqwestHttpClient::new(&settings.fetch.user_agent)
                .map_err(|e| AppError::HttpClient(e.to_string()))?,
        );
        let extractor = Arc::new(MetadataExtractor::new(http.clone(), &settings.fetch));
        let summarizer = Arc::new(Summarizer::new(http, &settings.fetch, settings.summarizer.clone()));

        info!(
            database = %settings.database_path,
            summary_endpoint = %settings.summarizer.base_url,
            summary_model = %settings.summarizer.model,
            "linkmark initialized"
        );
        Ok(Self::with_collaborators(db, extractor, summarizer))
    }

    /// Loads settings (file + environment) and builds the app from them.
    pub fn from_config(path_override: Option<String>) -> Result<Self, AppError> {
        let mut engine = SettingsEngine::new(path_override);
        let settings = engine.load()?;
        Self::new(&settings)
    }

    /// Builds an app around an existing database and enrichment collaborators.
    pub fn with_collaborators(
        db: Arc<Database>,
        extractor: Arc<dyn MetadataExtractorTrait>,
        summarizer: Arc<dyn SummarizerTrait>,
    ) -> Self {
        let pipeline = IngestionPipeline::new(db.clone(), extractor, summarizer);
        Self { db, pipeline }
    }
}
