// linkmark services
// Services provide enrichment and wiring: HTTP access, metadata, summaries, ingestion, settings.

pub mod html_text;
pub mod http_client;
pub mod ingestion;
pub mod metadata_extractor;
pub mod settings_engine;
pub mod summarizer;
