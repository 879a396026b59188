use serde::{Deserialize, Serialize};

/// User agent sent on page fetches; some sites refuse non-browser clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_SUMMARY_BASE_URL: &str = "https://api.jina.ai/v1";
pub const DEFAULT_SUMMARY_MODEL: &str = "jina-chat";

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub database_path: String,
    pub fetch: FetchSettings,
    pub summarizer: SummarizerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: "linkmark.db".to_string(),
            fetch: FetchSettings::default(),
            summarizer: SummarizerSettings::default(),
        }
    }
}

/// Outbound page fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    /// Budget for the title fetch.
    pub title_timeout_secs: u64,
    /// Budget for the page fetch feeding the summarizer.
    pub page_timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            title_timeout_secs: 5,
            page_timeout_secs: 10,
        }
    }
}

/// Text-generation endpoint settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizerSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Characters of page text sent to the model.
    pub max_content_chars: usize,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SUMMARY_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_SUMMARY_MODEL.to_string(),
            max_tokens: 200,
            temperature: 0.7,
            timeout_secs: 15,
            max_content_chars: 2000,
        }
    }
}
