// linkmark Settings Engine
// Loads application settings from a JSON file and layers environment overrides on top.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::types::errors::SettingsError;
use crate::types::settings::Settings;

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "LINKMARK_CONFIG";
pub const ENV_DB_PATH: &str = "LINKMARK_DB_PATH";
pub const ENV_SUMMARY_URL: &str = "LINKMARK_SUMMARY_URL";
pub const ENV_SUMMARY_API_KEY: &str = "LINKMARK_SUMMARY_API_KEY";
pub const ENV_SUMMARY_MODEL: &str = "LINKMARK_SUMMARY_MODEL";

const DEFAULT_CONFIG_FILE: &str = "linkmark.json";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<Settings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &Settings;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: Settings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise uses `$LINKMARK_CONFIG`, falling back to `linkmark.json`
    /// in the working directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override
            .or_else(|| std::env::var(ENV_CONFIG_PATH).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        Self {
            config_path,
            settings: Settings::default(),
        }
    }

    /// Overrides settings from environment-style lookups.
    ///
    /// Takes the lookup as a function so callers (and tests) are not tied to
    /// the process environment.
    pub fn apply_overrides<F>(settings: &mut Settings, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH) {
            settings.database_path = path;
        }
        if let Some(url) = lookup(ENV_SUMMARY_URL) {
            settings.summarizer.base_url = url;
        }
        if let Some(key) = lookup(ENV_SUMMARY_API_KEY) {
            settings.summarizer.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(model) = lookup(ENV_SUMMARY_MODEL) {
            settings.summarizer.model = model;
        }
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(settings: &Settings) -> Result<(), SettingsError> {
        let invalid = |key: &str, reason: &str| SettingsError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if settings.fetch.title_timeout_secs == 0 {
            return Err(invalid("fetch.title_timeout_secs", "must be at least 1"));
        }
        if settings.fetch.page_timeout_secs == 0 {
            return Err(invalid("fetch.page_timeout_secs", "must be at least 1"));
        }
        if settings.summarizer.timeout_secs == 0 {
            return Err(invalid("summarizer.timeout_secs", "must be at least 1"));
        }
        if !(0.0..=2.0).contains(&settings.summarizer.temperature) {
            return Err(invalid("summarizer.temperature", "must be between 0.0 and 2.0"));
        }
        if settings.summarizer.max_content_chars == 0 {
            return Err(invalid("summarizer.max_content_chars", "must be at least 1"));
        }
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file, then applies environment overrides.
    ///
    /// If the file does not exist, starts from defaults.
    /// If the file exists but is malformed, returns a serialization error.
    fn load(&mut self) -> Result<Settings, SettingsError> {
        let path = Path::new(&self.config_path);

        let mut settings = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
            serde_json::from_str(&content).map_err(|e| {
                SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
            })?
        } else {
            debug!(path = %self.config_path, "no config file, using defaults");
            Settings::default()
        };

        Self::apply_overrides(&mut settings, |key| std::env::var(key).ok());
        Self::validate(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::IoError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Returns a reference to the current in-memory settings.
    fn get_settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the path to the config file.
    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
