use std::time::Duration;

use thiserror::Error;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const MODEL_ENV: &str = "GEMINI_MODEL";
const BASE_URL_ENV: &str = "GEMINI_BASE_URL";
const TIMEOUT_SECS_ENV: &str = "GEMINI_TIMEOUT_SECS";

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const TIMEOUT_SECS_MIN: u64 = 1;
const TIMEOUT_SECS_MAX: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY must be configured")]
    MissingApiKey,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Connection settings for the Generative Language API. `base_url` is
/// overridable so tests and proxies can point the client elsewhere.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load from process env; a `.env` file is honored when present. A
    /// missing or blank API key is a configuration error here, not a
    /// runtime failure later.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(model) = non_empty_env(MODEL_ENV) {
            config.model = model;
        }
        if let Some(base_url) = non_empty_env(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(secs) = non_empty_env(TIMEOUT_SECS_ENV).and_then(|v| v.parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs.clamp(TIMEOUT_SECS_MIN, TIMEOUT_SECS_MAX));
        }
        Ok(config)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
