//! reqwest-backed `GenerativeCapability` for the SachivJi advisor core,
//! calling the Google Generative Language `generateContent` endpoint.
//!
//! The client maps every transport, status, and shape problem onto the
//! core's `CapabilityError` taxonomy; the core turns those into degraded
//! results. No retries here — that belongs to whoever wraps this client.

mod config;
mod wire;

pub use config::{ConfigError, GeminiConfig};

use async_trait::async_trait;
use sachiv_advisor::{CapabilityError, GenerationParams, GenerativeCapability, PayloadTurn};

const STATUS_MESSAGE_MAX_CHARS: usize = 512;

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeCapability for GeminiClient {
    async fn generate(
        &self,
        instruction: &str,
        payload: &[PayloadTurn],
        params: &GenerationParams,
    ) -> Result<String, CapabilityError> {
        let body = wire::GenerateContentRequest::build(instruction, payload, params);
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                model = %self.config.model,
                status = %status,
                "generateContent returned non-success status"
            );
            return Err(CapabilityError::Status {
                code: status.as_u16(),
                message: truncate_chars(&message, STATUS_MESSAGE_MAX_CHARS),
            });
        }

        let parsed: wire::GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| CapabilityError::MalformedOutput(err.to_string()))?;
        parsed.text()
    }
}

fn map_send_error(err: reqwest::Error) -> CapabilityError {
    if err.is_timeout() {
        CapabilityError::Timeout
    } else {
        CapabilityError::Transport(err.to_string())
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::{GeminiClient, GeminiConfig, truncate_chars};

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let mut config = GeminiConfig::new("secret");
        config.base_url = "https://example.test/v1beta/".to_string();
        let client = GeminiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("₹₹₹₹", 2), "₹₹");
        assert_eq!(truncate_chars("short", 512), "short");
    }
}
