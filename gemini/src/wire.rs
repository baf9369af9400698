//! Request/response shapes for the `generateContent` REST endpoint, plus
//! the role and error mapping between the core and the API.

use sachiv_advisor::{CapabilityError, GenerationParams, PayloadTurn, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// The API names the assistant role "model"; user stays "user".
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

impl GenerateContentRequest {
    pub(crate) fn build(
        instruction: &str,
        payload: &[PayloadTurn],
        params: &GenerationParams,
    ) -> Self {
        let contents = payload
            .iter()
            .map(|turn| Content {
                role: Some(wire_role(turn.role).to_string()),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: instruction.to_string(),
                }],
            },
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: params.max_output_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts. A response with no
    /// candidates or no text is malformed output, not an empty success.
    pub(crate) fn text(self) -> Result<String, CapabilityError> {
        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            CapabilityError::MalformedOutput("response contained no candidates".to_string())
        })?;
        let parts = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default();
        let text: String = parts.into_iter().map(|part| part.text).collect();
        if text.trim().is_empty() {
            return Err(CapabilityError::MalformedOutput(
                "candidate contained no text parts".to_string(),
            ));
        }
        Ok(text)
    }
}
