use async_trait::async_trait;
use thiserror::Error;

use crate::context::{Role, Turn};

/// One entry in the ordered payload sent to the generative model. Role
/// fidelity is preserved across the boundary; the transport maps roles onto
/// whatever names the underlying API uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadTurn {
    pub role: Role,
    pub text: String,
}

impl From<&Turn> for PayloadTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            text: turn.text.clone(),
        }
    }
}

/// Sampling and length limits for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Upstream generation failure. The core converts every variant into a
/// degraded result or a curated fallback list — none of them cross the
/// public contract boundary.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("generation call timed out")]
    Timeout,
    #[error("upstream returned status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unusable model output: {0}")]
    MalformedOutput(String),
}

/// Black-box generative text capability: given a system instruction, a
/// bounded ordered history, and sampling parameters, produce text.
///
/// Implementations must not retry internally on behalf of the core; retry
/// policy belongs to the transport layer above it.
#[async_trait]
pub trait GenerativeCapability: Send + Sync {
    async fn generate(
        &self,
        instruction: &str,
        payload: &[PayloadTurn],
        params: &GenerationParams,
    ) -> Result<String, CapabilityError>;
}
