//! Caller-facing request and response shapes. The HTTP layer owns
//! validation, conversation ownership checks, and persistence; the core
//! trusts the key it is handed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mode::Mode;

/// Inbound chat turn as the transport layer hands it to the core.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    pub message: String,
    /// Explicit mode override; when absent the classifier decides.
    #[serde(default)]
    pub mode: Option<Mode>,
}

/// Structured turn outcome for the caller to persist and render.
///
/// `is_error` mirrors the degraded flag: the reply is still a normal chat
/// message, but the presentation layer must visually mark reduced
/// confidence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
    pub user_text: String,
    pub assistant_text: String,
    pub mode: Mode,
    pub is_error: bool,
}

/// Shortcut suggestion request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    /// Recent-context snippet; when absent the core rebuilds one from its
    /// in-memory window for the key.
    #[serde(default)]
    pub context: Option<String>,
}

/// 1–6 short, button-ready suggestion strings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutResponse {
    pub shortcuts: Vec<String>,
}
