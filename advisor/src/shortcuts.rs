use std::sync::Arc;

use crate::capability::{CapabilityError, GenerationParams, GenerativeCapability, PayloadTurn};
use crate::context::{ContextStore, ConversationKey, Role};
use crate::fallback;
use crate::types::{ShortcutRequest, ShortcutResponse};

const MAX_SHORTCUTS: usize = 6;

/// The model output must parse as a bare JSON string array; anything else is
/// treated as unusable and replaced by a curated set.
const SHORTCUT_INSTRUCTION: &str = "Return only a valid JSON array (no preface, no prose). Each item must be 2–5 words, concise, button-ready.";

const SHORTCUT_PARAMS: GenerationParams = GenerationParams {
    max_output_tokens: 80,
    temperature: 0.7,
    top_p: 0.9,
};

/// Produces small sets of suggested next turns from recent context.
///
/// Never fails and never returns an empty list: unusable or missing model
/// output degrades to keyword-matched curated sets.
pub struct ShortcutSynthesizer {
    capability: Arc<dyn GenerativeCapability>,
    store: Arc<ContextStore>,
}

impl ShortcutSynthesizer {
    pub fn new(capability: Arc<dyn GenerativeCapability>, store: Arc<ContextStore>) -> Self {
        Self { capability, store }
    }

    /// Suggest 1–6 short next turns. When `context` is blank, a snippet is
    /// rebuilt from the key's stored window.
    pub async fn suggest(&self, key: ConversationKey, context: &str) -> Vec<String> {
        let context = if context.trim().is_empty() {
            self.context_from_window(&key)
        } else {
            context.to_string()
        };

        match self.generate(&context).await {
            Ok(shortcuts) if !shortcuts.is_empty() => shortcuts,
            Ok(_) => {
                tracing::warn!(user_id = %key.user_id, "model returned no usable shortcuts, serving curated set");
                fallback::shortcuts_for_context(&context)
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %key.user_id,
                    error = %err,
                    "shortcut generation failed, serving curated set"
                );
                fallback::shortcuts_for_context(&context)
            }
        }
    }

    /// DTO adapter for transport-layer callers.
    pub async fn respond(&self, request: ShortcutRequest) -> ShortcutResponse {
        let key = ConversationKey::new(request.user_id, request.conversation_id);
        let context = request.context.unwrap_or_default();
        ShortcutResponse {
            shortcuts: self.suggest(key, &context).await,
        }
    }

    async fn generate(&self, context: &str) -> Result<Vec<String>, CapabilityError> {
        let context_block = if context.is_empty() { "(none)" } else { context };
        let prompt = format!(
            "Context:\n{context_block}\n\nTask:\nGenerate 4–6 relevant, actionable quick suggestions for an Indian personal finance chat.\nKeep each suggestion 2–5 words, concise, and specific.\nReturn JSON array ONLY, e.g. [\"Mutual funds guide\",\"PPF vs ELSS\"]."
        );
        let payload = [PayloadTurn {
            role: Role::User,
            text: prompt,
        }];
        let raw = self
            .capability
            .generate(SHORTCUT_INSTRUCTION, &payload, &SHORTCUT_PARAMS)
            .await?;
        Ok(parse_shortcuts(&raw))
    }

    fn context_from_window(&self, key: &ConversationKey) -> String {
        self.store
            .get(key)
            .iter()
            .map(|turn| {
                let label = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                format!("{label}: {}", turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse the model reply as a JSON string array, tolerating a markdown code
/// fence around it. Non-string entries and blanks are dropped; output is
/// capped. Unparseable input yields an empty list (the caller substitutes a
/// curated set).
fn parse_shortcuts(raw: &str) -> Vec<String> {
    let text = strip_code_fence(raw.trim());
    let items = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Array(items)) => items,
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .take(MAX_SHORTCUTS)
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::{ShortcutSynthesizer, parse_shortcuts};
    use crate::capability::{
        CapabilityError, GenerationParams, GenerativeCapability, PayloadTurn,
    };
    use crate::context::{ContextStore, ConversationKey, Turn};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    struct StubCapability {
        reply: Result<String, ()>,
        last_prompt: Mutex<Option<String>>,
    }

    impl StubCapability {
        fn answering(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                last_prompt: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                last_prompt: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl GenerativeCapability for StubCapability {
        async fn generate(
            &self,
            _instruction: &str,
            payload: &[PayloadTurn],
            _params: &GenerationParams,
        ) -> Result<String, CapabilityError> {
            *self.last_prompt.lock().unwrap() = payload.first().map(|turn| turn.text.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(CapabilityError::Transport("connection reset".to_string())),
            }
        }
    }

    fn synthesizer(capability: Arc<StubCapability>) -> (ShortcutSynthesizer, Arc<ContextStore>) {
        let store = Arc::new(ContextStore::with_default_cap());
        (
            ShortcutSynthesizer::new(capability, store.clone()),
            store,
        )
    }

    fn key() -> ConversationKey {
        ConversationKey::new(Uuid::now_v7(), Some(Uuid::now_v7()))
    }

    #[test]
    fn parse_accepts_a_bare_json_array() {
        let parsed = parse_shortcuts(r#"["Mutual funds guide","PPF vs ELSS"]"#);
        assert_eq!(parsed, ["Mutual funds guide", "PPF vs ELSS"]);
    }

    #[test]
    fn parse_strips_markdown_code_fences() {
        let parsed = parse_shortcuts("```json\n[\"SIP planning\"]\n```");
        assert_eq!(parsed, ["SIP planning"]);
        let parsed = parse_shortcuts("```\n[\"SIP planning\"]\n```");
        assert_eq!(parsed, ["SIP planning"]);
    }

    #[test]
    fn parse_rejects_non_array_output() {
        assert!(parse_shortcuts("Here are some suggestions: budgeting").is_empty());
        assert!(parse_shortcuts(r#"{"shortcuts":["a"]}"#).is_empty());
        assert!(parse_shortcuts("").is_empty());
    }

    #[test]
    fn parse_drops_blanks_and_non_strings_and_caps_at_six() {
        let parsed = parse_shortcuts(r#"["a", "", "  ", 42, "b", "c", "d", "e", "f", "g"]"#);
        assert_eq!(parsed, ["a", "b", "c", "d", "e", "f"]);
    }

    #[tokio::test]
    async fn usable_model_output_is_returned_as_is() {
        let capability = StubCapability::answering(r#"["Gold bonds intro","NPS basics"]"#);
        let (synthesizer, _) = synthesizer(capability);

        let shortcuts = synthesizer.suggest(key(), "retirement").await;
        assert_eq!(shortcuts, ["Gold bonds intro", "NPS basics"]);
    }

    #[tokio::test]
    async fn unparseable_output_falls_back_to_keyword_sets() {
        let capability = StubCapability::answering("Sure! Here are some ideas you may like");
        let (synthesizer, _) = synthesizer(capability);

        let shortcuts = synthesizer
            .suggest(key(), "I want to know about home loans")
            .await;
        assert!(!shortcuts.is_empty());
        assert!(shortcuts.len() <= 6);
        assert!(shortcuts.iter().any(|s| s.to_lowercase().contains("loan")));
    }

    #[tokio::test]
    async fn capability_failure_falls_back_without_raising() {
        let (synthesizer, _) = synthesizer(StubCapability::failing());

        let shortcuts = synthesizer.suggest(key(), "").await;
        assert!(!shortcuts.is_empty());
    }

    #[tokio::test]
    async fn empty_array_from_the_model_is_not_served() {
        let (synthesizer, _) = synthesizer(StubCapability::answering("[]"));

        let shortcuts = synthesizer.suggest(key(), "anything").await;
        assert!(!shortcuts.is_empty());
    }

    #[tokio::test]
    async fn blank_context_is_rebuilt_from_the_stored_window() {
        let capability = StubCapability::answering("not json");
        let (synthesizer, store) = synthesizer(capability.clone());
        let key = key();
        store.append(
            key,
            [
                Turn::user("should I invest in ELSS?"),
                Turn::assistant("Tell me your horizon first."),
            ],
        );

        let shortcuts = synthesizer.suggest(key, "   ").await;

        // The rebuilt snippet reached the model...
        let prompt = capability.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("user: should I invest in ELSS?"));
        assert!(prompt.contains("assistant: Tell me your horizon first."));
        // ...and also drove the keyword fallback.
        assert!(shortcuts.iter().any(|s| s.contains("SIP")));
    }

    #[tokio::test]
    async fn respond_wraps_the_suggestion_list() {
        let (synthesizer, _) = synthesizer(StubCapability::answering(r#"["Budget review"]"#));
        let response = synthesizer
            .respond(crate::types::ShortcutRequest {
                user_id: Uuid::now_v7(),
                conversation_id: None,
                context: Some("monthly spend".to_string()),
            })
            .await;
        assert_eq!(response.shortcuts, ["Budget review"]);
    }
}
