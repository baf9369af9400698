use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::time::timeout;

use crate::capability::{CapabilityError, GenerativeCapability, PayloadTurn};
use crate::context::{ContextStore, ConversationKey, Role, Turn};
use crate::fallback;
use crate::mode::{Mode, classify};
use crate::profile::ModeProfile;
use crate::types::{ChatRequest, ChatResponse};

const DEFAULT_PAYLOAD_TURNS: usize = 6;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const HISTORY_TURNS_ENV: &str = "ADVISOR_HISTORY_TURNS";
const PAYLOAD_TURNS_ENV: &str = "ADVISOR_PAYLOAD_TURNS";
const REQUEST_TIMEOUT_SECS_ENV: &str = "ADVISOR_REQUEST_TIMEOUT_SECS";

const HISTORY_TURNS_MIN: usize = 2;
const HISTORY_TURNS_MAX: usize = 200;
const PAYLOAD_TURNS_MIN: usize = 2;
const PAYLOAD_TURNS_MAX: usize = 50;
const REQUEST_TIMEOUT_SECS_MIN: u64 = 1;
const REQUEST_TIMEOUT_SECS_MAX: u64 = 300;

/// Tunables for one advisor service instance.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Max turns retained per conversation window.
    pub history_cap: usize,
    /// Max prior turns included in one model payload.
    pub payload_turns: usize,
    /// Upper bound on one capability call; elapsing counts as failure.
    pub request_timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            history_cap: crate::context::DEFAULT_HISTORY_TURNS,
            payload_turns: DEFAULT_PAYLOAD_TURNS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AdvisorConfig {
    /// Load from process env. Out-of-range values are clamped to safe
    /// bounds; unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            history_cap: clamped_usize(
                std::env::var(HISTORY_TURNS_ENV).ok().as_deref(),
                defaults.history_cap,
                HISTORY_TURNS_MIN,
                HISTORY_TURNS_MAX,
            ),
            payload_turns: clamped_usize(
                std::env::var(PAYLOAD_TURNS_ENV).ok().as_deref(),
                defaults.payload_turns,
                PAYLOAD_TURNS_MIN,
                PAYLOAD_TURNS_MAX,
            ),
            request_timeout: Duration::from_secs(clamped_u64(
                std::env::var(REQUEST_TIMEOUT_SECS_ENV).ok().as_deref(),
                DEFAULT_REQUEST_TIMEOUT_SECS,
                REQUEST_TIMEOUT_SECS_MIN,
                REQUEST_TIMEOUT_SECS_MAX,
            )),
        }
    }
}

fn clamped_usize(raw: Option<&str>, default: usize, min: usize, max: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .map(|value| value.clamp(min, max))
        .unwrap_or(default)
}

fn clamped_u64(raw: Option<&str>, default: u64, min: u64, max: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .map(|value| value.clamp(min, max))
        .unwrap_or(default)
}

/// Outcome of one advisor turn.
///
/// `degraded = true` marks a canned fallback substituted for a failed
/// upstream call. Callers still persist and display it, flagged as
/// reduced-confidence advice.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorResult {
    pub ok: bool,
    pub text: String,
    pub mode: Mode,
    pub degraded: bool,
}

/// Orchestrates one chat turn: mode resolution, bounded context assembly,
/// the generation call, and the context update.
///
/// Upstream failure is never fatal — every turn produces a result. No retry
/// lives at this layer.
pub struct AdvisorSession {
    capability: Arc<dyn GenerativeCapability>,
    store: Arc<ContextStore>,
    config: AdvisorConfig,
    rng: Mutex<StdRng>,
}

impl AdvisorSession {
    pub fn new(
        capability: Arc<dyn GenerativeCapability>,
        store: Arc<ContextStore>,
        config: AdvisorConfig,
    ) -> Self {
        Self {
            capability,
            store,
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Convenience constructor wiring a fresh store sized by the config's
    /// history cap. Use `new` to share one store with a
    /// `ShortcutSynthesizer`.
    pub fn with_fresh_store(
        capability: Arc<dyn GenerativeCapability>,
        config: AdvisorConfig,
    ) -> Self {
        let store = Arc::new(ContextStore::new(config.history_cap));
        Self::new(capability, store, config)
    }

    /// Seed the fallback selector for deterministic rotation in tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    /// Run one turn for `key`. When `mode` is `None` the classifier decides.
    pub async fn converse(
        &self,
        key: ConversationKey,
        mode: Option<Mode>,
        utterance: &str,
    ) -> AdvisorResult {
        let mode = mode.unwrap_or_else(|| classify(utterance));
        let profile = ModeProfile::resolve(mode);
        tracing::debug!(user_id = %key.user_id, ?mode, "advisor turn");

        let payload = self.build_payload(&key, utterance);
        let params = profile.generation_params();
        let call = self
            .capability
            .generate(&profile.instruction, &payload, &params);
        let outcome = match timeout(self.config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout),
        };

        match outcome {
            Ok(text) => {
                self.store
                    .append(key, [Turn::user(utterance), Turn::assistant(text.clone())]);
                AdvisorResult {
                    ok: true,
                    text,
                    mode,
                    degraded: false,
                }
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %key.user_id,
                    error = %err,
                    "generation failed, serving fallback reply"
                );
                // The utterance was still said; keep it so the next turn's
                // payload reflects the conversation the user sees.
                self.store.append(key, [Turn::user(utterance)]);
                AdvisorResult {
                    ok: false,
                    text: self.fallback_reply(),
                    mode,
                    degraded: true,
                }
            }
        }
    }

    /// DTO adapter for transport-layer callers.
    pub async fn respond(&self, request: ChatRequest) -> ChatResponse {
        let key = ConversationKey::new(request.user_id, request.conversation_id);
        let message = request.message.trim();
        let result = self.converse(key, request.mode, message).await;
        ChatResponse {
            conversation_id: request.conversation_id,
            user_text: message.to_string(),
            assistant_text: result.text,
            mode: result.mode,
            is_error: result.degraded,
        }
    }

    /// Drop the in-memory window when the caller deletes or resets a
    /// conversation. Idempotent.
    pub fn clear(&self, key: &ConversationKey) {
        self.store.clear(key);
    }

    /// Ordered prior turns (clipped to the payload window) plus the new
    /// user utterance, roles preserved.
    fn build_payload(&self, key: &ConversationKey, utterance: &str) -> Vec<PayloadTurn> {
        let history = self.store.get(key);
        let start = history.len().saturating_sub(self.config.payload_turns);
        let mut payload: Vec<PayloadTurn> = history[start..].iter().map(PayloadTurn::from).collect();
        payload.push(PayloadTurn {
            role: Role::User,
            text: utterance.to_string(),
        });
        payload
    }

    fn fallback_reply(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        fallback::advisor_reply(&mut *rng)
    }
}
