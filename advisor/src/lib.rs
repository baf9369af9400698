//! Conversational core for the SachivJi financial advisor.
//!
//! Sits between the HTTP chat layer and the external generative model:
//! resolves whether a turn is a short clarifying probe or a full deliverable,
//! keeps a bounded in-memory context window per conversation, and degrades to
//! canned output when the upstream capability fails. Persistence of messages
//! stays with the caller — this crate only hands back structured results.

pub mod capability;
pub mod context;
pub mod fallback;
pub mod mode;
pub mod profile;
pub mod session;
pub mod shortcuts;
pub mod types;

pub use capability::{CapabilityError, GenerationParams, GenerativeCapability, PayloadTurn};
pub use context::{ContextStore, ConversationKey, Role, Turn};
pub use mode::{Mode, classify};
pub use profile::ModeProfile;
pub use session::{AdvisorConfig, AdvisorResult, AdvisorSession};
pub use shortcuts::ShortcutSynthesizer;
pub use types::{ChatRequest, ChatResponse, ShortcutRequest, ShortcutResponse};
