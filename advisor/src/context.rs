use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation. Immutable once created; owned by the
/// context window that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Identity scoping in-memory context to one user's one conversation.
///
/// `conversation_id = None` is the per-user default slot, used before the
/// caller has a persisted conversation row. The key itself is never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub user_id: Uuid,
    pub conversation_id: Option<Uuid>,
}

impl ConversationKey {
    pub fn new(user_id: Uuid, conversation_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            conversation_id,
        }
    }
}

/// Default retained turns per window (5 exchanges).
pub const DEFAULT_HISTORY_TURNS: usize = 10;

/// Process-lifetime rolling history of recent turns per conversation.
///
/// This is a prompting cache, not a durable store — the messages table is
/// owned by the caller. Windows are created lazily on first append, capped
/// FIFO at `cap` turns, and live until `clear`; there is no TTL. Turns stay
/// chronologically ordered and duplicates are kept as separate entries.
///
/// Backed by a sharded map, so appends on different keys never contend on a
/// single lock; the entry guard is held across a whole append, which makes
/// each append atomic for its key.
#[derive(Debug)]
pub struct ContextStore {
    windows: DashMap<ConversationKey, Vec<Turn>>,
    cap: usize,
}

impl ContextStore {
    pub fn new(cap: usize) -> Self {
        Self {
            windows: DashMap::new(),
            cap: cap.max(1),
        }
    }

    pub fn with_default_cap() -> Self {
        Self::new(DEFAULT_HISTORY_TURNS)
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Recent turns for `key`, oldest first. Empty if the key has no window.
    pub fn get(&self, key: &ConversationKey) -> Vec<Turn> {
        self.windows
            .get(key)
            .map(|window| window.clone())
            .unwrap_or_default()
    }

    /// Append turns in order, then drop the oldest entries past the cap.
    pub fn append(&self, key: ConversationKey, turns: impl IntoIterator<Item = Turn>) {
        let mut window = self.windows.entry(key).or_default();
        window.extend(turns);
        let len = window.len();
        if len > self.cap {
            window.drain(..len - self.cap);
        }
    }

    /// Drop the window for `key`. Clearing an absent key is a no-op.
    pub fn clear(&self, key: &ConversationKey) {
        self.windows.remove(key);
    }

    pub fn len(&self, key: &ConversationKey) -> usize {
        self.windows.get(key).map(|window| window.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, key: &ConversationKey) -> bool {
        self.len(key) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextStore, ConversationKey, Role, Turn};
    use uuid::Uuid;

    fn key() -> ConversationKey {
        ConversationKey::new(Uuid::now_v7(), Some(Uuid::now_v7()))
    }

    #[test]
    fn get_on_absent_key_returns_empty_window() {
        let store = ContextStore::with_default_cap();
        assert!(store.get(&key()).is_empty());
    }

    #[test]
    fn append_preserves_chronological_order() {
        let store = ContextStore::with_default_cap();
        let key = key();
        store.append(key, [Turn::user("q1"), Turn::assistant("a1")]);
        store.append(key, [Turn::user("q2"), Turn::assistant("a2")]);

        let window = store.get(&key);
        let texts: Vec<&str> = window.iter().map(|turn| turn.text.as_str()).collect();
        assert_eq!(texts, ["q1", "a1", "q2", "a2"]);
    }

    #[test]
    fn append_evicts_oldest_turns_past_the_cap() {
        let store = ContextStore::new(4);
        let key = key();
        for i in 0..5 {
            store.append(
                key,
                [
                    Turn::user(format!("q{i}")),
                    Turn::assistant(format!("a{i}")),
                ],
            );
        }

        let window = store.get(&key);
        assert_eq!(window.len(), 4);
        let texts: Vec<&str> = window.iter().map(|turn| turn.text.as_str()).collect();
        // Only the two most recent exchanges survive, still in order.
        assert_eq!(texts, ["q3", "a3", "q4", "a4"]);
    }

    #[test]
    fn short_history_stays_below_the_cap() {
        let store = ContextStore::new(10);
        let key = key();
        store.append(key, [Turn::user("q1"), Turn::assistant("a1")]);
        assert_eq!(store.len(&key), 2);
    }

    #[test]
    fn duplicate_turns_are_stored_as_separate_entries() {
        let store = ContextStore::with_default_cap();
        let key = key();
        store.append(key, [Turn::user("same"), Turn::user("same")]);
        assert_eq!(store.len(&key), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let store = ContextStore::with_default_cap();
        let key = key();
        store.append(key, [Turn::user("hello")]);

        store.clear(&key);
        assert!(store.get(&key).is_empty());
        // Clearing an absent key must be a no-op, not an error.
        store.clear(&key);
        assert!(store.get(&key).is_empty());
    }

    #[test]
    fn windows_for_different_keys_are_independent() {
        let store = ContextStore::with_default_cap();
        let a = key();
        let b = key();
        store.append(a, [Turn::user("for a")]);
        store.append(b, [Turn::user("for b"), Turn::assistant("reply b")]);

        assert_eq!(store.len(&a), 1);
        assert_eq!(store.len(&b), 2);
        store.clear(&a);
        assert_eq!(store.len(&b), 2);
    }

    #[test]
    fn cap_is_never_below_one() {
        let store = ContextStore::new(0);
        let key = key();
        store.append(key, [Turn::user("q"), Turn::assistant("a")]);
        assert_eq!(store.len(&key), 1);
        assert_eq!(store.get(&key)[0].role, Role::Assistant);
    }
}
