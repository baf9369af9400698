use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Response style for one advisor turn.
///
/// `Probe` keeps the reply to a single short clarifying question while the
/// advisor is still gathering facts; `Final` allows a complete structured
/// deliverable. Not persisted — computed (or supplied) per request and echoed
/// back in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Probe,
    Final,
}

/// Completion-intent phrase families: a request verb followed by a
/// deliverable noun, or a standalone "give me everything" marker.
static FINAL_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(generate|give|show|create|prepare|make)\s+(a|the)?\s*(report|solution|plan|summary|recommendation|analysis)\b|\b(final(ise|ize)?|full|detailed)\b",
    )
    .expect("final-intent pattern is a valid regex")
});

/// Infer the response mode when the caller did not pass one explicitly.
///
/// Total over any input: ambiguous or unmatched text resolves to `Probe`,
/// the shorter response shape. False negatives are recoverable — the client
/// may pass an explicit mode on the next turn. This is the single home of
/// the intent heuristic; callers must not re-implement it.
pub fn classify(text: &str) -> Mode {
    if FINAL_INTENT.is_match(text) {
        Mode::Final
    } else {
        Mode::Probe
    }
}

#[cfg(test)]
mod tests {
    use super::{Mode, classify};

    #[test]
    fn classify_detects_explicit_deliverable_request() {
        assert_eq!(
            classify("Please generate a detailed report on my savings"),
            Mode::Final
        );
        assert_eq!(classify("prepare a plan for retirement"), Mode::Final);
        assert_eq!(classify("show the summary of my expenses"), Mode::Final);
    }

    #[test]
    fn classify_detects_standalone_final_markers() {
        assert_eq!(classify("ok, finalise it"), Mode::Final);
        assert_eq!(classify("I want the FULL picture"), Mode::Final);
        assert_eq!(classify("give me a detailed breakdown"), Mode::Final);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("GENERATE A REPORT on gold bonds"), Mode::Final);
    }

    #[test]
    fn classify_defaults_to_probe() {
        assert_eq!(classify("hello"), Mode::Probe);
        assert_eq!(classify("how much should I save monthly?"), Mode::Probe);
        assert_eq!(classify("what is PPF"), Mode::Probe);
        // Verb without a deliverable noun is not enough.
        assert_eq!(classify("create an account for me"), Mode::Probe);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Probe).unwrap(), "\"probe\"");
        assert_eq!(serde_json::to_string(&Mode::Final).unwrap(), "\"final\"");
    }
}
