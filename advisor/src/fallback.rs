//! Canned output served when the upstream model is unavailable or returns
//! something unusable. Advisor replies rotate to avoid robotic repetition;
//! shortcut sets are keyed off topical keywords in the recent context.

use rand::Rng;
use rand::seq::SliceRandom;

const ADVISOR_REPLIES: [&str; 3] = [
    "I'm here to help with your financial questions! Due to technical issues, I might not have the most up-to-date information right now, but I can still provide general guidance.",
    "Let me help you with that financial question. While I'm experiencing some connectivity issues, I can share some general advice on Indian financial planning.",
    "I'm your financial advisor and I want to help! Though I'm having some technical difficulties, I can still discuss budgeting, savings, and investment basics with you.",
];

const DEFAULT_SHORTCUTS: [&str; 6] = [
    "Monthly budgeting tips",
    "Best savings options",
    "Investment for beginners",
    "Tax-saving schemes",
    "Emergency fund planning",
    "Home loan guidance",
];

const INVEST_SHORTCUTS: [&str; 4] = [
    "Mutual funds guide",
    "PPF vs ELSS",
    "SIP planning",
    "Risk assessment",
];

const LOAN_SHORTCUTS: [&str; 4] = [
    "Home loan EMI",
    "Personal loan options",
    "Loan eligibility",
    "Interest rates",
];

const TAX_SHORTCUTS: [&str; 4] = [
    "Section 80C options",
    "Tax planning tips",
    "ELSS funds",
    "HRA benefits",
];

/// One canned advisor reply, picked uniformly at random.
pub fn advisor_reply<R: Rng + ?Sized>(rng: &mut R) -> String {
    ADVISOR_REPLIES
        .choose(rng)
        .copied()
        .unwrap_or(ADVISOR_REPLIES[0])
        .to_string()
}

/// Curated shortcut set matching the first topical keyword found in the
/// context; the fixed default set when nothing matches. Always non-empty.
pub fn shortcuts_for_context(context: &str) -> Vec<String> {
    let lower = context.to_lowercase();
    let set: &[&str] = if lower.contains("invest") {
        &INVEST_SHORTCUTS
    } else if lower.contains("loan") {
        &LOAN_SHORTCUTS
    } else if lower.contains("tax") {
        &TAX_SHORTCUTS
    } else {
        &DEFAULT_SHORTCUTS
    };
    set.iter().map(|s| s.to_string()).collect()
}
