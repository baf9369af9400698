use std::sync::LazyLock;

use crate::capability::GenerationParams;
use crate::mode::Mode;

/// Advisor persona shared by every mode instruction.
const FINANCIAL_CONTEXT: &str = "You are SachivJi's AI Financial Advisor, an expert in Indian financial planning and government schemes.

Key Guidelines:
- Provide practical, actionable financial advice for Indian users
- Reference Indian government schemes, banks, and financial instruments
- Use rupees (₹) for all monetary examples
- Keep responses conversational but informative
- Include relevant government schemes when applicable
- Consider Indian tax laws and regulations
- Be culturally sensitive and use appropriate Hindi/English mix when natural

Focus Areas:
- Personal budgeting and expense management
- Savings accounts and fixed deposits
- Investment options (PPF, ELSS, mutual funds, etc.)
- Government schemes (PM Kisan, Ayushman Bharat, etc.)
- Tax planning and deductions
- Insurance (term life, health, vehicle)
- Home loans and personal loans
- Emergency fund planning
- Retirement planning (EPF, NPS)

Always prioritize user's financial safety and suggest conservative approaches for beginners.";

const PROBE_ROLE: &str = "ROLE: Probe phase. You are gathering essential facts.

Brevity Rules:
- Keep the entire reply to 1–2 short sentences MAX (≈ 80–120 tokens).
- Ask exactly ONE focused follow-up question.
- No bullet lists, no headings, no emojis.
- If user already provided a detail, do not repeat it.
- If multiple data points are missing, ask for the single most important next one only.";

const FINAL_ROLE: &str = "ROLE: Final phase. The user requested a full solution/report.

Output Rules:
- Provide a complete, well-structured answer with clear, actionable steps.
- Prioritize recommendations (what to do first, next) with reasoning.
- Use concrete numbers/examples when helpful.
- Mention relevant Indian schemes if applicable.";

/// Behavioral contract for one mode: system instruction plus generation
/// limits. Built once at first use, never mutated.
#[derive(Debug)]
pub struct ModeProfile {
    pub instruction: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

// Probe clamps output hard so clarifying dialogue stays fast; final allows
// long structured answers. Probe temperature stays at or below final's.
static PROBE_PROFILE: LazyLock<ModeProfile> = LazyLock::new(|| ModeProfile {
    instruction: format!("{FINANCIAL_CONTEXT}\n\n{PROBE_ROLE}"),
    max_output_tokens: 120,
    temperature: 0.4,
    top_p: 0.9,
});

static FINAL_PROFILE: LazyLock<ModeProfile> = LazyLock::new(|| ModeProfile {
    instruction: format!("{FINANCIAL_CONTEXT}\n\n{FINAL_ROLE}"),
    max_output_tokens: 2048,
    temperature: 0.5,
    top_p: 0.9,
});

impl ModeProfile {
    /// Resolve the profile for a mode. Total over the enum.
    pub fn resolve(mode: Mode) -> &'static ModeProfile {
        match mode {
            Mode::Probe => &PROBE_PROFILE,
            Mode::Final => &FINAL_PROFILE,
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}
