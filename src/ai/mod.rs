//! Advisory text generation - Supplier recommendations, quality checks and
//! price negotiation hints.
//!
//! Nothing here is authoritative. Provider failures never reach callers: the
//! [`Advisor`] turns them into default results flagged `available: false`.

mod advisor;
mod gemini;
mod openai;
mod provider;

pub use advisor::{
    Advisor, NegotiationAdvice, NegotiationRequest, QualityCheckRequest, QualityReport,
    RecommendationRequest, Recommendations, Urgency,
};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use provider::{Prompt, RecommendationProvider, select_provider};
