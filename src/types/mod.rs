//! Type definitions module
//!
//! Request shapes and per-request result types shared by the retriever,
//! the rule engine and the hybrid scorer.

pub mod query;
pub mod results;

// Re-export commonly used types
pub use query::{FreeTextQuery, StructuredQuery, DEFAULT_SUGGESTION_COUNT};
pub use results::{CandidateMatch, MatchSource, Recommendation, SuggestResponse, Suggestion};
