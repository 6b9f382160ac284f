//! Rule Engine
//!
//! Deterministic mapping from structured shipment fields to mandatory
//! documents. Independent of the learned artifacts: it runs for every
//! request, ready or not.
//!
//! Components:
//! - [`RuleEngine`]: the evaluation seam used by the hybrid scorer
//! - [`RuleSet`]: TOML-driven rule table implementing it
//! - [`builtin`]: the default trade compliance rules

pub mod builtin;
pub mod engine;
pub mod outcome;

pub use builtin::{builtin_rules, BUILTIN_RULES};
pub use engine::{Conditions, Rule, RuleSet};
pub use outcome::RuleOutcome;

use crate::errors::Result;
use crate::types::StructuredQuery;

/// Evaluates structured queries into required items
pub trait RuleEngine: Send + Sync {
    /// Required items with one explanation each. Absent optional fields
    /// mean "no constraint". An error here is a defect and propagates.
    fn evaluate(&self, query: &StructuredQuery) -> Result<RuleOutcome>;
}
