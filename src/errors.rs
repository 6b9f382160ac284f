//! Error types for the Pre-Clear recommender
//!
//! Failures on the learned path are absorbed where they happen; everything
//! that reaches a caller is one of these variants.

use thiserror::Error;

/// Main error type for the recommender
#[derive(Error, Debug)]
pub enum RecommenderError {
    /// Artifacts or configuration missing/corrupt
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Query carries no usable signal
    #[error("{0}")]
    Validation(String),

    /// Embedding or index search failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Rule evaluation failed (a defect, never degraded mode)
    #[error("Rule evaluation failed: {0}")]
    Rule(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else raised while merging
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RecommenderError {
    /// True when the caller sent something unusable
    pub fn is_client_error(&self) -> bool {
        matches!(self, RecommenderError::Validation(_))
    }
}

/// Result type alias for recommender operations
pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Convert anyhow errors to RecommenderError
impl From<anyhow::Error> for RecommenderError {
    fn from(err: anyhow::Error) -> Self {
        RecommenderError::Unexpected(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_client_error() {
        let err = RecommenderError::Validation("no fields".to_string());
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "no fields");
    }

    #[test]
    fn test_rule_error_is_server_side() {
        let err = RecommenderError::Rule("bad condition".to_string());
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("bad condition"));
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err: RecommenderError = anyhow::anyhow!("root cause")
            .context("outer layer")
            .into();
        let text = err.to_string();
        assert!(text.contains("outer layer"));
        assert!(text.contains("root cause"));
    }
}
