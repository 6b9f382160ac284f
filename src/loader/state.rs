// Tri-state readiness of the learned artifacts
use serde::{Deserialize, Serialize};

/// Whether the semantic retriever can serve requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResourceState {
    /// Catalog not configured or loading never attempted
    Unloaded,
    /// Artifacts loaded and consistent
    Ready { rows: usize },
    /// Loading failed; the reason is kept for diagnostics only
    Failed { reason: String },
}

impl ResourceState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceState::Ready { .. })
    }

    pub fn rows(&self) -> Option<usize> {
        match self {
            ResourceState::Ready { rows } => Some(*rows),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ResourceState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceState::Unloaded => "unloaded",
            ResourceState::Ready { .. } => "ready",
            ResourceState::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_accessors() {
        let ready = ResourceState::Ready { rows: 3 };
        assert!(ready.is_ready());
        assert_eq!(ready.rows(), Some(3));
        assert_eq!(ready.reason(), None);

        let failed = ResourceState::Failed {
            reason: "missing artifact".to_string(),
        };
        assert!(!failed.is_ready());
        assert_eq!(failed.reason(), Some("missing artifact"));
        assert_eq!(failed.label(), "failed");

        assert!(!ResourceState::Unloaded.is_ready());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(ResourceState::Ready { rows: 12 }).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ready", "rows": 12 }));
    }
}
