use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque key identifying a workflow block.
pub type NodeId = String;

/// Handle name attached to a conditional edge, e.g. `"true"` or `"case-3"`.
pub type BranchLabel = String;

/// Unique identifier for one resolution pass.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResolutionId(pub String);

impl ResolutionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_str(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ResolutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResolutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Events emitted while resolving scenario graphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolutionEvent {
    /// A scenario graph was ordered successfully.
    Resolved {
        id: ResolutionId,
        block_count: usize,
        ordered: usize,
        at: DateTime<Utc>,
    },
    /// The scenario contains a loop and was rejected.
    CycleDetected {
        id: ResolutionId,
        node: NodeId,
        at: DateTime<Utc>,
    },
    /// Structural validation finished.
    Validated {
        id: ResolutionId,
        errors: usize,
        warnings: usize,
        at: DateTime<Utc>,
    },
}

impl ResolutionEvent {
    pub fn id(&self) -> &ResolutionId {
        match self {
            ResolutionEvent::Resolved { id, .. }
            | ResolutionEvent::CycleDetected { id, .. }
            | ResolutionEvent::Validated { id, .. } => id,
        }
    }
}
