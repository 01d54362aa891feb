use serde::{Deserialize, Serialize};

/// A directed dependency between two blocks of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge id from the editor; not used for resolution.
    #[serde(default)]
    pub id: String,
    /// Source block id.
    pub source: String,
    /// Target block id.
    pub target: String,
    /// Output handle on the source block. On a decision block this names the
    /// branch (`"true"`, `"false"`, `"case-3"`) and becomes a branch mark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Input handle on the target block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Condition expression evaluated by the executing agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Edge {
    /// Create an unconditional edge.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{}->{}", source, target),
            source,
            target,
            source_handle: None,
            target_handle: None,
            condition: None,
        }
    }

    /// Set the source handle (branch label).
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    /// Set the condition expression.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Branch label carried by this edge; empty if unconditional.
    pub fn branch_label(&self) -> &str {
        self.source_handle.as_deref().unwrap_or("")
    }
}
