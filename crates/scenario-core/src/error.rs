use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    // Graph errors
    #[error("graph is not a DAG: cycle closes at block '{node}'")]
    NotADag { node: String },

    #[error("Malformed edge: {0}")]
    MalformedEdge(String),

    #[error("Scenario has {count} blocks, limit is {limit}")]
    TooManyBlocks { count: usize, limit: usize },

    #[error("Scenario has {count} edges, limit is {limit}")]
    TooManyEdges { count: usize, limit: usize },

    #[error("Resolution timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Resolution cancelled")]
    Cancelled,

    #[error("Resolution task failed: {0}")]
    Task(String),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScenarioError {
    /// True when the error means the workflow itself contains a loop.
    pub fn is_cycle(&self) -> bool {
        matches!(self, ScenarioError::NotADag { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
