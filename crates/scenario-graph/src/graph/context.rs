use std::path::Path;

use serde::{Deserialize, Serialize};

use scenario_core::error::Result;

use super::block::Block;
use super::edge::Edge;

/// A scenario's persisted graph: its blocks and the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioContext {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl ScenarioContext {
    pub fn new(blocks: Vec<Block>, edges: Vec<Edge>) -> Self {
        Self { blocks, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.edges.is_empty()
    }

    /// Parse a scenario document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a scenario document from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }
}
