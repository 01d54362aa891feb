use std::collections::HashMap;
use std::sync::atomic::AtomicBool;

use scenario_core::error::Result;
use scenario_core::types::{BranchLabel, NodeId};

use super::context::ScenarioContext;
use super::model::Graph;

/// Dependency graph of one scenario document.
///
/// Unlike a bare [`Graph`], every block of the document is known here, so
/// start/end/isolated queries cover blocks without edges too.
#[derive(Debug, Clone)]
pub struct ScenarioGraph {
    graph: Graph,
    blocks: Vec<NodeId>,
    conditions: HashMap<(NodeId, NodeId), String>,
}

impl ScenarioGraph {
    /// Build the graph from a document. Each edge's `source_handle` becomes
    /// the branch label on its target.
    pub fn from_context(ctx: &ScenarioContext) -> Result<Self> {
        let mut graph = Graph::new(ctx.blocks.len());
        let mut conditions = HashMap::new();

        for edge in &ctx.edges {
            graph.add_edge(&edge.source, &edge.target, edge.branch_label())?;
            if let Some(condition) = edge.condition.as_ref().filter(|c| !c.is_empty()) {
                conditions.insert(
                    (edge.source.clone(), edge.target.clone()),
                    condition.clone(),
                );
            }
        }

        Ok(Self {
            graph,
            blocks: ctx.blocks.iter().map(|b| b.id.clone()).collect(),
            conditions,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Block ids in document order.
    pub fn blocks(&self) -> &[NodeId] {
        &self.blocks
    }

    /// Resolve the execution order. See [`Graph::resolve`].
    pub fn resolve(&mut self) -> Result<Vec<NodeId>> {
        self.graph.resolve()
    }

    /// Resolve, giving up once `cancel` is set.
    pub fn resolve_cancellable(&mut self, cancel: &AtomicBool) -> Result<Vec<NodeId>> {
        self.graph.resolve_cancellable(cancel)
    }

    pub fn predecessors(&self, node: &str) -> &[NodeId] {
        self.graph.predecessors(node)
    }

    pub fn successors(&self, node: &str) -> &[NodeId] {
        self.graph.successors(node)
    }

    pub fn branch_marks(&self, node: &str) -> &[BranchLabel] {
        self.graph.branch_marks(node)
    }

    /// Condition attached to the `source -> target` edge, if any.
    pub fn condition(&self, source: &str, target: &str) -> Option<&str> {
        self.conditions
            .get(&(source.to_string(), target.to_string()))
            .map(String::as_str)
    }

    pub fn is_start_node(&self, node: &str) -> bool {
        self.graph.predecessors(node).is_empty()
    }

    pub fn is_end_node(&self, node: &str) -> bool {
        self.graph.successors(node).is_empty()
    }

    /// Blocks with no predecessors, in document order.
    pub fn start_nodes(&self) -> Vec<NodeId> {
        self.blocks
            .iter()
            .filter(|b| self.is_start_node(b))
            .cloned()
            .collect()
    }

    /// Blocks with no successors, in document order.
    pub fn end_nodes(&self) -> Vec<NodeId> {
        self.blocks
            .iter()
            .filter(|b| self.is_end_node(b))
            .cloned()
            .collect()
    }

    /// Blocks with no edges at all. These never appear in a resolved order.
    pub fn isolated_blocks(&self) -> Vec<NodeId> {
        self.blocks
            .iter()
            .filter(|b| !self.graph.contains(b))
            .cloned()
            .collect()
    }
}
