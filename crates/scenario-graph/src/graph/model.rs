use std::collections::hash_map::Entry;
use std::collections::HashMap;

use scenario_core::error::{Result, ScenarioError};
use scenario_core::types::{BranchLabel, NodeId};

/// Adjacency model of one scenario's dependency graph.
///
/// Only identifiers and relationships are stored. A `Graph` is built for a
/// single resolution request, resolved once, and dropped.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Informational only; never checked against ingested edges.
    vertex_count: usize,
    /// Incoming edge sources per node, in ingestion order.
    predecessors: HashMap<NodeId, Vec<NodeId>>,
    /// Outgoing edge targets per node, in ingestion order.
    successors: HashMap<NodeId, Vec<NodeId>>,
    /// Accumulated conditional-branch labels per node.
    branch_marks: HashMap<NodeId, Vec<BranchLabel>>,
    /// Keys of `predecessors` in first-insertion order.
    targets: Vec<NodeId>,
}

impl Graph {
    /// Create an empty graph. `vertex_count` is stored as supplied.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            ..Self::default()
        }
    }

    /// Ingest one `source -> destination` dependency.
    ///
    /// A non-empty `branch_label` is recorded on `destination`. Self-loops and
    /// duplicate edges are accepted here and left to the resolver's cycle check.
    /// Empty endpoint ids are rejected and leave the graph untouched.
    pub fn add_edge(&mut self, source: &str, destination: &str, branch_label: &str) -> Result<()> {
        if source.is_empty() {
            return Err(ScenarioError::MalformedEdge(format!(
                "empty source for destination '{}'",
                destination
            )));
        }
        if destination.is_empty() {
            return Err(ScenarioError::MalformedEdge(format!(
                "empty destination for source '{}'",
                source
            )));
        }

        self.successors
            .entry(source.to_string())
            .or_default()
            .push(destination.to_string());

        match self.predecessors.entry(destination.to_string()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(source.to_string()),
            Entry::Vacant(entry) => {
                self.targets.push(entry.key().clone());
                entry.insert(vec![source.to_string()]);
            }
        }

        if !branch_label.is_empty() {
            self.extend_marks(destination, std::iter::once(branch_label.to_string()));
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Nodes that must come before `node`. Empty for unknown nodes.
    pub fn predecessors(&self, node: &str) -> &[NodeId] {
        self.predecessors.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes reachable over `node`'s outgoing edges. Empty for unknown nodes.
    pub fn successors(&self, node: &str) -> &[NodeId] {
        self.successors.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Branch labels currently accumulated on `node`.
    pub fn branch_marks(&self, node: &str) -> &[BranchLabel] {
        self.branch_marks.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All non-empty branch-mark sets.
    pub fn all_branch_marks(&self) -> &HashMap<NodeId, Vec<BranchLabel>> {
        &self.branch_marks
    }

    /// Nodes with at least one incoming edge, in first-insertion order.
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// True if `node` is an endpoint of any ingested edge.
    pub fn contains(&self, node: &str) -> bool {
        self.predecessors.contains_key(node) || self.successors.contains_key(node)
    }

    pub fn edge_count(&self) -> usize {
        self.successors.values().map(Vec::len).sum()
    }

    /// Append labels to `node`'s marks, skipping ones already present.
    pub(crate) fn extend_marks(
        &mut self,
        node: &str,
        labels: impl IntoIterator<Item = BranchLabel>,
    ) {
        let marks = self.branch_marks.entry(node.to_string()).or_default();
        for label in labels {
            if !marks.contains(&label) {
                marks.push(label);
            }
        }
    }
}
