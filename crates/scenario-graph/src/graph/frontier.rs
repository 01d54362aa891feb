use std::collections::{HashMap, HashSet};

use tracing::debug;

use scenario_core::types::NodeId;

use super::model::Graph;

impl Graph {
    /// Successors of `node` that are not in `visited`, in insertion order.
    ///
    /// Reports adjacency only: a returned node may still be waiting on other
    /// predecessors. Use [`ReadyTracker`] for dependency-aware release.
    pub fn ready_neighbors(&self, node: &str, visited: &HashSet<NodeId>) -> Vec<NodeId> {
        self.successors(node)
            .iter()
            .filter(|succ| !visited.contains(*succ))
            .cloned()
            .collect()
    }
}

/// Incremental release of blocks as their dependencies complete.
///
/// A node becomes ready once every entry in its predecessor list has been
/// completed, counting duplicate edges individually.
#[derive(Debug)]
pub struct ReadyTracker<'g> {
    graph: &'g Graph,
    completed: HashSet<NodeId>,
    satisfied: HashMap<NodeId, usize>,
}

impl<'g> ReadyTracker<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            completed: HashSet::new(),
            satisfied: HashMap::new(),
        }
    }

    /// Mark `node` complete and return the successors it released.
    ///
    /// Completing the same node twice releases nothing the second time.
    pub fn complete(&mut self, node: &str) -> Vec<NodeId> {
        if !self.completed.insert(node.to_string()) {
            return Vec::new();
        }

        let mut released = Vec::new();
        for succ in self.graph.ready_neighbors(node, &self.completed) {
            let count = self.satisfied.entry(succ.clone()).or_insert(0);
            *count += 1;
            if *count == self.graph.predecessors(&succ).len() {
                released.push(succ);
            }
        }

        debug!(node_id = %node, released = released.len(), "Block completed");
        released
    }

    pub fn is_done(&self, node: &str) -> bool {
        self.completed.contains(node)
    }

    pub fn completed(&self) -> &HashSet<NodeId> {
        &self.completed
    }

    /// Walk level by level from `roots`, completing each level in turn.
    ///
    /// Nodes that never become ready (cyclic, or gated by a block outside
    /// `roots`' reach) are left out.
    pub fn levels(mut self, roots: &[NodeId]) -> Vec<Vec<NodeId>> {
        let mut levels = Vec::new();
        let mut current: Vec<NodeId> = roots
            .iter()
            .filter(|n| !self.is_done(n))
            .cloned()
            .collect();

        while !current.is_empty() {
            let mut next = Vec::new();
            for node in &current {
                next.extend(self.complete(node));
            }
            levels.push(std::mem::replace(&mut current, next));
        }
        levels
    }
}
