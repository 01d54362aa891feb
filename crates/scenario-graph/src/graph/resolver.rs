//! Topological ordering with cycle detection and branch-mark propagation.
//!
//! Depth-first over predecessors with three-colour marking. The walk runs on
//! an explicit stack of frames so deep dependency chains cannot overflow the
//! call stack, and a cancellation flag can be polled between frames.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use scenario_core::error::{Result, ScenarioError};
use scenario_core::types::NodeId;

use super::model::Graph;

impl Graph {
    /// Compute an execution order in which every edge `u -> v` has `u` first.
    ///
    /// Roots are the nodes with at least one incoming edge, visited in
    /// first-insertion order. A pure source is emitted only when reached as a
    /// predecessor, and a node with no edges at all is never emitted.
    ///
    /// This is not a pure query: each visited node absorbs the branch marks
    /// of its predecessors once they are finished. Marks are an ordered set,
    /// so resolving the same graph again yields the same order and marks.
    ///
    /// Returns `ScenarioError::NotADag` if a cycle is reached. No partial
    /// order is returned in that case.
    pub fn resolve(&mut self) -> Result<Vec<NodeId>> {
        Resolver::new(self, None).run()
    }

    /// Same as [`Graph::resolve`], but gives up with
    /// `ScenarioError::Cancelled` once `cancel` is set.
    pub fn resolve_cancellable(&mut self, cancel: &AtomicBool) -> Result<Vec<NodeId>> {
        Resolver::new(self, Some(cancel)).run()
    }
}

/// A node being explored and the index of its next predecessor.
struct Frame {
    node: NodeId,
    next: usize,
}

enum Step {
    Finish,
    Absorb(NodeId),
    Descend(NodeId),
}

struct Resolver<'g> {
    graph: &'g mut Graph,
    cancel: Option<&'g AtomicBool>,
    /// On the exploration stack.
    temporary: HashSet<NodeId>,
    /// Fully resolved.
    permanent: HashSet<NodeId>,
    stack: Vec<Frame>,
    order: Vec<NodeId>,
}

impl<'g> Resolver<'g> {
    fn new(graph: &'g mut Graph, cancel: Option<&'g AtomicBool>) -> Self {
        Self {
            graph,
            cancel,
            temporary: HashSet::new(),
            permanent: HashSet::new(),
            stack: Vec::new(),
            order: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<NodeId>> {
        let roots = self.graph.targets().to_vec();
        for root in roots {
            if self.permanent.contains(&root) {
                continue;
            }
            self.visit(root)?;
        }
        debug!(
            ordered = self.order.len(),
            edges = self.graph.edge_count(),
            "Resolved dependency order"
        );
        Ok(self.order)
    }

    fn visit(&mut self, root: NodeId) -> Result<()> {
        self.enter(root)?;

        while let Some(frame) = self.stack.last() {
            if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(ScenarioError::Cancelled);
            }

            let step = match self.graph.predecessors(&frame.node).get(frame.next) {
                None => Step::Finish,
                Some(pred) if self.permanent.contains(pred) => Step::Absorb(pred.clone()),
                Some(pred) => Step::Descend(pred.clone()),
            };

            match step {
                Step::Finish => self.finish(),
                Step::Absorb(pred) => self.absorb(&pred),
                Step::Descend(pred) => self.enter(pred)?,
            }
        }
        Ok(())
    }

    /// Push `node` onto the stack, or fail if it is already on it.
    fn enter(&mut self, node: NodeId) -> Result<()> {
        if self.temporary.contains(&node) {
            warn!(node_id = %node, "Cycle detected in scenario graph");
            return Err(ScenarioError::NotADag { node });
        }
        self.temporary.insert(node.clone());
        self.stack.push(Frame { node, next: 0 });
        Ok(())
    }

    /// Copy a finished predecessor's marks onto the top frame and advance it.
    fn absorb(&mut self, pred: &str) {
        let marks = self.graph.branch_marks(pred).to_vec();
        if let Some(frame) = self.stack.last_mut() {
            frame.next += 1;
            if !marks.is_empty() {
                self.graph.extend_marks(&frame.node, marks);
            }
        }
    }

    fn finish(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.temporary.remove(&frame.node);
            self.permanent.insert(frame.node.clone());
            self.order.push(frame.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str, &str)]) -> Graph {
        let mut g = Graph::new(edges.len());
        for (s, d, h) in edges {
            g.add_edge(s, d, h).unwrap();
        }
        g
    }

    fn position(order: &[NodeId], node: &str) -> usize {
        order
            .iter()
            .position(|n| n == node)
            .unwrap_or_else(|| panic!("{} missing from {:?}", node, order))
    }

    #[test]
    fn test_linear_chain() {
        let mut g = graph(&[("A", "B", ""), ("B", "C", "")]);
        let order = g.resolve().unwrap();
        assert_eq!(order, ["A", "B", "C"]);
        assert!(g.all_branch_marks().is_empty());
    }

    #[test]
    fn test_chain_declared_backwards() {
        let mut g = graph(&[("C", "D", ""), ("B", "C", ""), ("A", "B", "")]);
        assert_eq!(g.resolve().unwrap(), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_diamond() {
        let mut g = graph(&[("A", "B", ""), ("A", "C", ""), ("B", "D", ""), ("C", "D", "")]);
        let order = g.resolve().unwrap();
        assert_eq!(order.len(), 4);
        assert!(position(&order, "A") < position(&order, "B"));
        assert!(position(&order, "A") < position(&order, "C"));
        assert!(position(&order, "B") < position(&order, "D"));
        assert!(position(&order, "C") < position(&order, "D"));
    }

    #[test]
    fn test_conditional_branches_propagate() {
        let mut g = graph(&[
            ("A", "B", "true"),
            ("A", "C", "false"),
            ("B", "D", ""),
            ("C", "D", ""),
        ]);
        g.resolve().unwrap();

        assert_eq!(g.branch_marks("B"), ["true"]);
        assert_eq!(g.branch_marks("C"), ["false"]);
        let d = g.branch_marks("D");
        assert!(d.contains(&"true".to_string()));
        assert!(d.contains(&"false".to_string()));
        assert!(g.branch_marks("A").is_empty());
    }

    #[test]
    fn test_marks_flow_through_long_paths() {
        let mut g = graph(&[
            ("start", "if", ""),
            ("if", "left", "yes"),
            ("left", "mid", ""),
            ("mid", "end", "inner"),
        ]);
        g.resolve().unwrap();
        assert_eq!(g.branch_marks("mid"), ["yes"]);
        assert_eq!(g.branch_marks("end"), ["inner", "yes"]);
    }

    #[test]
    fn test_direct_cycle() {
        let mut g = graph(&[("A", "B", ""), ("B", "A", "")]);
        let err = g.resolve().unwrap_err();
        assert!(err.is_cycle());
    }

    #[test]
    fn test_self_loop() {
        let mut g = graph(&[("A", "A", "")]);
        let err = g.resolve().unwrap_err();
        assert!(matches!(err, ScenarioError::NotADag { ref node } if node == "A"));
    }

    #[test]
    fn test_cycle_behind_acyclic_prefix() {
        let mut g = graph(&[
            ("start", "a", ""),
            ("a", "b", ""),
            ("b", "c", ""),
            ("c", "a", ""),
        ]);
        assert!(g.resolve().unwrap_err().is_cycle());
    }

    #[test]
    fn test_isolated_vertex_is_absent() {
        // Three vertices: A, B and a "Z" that has no edges, so it is never visited.
        let mut g = Graph::new(3);
        g.add_edge("A", "B", "").unwrap();

        let order = g.resolve().unwrap();
        assert_eq!(order, ["A", "B"]);
        assert!(!order.contains(&"Z".to_string()));
    }

    #[test]
    fn test_pure_source_reached_through_successor() {
        let mut g = graph(&[("src", "sink", "")]);
        let order = g.resolve().unwrap();
        assert_eq!(order, ["src", "sink"]);
        assert!(!g.targets().contains(&"src".to_string()));
    }

    #[test]
    fn test_every_node_emitted_once() {
        let mut g = graph(&[
            ("a", "b", ""),
            ("a", "c", ""),
            ("b", "d", ""),
            ("c", "d", ""),
            ("d", "e", ""),
            ("a", "e", ""),
        ]);
        let order = g.resolve().unwrap();
        let unique: HashSet<_> = order.iter().collect();
        assert_eq!(unique.len(), order.len());
        assert_eq!(order.len(), 5);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut g = graph(&[
            ("A", "B", "true"),
            ("A", "C", "false"),
            ("B", "D", ""),
            ("C", "D", ""),
        ]);
        let first = g.resolve().unwrap();
        let marks_first = g.all_branch_marks().clone();
        let second = g.resolve().unwrap();
        assert_eq!(first, second);
        assert_eq!(&marks_first, g.all_branch_marks());
    }

    #[test]
    fn test_empty_graph_resolves_to_nothing() {
        let mut g = Graph::new(0);
        assert!(g.resolve().unwrap().is_empty());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut g = Graph::new(0);
        for i in (0..50_000).rev() {
            g.add_edge(&format!("n{}", i), &format!("n{}", i + 1), "").unwrap();
        }
        let order = g.resolve().unwrap();
        assert_eq!(order.len(), 50_001);
        assert_eq!(order[0], "n0");
        assert_eq!(order[50_000], "n50000");
    }

    #[test]
    fn test_cancel_flag_stops_resolution() {
        let mut g = graph(&[("A", "B", "")]);
        let cancel = AtomicBool::new(true);
        let err = g.resolve_cancellable(&cancel).unwrap_err();
        assert!(matches!(err, ScenarioError::Cancelled));

        let cancel = AtomicBool::new(false);
        assert_eq!(g.resolve_cancellable(&cancel).unwrap(), ["A", "B"]);
    }
}
