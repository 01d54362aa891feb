//! Scenario dependency graph — ordering, cycle detection, branch gating.
//!
//! A scenario is a directed graph of `Block`s connected by `Edge`s. Edges
//! leaving a decision block carry a source handle naming the branch they
//! belong to. The resolver orders blocks so every dependency runs first,
//! rejects cyclic scenarios, and records on each block every branch label
//! found on the paths leading to it.
//!
//! `Graph` is the bare adjacency model fed from edge triples. `ScenarioGraph`
//! wraps it with the document's block list for start/end/isolated queries.

pub mod block;
pub mod context;
pub mod edge;
pub mod frontier;
pub mod model;
pub mod resolver;
pub mod scenario;
pub mod validator;

pub use block::{Block, Point2D};
pub use context::ScenarioContext;
pub use edge::Edge;
pub use frontier::ReadyTracker;
pub use model::Graph;
pub use scenario::ScenarioGraph;
pub use validator::{validate, IssueKind, Severity, ValidationIssue, ValidationReport};
