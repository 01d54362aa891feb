pub mod graph;
pub mod service;

pub use graph::{
    validate, Block, Edge, Graph, ReadyTracker, ScenarioContext, ScenarioGraph, ValidationReport,
};
pub use service::{resolve_context, resolve_with_deadline, validate_context, Resolution};
