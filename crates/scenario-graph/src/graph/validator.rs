use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use scenario_core::config::ValidationConfig;
use scenario_core::error::ScenarioError;

use super::context::ScenarioContext;
use super::scenario::ScenarioGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Cycle,
    IsolatedBlock,
    MultipleStartNodes,
    NoStartNode,
    UnknownEndpoint,
    DuplicateBlock,
    MalformedEdge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
}

/// Outcome of structural validation of one scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no issue has `Error` severity.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    fn push(&mut self, severity: Severity, kind: IssueKind, message: String) {
        self.issues.push(ValidationIssue {
            severity,
            kind,
            message,
        });
    }
}

fn severity(is_error: bool) -> Severity {
    if is_error {
        Severity::Error
    } else {
        Severity::Warning
    }
}

/// Check a scenario document for structural problems.
///
/// Runs a full resolution for the cycle check; the graph built for it is
/// dropped afterwards.
pub fn validate(ctx: &ScenarioContext, config: &ValidationConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut seen = HashSet::new();
    for block in &ctx.blocks {
        if !seen.insert(block.id.as_str()) {
            report.push(
                Severity::Error,
                IssueKind::DuplicateBlock,
                format!("Block {} is declared more than once", block.id),
            );
        }
    }

    for edge in &ctx.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !endpoint.is_empty() && !seen.contains(endpoint.as_str()) {
                report.push(
                    Severity::Error,
                    IssueKind::UnknownEndpoint,
                    format!("Edge {} references unknown block {}", edge.id, endpoint),
                );
            }
        }
    }

    let mut graph = match ScenarioGraph::from_context(ctx) {
        Ok(graph) => graph,
        Err(e) => {
            report.push(Severity::Error, IssueKind::MalformedEdge, e.to_string());
            return report;
        }
    };

    check_graph(&mut graph, config, &mut report);

    debug!(
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "Scenario validated"
    );
    report
}

fn check_graph(
    graph: &mut ScenarioGraph,
    config: &ValidationConfig,
    report: &mut ValidationReport,
) {
    if let Err(ScenarioError::NotADag { node }) = graph.resolve() {
        report.push(
            Severity::Error,
            IssueKind::Cycle,
            format!("Cycle detected: workflow loops back through block {}", node),
        );
    }

    for block in graph.isolated_blocks() {
        warn!(block_id = %block, "Isolated block in scenario");
        report.push(
            severity(config.isolated_blocks_are_errors),
            IssueKind::IsolatedBlock,
            format!("Block {} is isolated (no connections)", block),
        );
    }

    let starts = graph.start_nodes();
    if starts.len() > 1 {
        report.push(
            severity(config.multiple_starts_are_errors),
            IssueKind::MultipleStartNodes,
            format!("Multiple start nodes found: {}", starts.join(", ")),
        );
    }
    if starts.is_empty() && !graph.blocks().is_empty() {
        report.push(
            Severity::Error,
            IssueKind::NoStartNode,
            "No start node found (all nodes have predecessors)".to_string(),
        );
    }
}
