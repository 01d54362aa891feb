use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use scenario_core::config::{ResolverConfig, ValidationConfig};
use scenario_core::error::{Result, ScenarioError};
use scenario_core::event::EventBus;
use scenario_core::types::{BranchLabel, NodeId, ResolutionEvent, ResolutionId};

use crate::graph::{validate, ScenarioContext, ScenarioGraph, ValidationReport};

/// Result of resolving one scenario document.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub id: ResolutionId,
    /// Blocks in dependency order.
    pub order: Vec<NodeId>,
    /// Branch labels gating each block; blocks without marks are omitted.
    pub branch_marks: BTreeMap<NodeId, Vec<BranchLabel>>,
    /// Blocks with no edges. They are not part of `order`.
    pub isolated: Vec<NodeId>,
}

/// Resolve a scenario document and publish the outcome on `bus`.
pub fn resolve_context(
    ctx: &ScenarioContext,
    config: &ResolverConfig,
    bus: &EventBus,
) -> Result<Resolution> {
    run_resolution(ctx, config, bus, None)
}

/// Resolve on a blocking task, abandoning it after `config.timeout_ms`.
pub async fn resolve_with_deadline(
    ctx: ScenarioContext,
    config: ResolverConfig,
    bus: Arc<EventBus>,
) -> Result<Resolution> {
    let timeout_ms = config.timeout_ms;
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();

    let task = tokio::task::spawn_blocking(move || {
        run_resolution(&ctx, &config, &bus, Some(flag.as_ref()))
    });

    match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(ScenarioError::Task(e.to_string())),
        Err(_) => {
            cancel.store(true, Ordering::Relaxed);
            warn!(timeout_ms, "Scenario resolution exceeded deadline");
            Err(ScenarioError::Timeout { timeout_ms })
        }
    }
}

/// Validate a scenario document and publish a summary on `bus`.
pub fn validate_context(
    ctx: &ScenarioContext,
    config: &ValidationConfig,
    bus: &EventBus,
) -> ValidationReport {
    let report = validate(ctx, config);
    bus.publish(ResolutionEvent::Validated {
        id: ResolutionId::new(),
        errors: report.errors().count(),
        warnings: report.warnings().count(),
        at: Utc::now(),
    });
    report
}

fn run_resolution(
    ctx: &ScenarioContext,
    config: &ResolverConfig,
    bus: &EventBus,
    cancel: Option<&AtomicBool>,
) -> Result<Resolution> {
    let id = ResolutionId::new();

    if ctx.blocks.len() > config.max_blocks {
        return Err(ScenarioError::TooManyBlocks {
            count: ctx.blocks.len(),
            limit: config.max_blocks,
        });
    }
    if ctx.edges.len() > config.max_edges {
        return Err(ScenarioError::TooManyEdges {
            count: ctx.edges.len(),
            limit: config.max_edges,
        });
    }

    check_cancelled(cancel)?;
    let mut graph = ScenarioGraph::from_context(ctx)?;
    check_cancelled(cancel)?;
    let resolved = match cancel {
        Some(flag) => graph.resolve_cancellable(flag),
        None => graph.resolve(),
    };

    let order = match resolved {
        Ok(order) => order,
        Err(ScenarioError::NotADag { node }) => {
            bus.publish(ResolutionEvent::CycleDetected {
                id,
                node: node.clone(),
                at: Utc::now(),
            });
            return Err(ScenarioError::NotADag { node });
        }
        Err(e) => return Err(e),
    };

    let isolated = graph.isolated_blocks();
    if !isolated.is_empty() {
        warn!(
            resolution_id = %id,
            isolated = ?isolated,
            "Isolated blocks left out of execution order"
        );
    }

    let branch_marks = graph
        .graph()
        .all_branch_marks()
        .iter()
        .filter(|(_, marks)| !marks.is_empty())
        .map(|(node, marks)| (node.clone(), marks.clone()))
        .collect();

    // The deadline may have passed after the last frame was resolved.
    check_cancelled(cancel)?;

    info!(
        resolution_id = %id,
        blocks = ctx.blocks.len(),
        ordered = order.len(),
        "Scenario resolved"
    );
    bus.publish(ResolutionEvent::Resolved {
        id: id.clone(),
        block_count: ctx.blocks.len(),
        ordered: order.len(),
        at: Utc::now(),
    });

    Ok(Resolution {
        id,
        order,
        branch_marks,
        isolated,
    })
}

fn check_cancelled(cancel: Option<&AtomicBool>) -> Result<()> {
    if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
        return Err(ScenarioError::Cancelled);
    }
    Ok(())
}
