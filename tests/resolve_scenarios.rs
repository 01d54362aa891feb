use std::collections::HashSet;
use std::sync::Arc;

use scenario_core::config::{ResolverConfig, ValidationConfig};
use scenario_core::event::EventBus;
use scenario_core::ScenarioError;
use scenario_graph::graph::IssueKind;
use scenario_graph::{
    resolve_context, resolve_with_deadline, validate, ReadyTracker, ScenarioContext,
    ScenarioGraph,
};
use scenario_test_utils::{
    assert_topological, conditional_flow, graph_from, login_flow, position_of, write_context,
};

#[test]
fn test_linear_chain_without_handles() {
    let edges = [("A", "B", ""), ("B", "C", "")];
    let mut g = graph_from(&edges);
    assert_eq!(g.resolve().unwrap(), ["A", "B", "C"]);
    for node in ["A", "B", "C"] {
        assert!(g.branch_marks(node).is_empty());
    }
}

#[test]
fn test_diamond_order() {
    let edges = [("A", "B", ""), ("A", "C", ""), ("B", "D", ""), ("C", "D", "")];
    let mut g = graph_from(&edges);
    let order = g.resolve().unwrap();
    assert_topological(&order, &edges);
}

#[test]
fn test_conditional_branch_marks() {
    let edges = [
        ("A", "B", "true"),
        ("A", "C", "false"),
        ("B", "D", ""),
        ("C", "D", ""),
    ];
    let mut g = graph_from(&edges);
    g.resolve().unwrap();

    let d: HashSet<&str> = g.branch_marks("D").iter().map(String::as_str).collect();
    assert_eq!(d, HashSet::from(["true", "false"]));
    assert_eq!(g.branch_marks("B"), ["true"]);
    assert_eq!(g.branch_marks("C"), ["false"]);
}

#[test]
fn test_direct_cycle_and_self_loop() {
    let mut g = graph_from(&[("A", "B", ""), ("B", "A", "")]);
    assert!(matches!(g.resolve(), Err(ScenarioError::NotADag { .. })));

    let mut g = graph_from(&[("A", "A", "")]);
    assert!(matches!(g.resolve(), Err(ScenarioError::NotADag { .. })));
}

#[test]
fn test_isolated_block_is_not_ordered() {
    let mut ctx = ScenarioContext::default();
    ctx.blocks = vec![
        scenario_graph::Block::new("A", "start"),
        scenario_graph::Block::new("B", "click"),
        scenario_graph::Block::new("Z", "comment"),
    ];
    ctx.edges = vec![scenario_graph::Edge::new("A", "B")];

    let mut sg = ScenarioGraph::from_context(&ctx).unwrap();
    let order = sg.resolve().unwrap();
    assert_eq!(order, ["A", "B"]);
    assert!(!order.contains(&"Z".to_string()));
    assert_eq!(sg.isolated_blocks(), ["Z"]);
}

#[test]
fn test_branch_marks_are_monotone_along_edges() {
    let edges = [
        ("start", "if1", ""),
        ("if1", "a", "true"),
        ("if1", "b", "false"),
        ("a", "if2", ""),
        ("if2", "c", "case-1"),
        ("if2", "d", "case-2"),
        ("b", "d", ""),
        ("c", "end", ""),
        ("d", "end", ""),
    ];
    let mut g = graph_from(&edges);
    let order = g.resolve().unwrap();
    assert_topological(&order, &edges);

    for (u, v, _) in edges {
        for mark in g.branch_marks(u) {
            assert!(
                g.branch_marks(v).contains(mark),
                "{} lost mark {} from {}",
                v,
                mark,
                u
            );
        }
    }
    assert_eq!(g.branch_marks("end").len(), 4);
}

#[test]
fn test_every_connected_node_ordered_exactly_once() {
    let edges = [
        ("x", "y", ""),
        ("y", "z", ""),
        ("w", "z", ""),
        ("x", "z", ""),
        ("v", "w", ""),
    ];
    let mut g = graph_from(&edges);
    let order = g.resolve().unwrap();
    assert_eq!(order.len(), 5);
    let unique: HashSet<_> = order.iter().collect();
    assert_eq!(unique.len(), 5);
    assert_topological(&order, &edges);
}

#[test]
fn test_resolving_twice_is_stable() {
    let ctx = conditional_flow();
    let mut sg = ScenarioGraph::from_context(&ctx).unwrap();
    let first = sg.resolve().unwrap();
    let marks = sg.graph().all_branch_marks().clone();

    assert_eq!(sg.resolve().unwrap(), first);
    assert_eq!(sg.graph().all_branch_marks(), &marks);
}

#[test]
fn test_frontier_and_tracker_on_login_flow() {
    let ctx = login_flow();
    let sg = ScenarioGraph::from_context(&ctx).unwrap();

    let mut visited = HashSet::new();
    visited.insert("goto_login".to_string());
    assert!(sg.graph().ready_neighbors("start", &visited).is_empty());
    assert_eq!(
        sg.graph().ready_neighbors("goto_login", &visited),
        ["find_username"]
    );

    let levels = ReadyTracker::new(sg.graph()).levels(&sg.start_nodes());
    assert_eq!(levels.len(), ctx.blocks.len());
    assert!(levels.iter().all(|l| l.len() == 1));
}

#[test]
fn test_conditional_flow_end_to_end() {
    let bus = EventBus::default();
    let res = resolve_context(&conditional_flow(), &ResolverConfig::default(), &bus).unwrap();

    assert_eq!(res.order.len(), 6);
    assert!(position_of(&res.order, "find_element") < position_of(&res.order, "click_element"));
    assert_eq!(res.branch_marks["end"], ["success", "error"]);
    assert!(res.isolated.is_empty());

    let report = validate(&conditional_flow(), &ValidationConfig::default());
    assert!(report.is_valid());
}

#[test]
fn test_cyclic_document_fails_validation() {
    let mut ctx = login_flow();
    ctx.edges
        .push(scenario_graph::Edge::new("take_screenshot", "goto_login"));

    let report = validate(&ctx, &ValidationConfig::default());
    assert!(report.has(IssueKind::Cycle));
    assert!(!report.is_valid());
}

#[tokio::test]
async fn test_document_file_round_trip_through_deadline() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("login.json");
    write_context(&path, &login_flow());

    let ctx = ScenarioContext::load(&path).unwrap();
    let res = resolve_with_deadline(ctx, ResolverConfig::default(), Arc::new(EventBus::default()))
        .await
        .unwrap();
    assert_eq!(res.order.first().map(String::as_str), Some("start"));
    assert_eq!(res.order.last().map(String::as_str), Some("take_screenshot"));
}
