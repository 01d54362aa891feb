//! Shared fixtures for scenario tests.

use std::io::Write;
use std::path::Path;

use scenario_graph::{Block, Edge, Graph, ScenarioContext};

/// Build a bare graph from `(source, destination, handle)` triples.
pub fn graph_from(edges: &[(&str, &str, &str)]) -> Graph {
    let mut g = Graph::new(edges.len());
    for (source, destination, handle) in edges {
        g.add_edge(source, destination, handle)
            .expect("fixture edge must be well formed");
    }
    g
}

/// Position of `node` in `order`; panics if missing.
pub fn position_of(order: &[String], node: &str) -> usize {
    order
        .iter()
        .position(|n| n == node)
        .unwrap_or_else(|| panic!("{} missing from {:?}", node, order))
}

/// Assert every `(u, v)` edge has `u` before `v` in `order`.
pub fn assert_topological(order: &[String], edges: &[(&str, &str, &str)]) {
    for (u, v, _) in edges {
        assert!(
            position_of(order, u) < position_of(order, v),
            "{} must precede {} in {:?}",
            u,
            v,
            order
        );
    }
}

/// Linear login flow: start -> goto -> find -> input -> click -> screenshot.
pub fn login_flow() -> ScenarioContext {
    let ids = [
        "start",
        "goto_login",
        "find_username",
        "input_username",
        "click_submit",
        "take_screenshot",
    ];
    let kinds = ["start", "goto", "findelement", "inputdata", "click", "screenshot"];
    let blocks = ids
        .iter()
        .zip(kinds)
        .enumerate()
        .map(|(i, (id, kind))| Block::new(*id, kind).at(100.0, 100.0 * (i as f32 + 1.0)))
        .collect();
    let edges = ids.windows(2).map(|w| Edge::new(w[0], w[1])).collect();
    ScenarioContext::new(blocks, edges)
}

/// Decision block with a success and an error branch joining at `end`.
pub fn conditional_flow() -> ScenarioContext {
    ScenarioContext::new(
        vec![
            Block::new("start", "start"),
            Block::new("goto_page", "goto"),
            Block::new("find_element", "findelement"),
            Block::new("click_element", "click"),
            Block::new("error_screenshot", "screenshot"),
            Block::new("end", "end"),
        ],
        vec![
            Edge::new("start", "goto_page"),
            Edge::new("goto_page", "find_element"),
            Edge::new("find_element", "click_element").with_handle("success"),
            Edge::new("find_element", "error_screenshot").with_handle("error"),
            Edge::new("click_element", "end"),
            Edge::new("error_screenshot", "end"),
        ],
    )
}

/// Write `ctx` to `path` as pretty JSON.
pub fn write_context(path: &Path, ctx: &ScenarioContext) {
    let mut file = std::fs::File::create(path).expect("create scenario file");
    let json = serde_json::to_string_pretty(ctx).expect("serialize scenario");
    file.write_all(json.as_bytes()).expect("write scenario");
}
