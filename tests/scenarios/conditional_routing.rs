//! Test: Conditional routing - branches on the post-node state

use crate::helpers::*;
use serde_json::json;
use workflow_engine::{ExecutionEngine, RunState, Routes, WorkflowGraph};

fn is_ready(state: &RunState) -> bool {
    state.get("ready") == Some(&json!(true))
}

/// `true -> end` stops after the first step
#[tokio::test]
async fn test_true_route_to_none_terminates() {
    let mut graph = WorkflowGraph::new("branch");
    graph
        .add_fn_node("check", append_node("c"))
        .add_fn_node("other", append_node("o"))
        .set_entry_point("check")
        .add_conditional_edge("check", is_ready, Routes::new().when_false("other"));

    let result = ExecutionEngine::new(graph)
        .run(&state(&[("ready", json!(true))]))
        .await
        .unwrap();

    assert_eq!(result.log.len(), 1);
    assert_eq!(result.visited(), vec!["check"]);
}

/// `false -> other` continues to the other node
#[tokio::test]
async fn test_false_route_continues() {
    let mut graph = WorkflowGraph::new("branch");
    graph
        .add_fn_node("check", append_node("c"))
        .add_fn_node("other", append_node("o"))
        .set_entry_point("check")
        .add_conditional_edge("check", is_ready, Routes::new().when_false("other"));

    let result = ExecutionEngine::new(graph)
        .run(&state(&[("ready", json!(false))]))
        .await
        .unwrap();

    assert_eq!(result.visited(), vec!["check", "other"]);
    assert_eq!(trail(&result.state), "co");
}

/// The conditional edge wins; the unconditional target is never visited
#[tokio::test]
async fn test_conditional_overrides_unconditional() {
    let mut graph = WorkflowGraph::new("override");
    graph
        .add_fn_node("start", append_node("s"))
        .add_fn_node("X", append_node("x"))
        .add_fn_node("Y", append_node("y"))
        .set_entry_point("start")
        .add_edge("start", "X")
        .add_conditional_edge(
            "start",
            |_: &RunState| true,
            Routes::new().when_true("Y").when_false("Y"),
        );

    let result = ExecutionEngine::new(graph).run(&RunState::new()).await.unwrap();

    assert_eq!(result.visited(), vec!["start", "Y"]);
    assert!(!result.visited().contains(&"X"));
}

/// A dead unconditional edge stays dead even when the branch terminates
#[tokio::test]
async fn test_missing_route_terminates_without_fallback() {
    let mut graph = WorkflowGraph::new("no-fallback");
    graph
        .add_fn_node("start", append_node("s"))
        .add_fn_node("X", append_node("x"))
        .set_entry_point("start")
        .add_edge("start", "X")
        .add_conditional_edge("start", |_: &RunState| false, Routes::new().when_true("X"));

    let result = ExecutionEngine::new(graph).run(&RunState::new()).await.unwrap();

    assert_eq!(result.visited(), vec!["start"]);
}

/// The predicate sees the state the node produced, not the one it received
#[tokio::test]
async fn test_predicate_evaluates_post_node_state() {
    let mut graph = WorkflowGraph::new("post-state");
    graph
        .add_fn_node("arm", |mut s| {
            s.insert("ready".to_string(), json!(true));
            Ok(s)
        })
        .add_fn_node("fire", append_node("f"))
        .set_entry_point("arm")
        .add_conditional_edge("arm", is_ready, Routes::new().when_true("fire"));

    let result = ExecutionEngine::new(graph)
        .run(&state(&[("ready", json!(false))]))
        .await
        .unwrap();

    assert_eq!(result.visited(), vec!["arm", "fire"]);
}

/// A loop that exits through its branch once a counter reaches a limit
#[tokio::test]
async fn test_branch_loop_converges() {
    let mut graph = WorkflowGraph::new("countdown");
    graph
        .add_fn_node("tick", |mut s| {
            let n = s.get("n").and_then(|v| v.as_i64()).unwrap_or(0);
            s.insert("n".to_string(), json!(n - 1));
            Ok(s)
        })
        .set_entry_point("tick")
        .add_conditional_edge(
            "tick",
            |s: &RunState| s.get("n").and_then(|v| v.as_i64()).unwrap_or(0) <= 0,
            Routes::new().when_false("tick"),
        );

    let result = ExecutionEngine::new(graph)
        .run(&state(&[("n", json!(4))]))
        .await
        .unwrap();

    assert_eq!(result.log.len(), 4);
    assert_eq!(result.state.get("n"), Some(&json!(0)));
    assert!(!result.capped);
}
