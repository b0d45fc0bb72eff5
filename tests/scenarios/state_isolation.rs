//! Test: State isolation - runs never share or alias state

use crate::helpers::*;
use serde_json::json;
use std::sync::Arc;
use workflow_engine::{ExecutionEngine, RunState, WorkflowGraph};

fn graph() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new("isolation");
    graph
        .add_fn_node("A", append_node("a"))
        .add_fn_node("B", append_node("b"))
        .set_entry_point("A")
        .add_edge("A", "B");
    graph
}

/// Two runs from the same initial state are independent
#[tokio::test]
async fn test_runs_are_independent() {
    let engine = ExecutionEngine::new(graph());
    let initial = state(&[("trail", json!("x"))]);

    let mut first = engine.run(&initial).await.unwrap();
    let second = engine.run(&initial).await.unwrap();

    assert_eq!(trace(&first), trace(&second));
    assert_eq!(first.state, second.state);

    first.state.insert("trail".to_string(), json!("tampered"));
    first.log[0]
        .state_snapshot
        .insert("trail".to_string(), json!("tampered"));

    assert_eq!(trail(&second.state), "xab");
    assert_eq!(trail(&second.log[0].state_snapshot), "x");
    assert_eq!(trail(&second.log[1].state_snapshot), "xa");
}

/// The caller's initial state is never modified
#[tokio::test]
async fn test_initial_state_untouched() {
    let initial = state(&[("trail", json!("x"))]);
    let before = initial.clone();

    let result = ExecutionEngine::new(graph()).run(&initial).await.unwrap();

    assert_eq!(initial, before);
    assert_eq!(trail(&result.state), "xab");
}

/// Snapshots do not change when later nodes rewrite the state
#[tokio::test]
async fn test_snapshots_are_deep_copies() {
    let mut graph = WorkflowGraph::new("nested");
    graph
        .add_fn_node("push", |mut s: RunState| {
            if let Some(items) = s.get_mut("items").and_then(|v| v.as_array_mut()) {
                let next = items.len();
                items.push(json!(next));
            }
            Ok(s)
        })
        .set_entry_point("push")
        .add_edge("push", "push");

    let result = ExecutionEngine::new(graph)
        .with_max_steps(3)
        .run(&state(&[("items", json!([]))]))
        .await
        .unwrap();

    assert_eq!(result.log[0].state_snapshot.get("items"), Some(&json!([])));
    assert_eq!(result.log[1].state_snapshot.get("items"), Some(&json!([0])));
    assert_eq!(result.log[2].state_snapshot.get("items"), Some(&json!([0, 1])));
    assert_eq!(result.state.get("items"), Some(&json!([0, 1, 2])));
}

/// Concurrent runs over one shared engine keep their own state
#[tokio::test]
async fn test_concurrent_runs_share_engine() {
    let engine = Arc::new(ExecutionEngine::new(graph()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let initial = state(&[("trail", json!(i.to_string()))]);
                engine.run(&initial).await.unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        assert_eq!(trail(&result.state), format!("{}ab", i));
        assert_eq!(result.log.len(), 2);
    }
}
