//! Test: Failure handling - node errors abort the run unchanged

use crate::helpers::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use workflow_engine::persistence::InMemoryPersistence;
use workflow_engine::{ExecutionEngine, NodeError, RunState, RunStatus, WorkflowGraph, WorkflowRunner};

fn failing_graph(calls: Arc<AtomicUsize>) -> WorkflowGraph {
    let mut graph = WorkflowGraph::new("failing");
    graph
        .add_fn_node("A", append_node("a"))
        .add_fn_node("boom", |_| Err(NodeError::Failed("exploded".to_string())))
        .add_fn_node("after", move |s| {
            calls.fetch_add(1, Ordering::SeqCst);
            append("z", s)
        })
        .set_entry_point("A")
        .add_edge("A", "boom")
        .add_edge("boom", "after");
    graph
}

/// The error surfaces as-is and no later node runs
#[tokio::test]
async fn test_node_error_propagates_unchanged() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = ExecutionEngine::new(failing_graph(calls.clone()));

    let err = engine.run(&RunState::new()).await.unwrap_err();

    assert!(matches!(err, NodeError::Failed(ref msg) if msg == "exploded"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// A typed field error keeps its variant through the engine
#[tokio::test]
async fn test_invalid_field_error() {
    let mut graph = WorkflowGraph::new("typed");
    graph
        .add_fn_node("check", |s: RunState| {
            if s.get("n").and_then(|v| v.as_i64()).is_none() {
                return Err(NodeError::invalid_field("n", "expected an integer"));
            }
            Ok(s)
        })
        .set_entry_point("check");

    let engine = ExecutionEngine::new(graph);

    assert!(engine.run(&state(&[("n", json!(2))])).await.is_ok());

    let err = engine.run(&state(&[("n", json!("two"))])).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for state field 'n': expected an integer"
    );
}

/// Tracked runs record the failure instead of raising it
#[tokio::test]
async fn test_runner_marks_failed_run() {
    let runner = WorkflowRunner::new(Arc::new(InMemoryPersistence::new()));
    let engine = ExecutionEngine::new(failing_graph(Arc::new(AtomicUsize::new(0))));

    let record = runner
        .run_to_completion(&engine, state(&[("trail", json!(">"))]))
        .await
        .unwrap();

    assert_eq!(record.status, RunStatus::Failed);
    assert_eq!(record.error.as_deref(), Some("exploded"));
    assert!(record.completed_at.is_some());

    let stored = runner.store().load_run(record.run_id).await.unwrap().unwrap();
    assert_eq!(stored.status, RunStatus::Failed);
}

/// A failure in one run leaves the engine usable for the next
#[tokio::test]
async fn test_engine_reusable_after_failure() {
    let mut graph = WorkflowGraph::new("flaky");
    graph
        .add_fn_node("gate", |s: RunState| {
            if s.get("fail") == Some(&json!(true)) {
                Err(NodeError::Failed("gate closed".to_string()))
            } else {
                append("g", s)
            }
        })
        .set_entry_point("gate");

    let engine = ExecutionEngine::new(graph);

    assert!(engine.run(&state(&[("fail", json!(true))])).await.is_err());
    let result = engine.run(&state(&[("fail", json!(false))])).await.unwrap();
    assert_eq!(trail(&result.state), "g");
}
