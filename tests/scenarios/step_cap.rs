//! Test: Step cap - cycles stop at the iteration bound

use crate::helpers::*;
use workflow_engine::core::config::DEFAULT_MAX_STEPS;
use workflow_engine::{ExecutionEngine, RunState, WorkflowGraph};

fn ping_pong() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new("ping-pong");
    graph
        .add_fn_node("A", append_node("a"))
        .add_fn_node("B", append_node("b"))
        .set_entry_point("A")
        .add_edge("A", "B")
        .add_edge("B", "A");
    graph
}

/// A two-node cycle always stops at exactly the default cap
#[tokio::test]
async fn test_cycle_hits_default_cap() {
    let engine = ExecutionEngine::new(ping_pong());

    for _ in 0..3 {
        let result = engine.run(&RunState::new()).await.unwrap();
        assert_eq!(DEFAULT_MAX_STEPS, 20);
        assert_eq!(result.log.len(), DEFAULT_MAX_STEPS);
        assert!(result.capped);
        assert_steps_numbered(&result);
    }
}

/// The capped run returns the state accumulated so far
#[tokio::test]
async fn test_capped_run_keeps_accumulated_state() {
    let result = ExecutionEngine::new(ping_pong())
        .with_max_steps(5)
        .run(&RunState::new())
        .await
        .unwrap();

    assert_eq!(result.visited(), vec!["A", "B", "A", "B", "A"]);
    assert_eq!(trail(&result.state), "ababa");
    assert!(result.capped);
}

/// A self loop obeys the same bound
#[tokio::test]
async fn test_self_loop_capped() {
    let mut graph = WorkflowGraph::new("self");
    graph
        .add_fn_node("spin", append_node("."))
        .set_entry_point("spin")
        .add_edge("spin", "spin");

    let result = ExecutionEngine::new(graph)
        .with_max_steps(7)
        .run(&RunState::new())
        .await
        .unwrap();

    assert_eq!(result.log.len(), 7);
    assert_eq!(trail(&result.state), ".......");
}

/// Converging in fewer steps than the cap is not flagged
#[tokio::test]
async fn test_short_run_not_capped() {
    let mut graph = ping_pong();
    graph.add_edge("B", "done");

    let result = ExecutionEngine::new(graph).run(&RunState::new()).await.unwrap();

    assert_eq!(result.visited(), vec!["A", "B", "done"]);
    assert!(!result.capped);
}
