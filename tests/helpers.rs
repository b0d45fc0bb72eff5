//! Test utility functions for workflow-engine
#![allow(dead_code)]

use serde_json::{json, Value};
use workflow_engine::{NodeError, RunResult, RunState};

/// Build a state from key/value pairs
pub fn state(pairs: &[(&str, Value)]) -> RunState {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Current value of the `trail` field
pub fn trail(state: &RunState) -> &str {
    state.get("trail").and_then(Value::as_str).unwrap_or_default()
}

/// Append `tag` to the `trail` field
pub fn append(tag: &str, mut state: RunState) -> Result<RunState, NodeError> {
    let next = format!("{}{}", trail(&state), tag);
    state.insert("trail".to_string(), json!(next));
    Ok(state)
}

/// Same as `append`, but suspends before touching the state
pub async fn append_async(tag: &'static str, state: RunState) -> Result<RunState, NodeError> {
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    append(tag, state)
}

/// Node that appends `tag`
pub fn append_node(tag: &'static str) -> impl Fn(RunState) -> Result<RunState, NodeError> + Send + Sync {
    move |state| append(tag, state)
}

/// Execution log without timestamps: (step, node, snapshot)
pub fn trace(result: &RunResult) -> Vec<(usize, String, RunState)> {
    result
        .log
        .iter()
        .map(|r| (r.step, r.node.clone(), r.state_snapshot.clone()))
        .collect()
}

/// Assert the log steps are numbered 1..=n in order
pub fn assert_steps_numbered(result: &RunResult) {
    let steps: Vec<usize> = result.log.iter().map(|r| r.step).collect();
    let expected: Vec<usize> = (1..=result.log.len()).collect();
    assert_eq!(steps, expected, "log steps should be strictly ordered from 1");
}
