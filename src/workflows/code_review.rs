//! Code review workflow
//!
//! `extract -> analyze`, then `analyze` ends the run once the complexity
//! score is within the threshold or goes to `improve`, which loops back to
//! `extract`.

use crate::core::{NodeError, Routes, RunState, WorkflowGraph};
use crate::tools::builtin::{CALCULATE_COMPLEXITY, EXTRACT_FUNCTIONS};
use crate::tools::ToolRegistry;
use serde_json::{json, Value};
use tracing::info;

pub const CODE_REVIEW: &str = "code-review";

const DEFAULT_THRESHOLD: f64 = 10.0;
const MISSING_SCORE: f64 = 100.0;
const IMPROVEMENT: i64 = 5;

/// Build the code review graph over the given tools
pub fn build_code_review_graph(tools: &ToolRegistry) -> WorkflowGraph {
    let mut graph = WorkflowGraph::new(CODE_REVIEW);

    let extract_tools = tools.clone();
    let analyze_tools = tools.clone();

    graph
        .add_fn_node("extract", move |state| extract(&extract_tools, state))
        .add_fn_node("analyze", move |state| analyze(&analyze_tools, state))
        .add_fn_node("improve", improve)
        .set_entry_point("extract")
        .add_edge("extract", "analyze")
        .add_conditional_edge(
            "analyze",
            quality_ok,
            Routes::new().when_false("improve"),
        )
        .add_edge("improve", "extract");

    graph
}

fn extract(tools: &ToolRegistry, mut state: RunState) -> Result<RunState, NodeError> {
    let code = state.get("code").and_then(Value::as_str).unwrap_or_default();
    let functions = tools.call(EXTRACT_FUNCTIONS, &json!(code))?;

    let count = functions.as_array().map_or(0, Vec::len);
    info!("Extracted {} functions", count);

    state.insert("functions".to_string(), functions);
    Ok(state)
}

fn analyze(tools: &ToolRegistry, mut state: RunState) -> Result<RunState, NodeError> {
    let first = state
        .get("functions")
        .and_then(Value::as_array)
        .and_then(|functions| functions.first())
        .cloned();

    let score = match first {
        Some(function) => tools.call(CALCULATE_COMPLEXITY, &function)?,
        None => json!(0),
    };

    state.insert("complexity_score".to_string(), score);
    Ok(state)
}

fn improve(mut state: RunState) -> Result<RunState, NodeError> {
    let code = state
        .get("code")
        .ok_or_else(|| NodeError::MissingField("code".to_string()))?
        .as_str()
        .ok_or_else(|| NodeError::invalid_field("code", "expected a string"))?;
    let reviewed = format!("# Reviewed\n{}", code);

    let score = state
        .get("complexity_score")
        .ok_or_else(|| NodeError::MissingField("complexity_score".to_string()))?
        .as_i64()
        .ok_or_else(|| NodeError::invalid_field("complexity_score", "expected an integer"))?;

    state.insert("code".to_string(), json!(reviewed));
    state.insert("complexity_score".to_string(), json!((score - IMPROVEMENT).max(0)));
    info!("Applied improvements to code");
    Ok(state)
}

/// True when the complexity score is within the threshold
fn quality_ok(state: &RunState) -> bool {
    let threshold = state
        .get("threshold")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_THRESHOLD);
    let current = state
        .get("complexity_score")
        .and_then(Value::as_f64)
        .unwrap_or(MISSING_SCORE);
    current <= threshold
}
