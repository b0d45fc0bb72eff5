//! Test: Code review workflow through the public API

use crate::helpers::*;
use serde_json::json;
use workflow_engine::workflows::{build_builtin, build_code_review_graph, CODE_REVIEW};
use workflow_engine::{ExecutionEngine, ToolError, ToolRegistry};

/// Short code is accepted on the first analysis
#[tokio::test]
async fn test_simple_code_accepted() {
    let graph = build_code_review_graph(&ToolRegistry::with_builtins());
    let result = ExecutionEngine::new(graph)
        .run(&state(&[("code", json!("def f():\n    pass\n"))]))
        .await
        .unwrap();

    assert_eq!(result.visited(), vec!["extract", "analyze"]);
    assert_eq!(result.state.get("functions"), Some(&json!(["def f():"])));
    assert_eq!(result.state.get("complexity_score"), Some(&json!(8)));
}

/// A generous threshold accepts longer code
#[tokio::test]
async fn test_threshold_from_state() {
    let graph = build_builtin(CODE_REVIEW, &ToolRegistry::with_builtins()).unwrap();
    let result = ExecutionEngine::new(graph)
        .run(&state(&[
            ("code", json!("def process_order(order):\n")),
            ("threshold", json!(50)),
        ]))
        .await
        .unwrap();

    assert_eq!(result.visited(), vec!["extract", "analyze"]);
    assert!(!result.capped);
}

/// Code with no functions scores zero and passes
#[tokio::test]
async fn test_no_functions_scores_zero() {
    let graph = build_code_review_graph(&ToolRegistry::with_builtins());
    let result = ExecutionEngine::new(graph)
        .run(&state(&[("code", json!("x = 1\n"))]))
        .await
        .unwrap();

    assert_eq!(result.state.get("functions"), Some(&json!([])));
    assert_eq!(result.state.get("complexity_score"), Some(&json!(0)));
    assert_eq!(result.steps(), 2);
}

/// Long functions loop through improve until the step cap
#[tokio::test]
async fn test_long_function_runs_to_cap() {
    let graph = build_code_review_graph(&ToolRegistry::with_builtins());
    let result = ExecutionEngine::new(graph)
        .with_max_steps(8)
        .run(&state(&[("code", json!("def compute_everything():\n"))]))
        .await
        .unwrap();

    assert!(result.capped);
    assert_eq!(
        result.visited(),
        vec!["extract", "analyze", "improve", "extract", "analyze", "improve", "extract", "analyze"]
    );

    let code = result.state.get("code").and_then(|v| v.as_str()).unwrap();
    assert!(code.starts_with("# Reviewed\n# Reviewed\ndef compute_everything"));
}

/// Tools can be swapped through the registry
#[tokio::test]
async fn test_custom_complexity_tool() {
    let mut tools = ToolRegistry::with_builtins();
    tools.register("calculate_complexity", |_: &serde_json::Value| -> Result<serde_json::Value, ToolError> {
        Ok(json!(1))
    });

    let graph = build_code_review_graph(&tools);
    let result = ExecutionEngine::new(graph)
        .run(&state(&[("code", json!("def compute_everything():\n"))]))
        .await
        .unwrap();

    assert_eq!(result.visited(), vec!["extract", "analyze"]);
    assert_eq!(result.state.get("complexity_score"), Some(&json!(1)));
}
