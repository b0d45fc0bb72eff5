//! Built-in code analysis tools

use crate::tools::{ToolError, ToolRegistry};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

pub const EXTRACT_FUNCTIONS: &str = "extract_functions";
pub const CALCULATE_COMPLEXITY: &str = "calculate_complexity";
pub const LINT_CODE: &str = "lint_code";

static FUNCTION_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:def|fn)\s+\w+[^\n]*$")
        .expect("function definition pattern is valid")
});

/// Register every built-in tool
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry
        .register(EXTRACT_FUNCTIONS, extract_functions)
        .register(CALCULATE_COMPLEXITY, calculate_complexity)
        .register(LINT_CODE, lint_code);
}

fn expect_str<'a>(tool: &str, input: &'a Value) -> Result<&'a str, ToolError> {
    input.as_str().ok_or_else(|| ToolError::InvalidInput {
        tool: tool.to_string(),
        expected: "a string",
    })
}

/// Function definition lines (`def` / `fn`) found in the source, trimmed
pub fn extract_functions(input: &Value) -> Result<Value, ToolError> {
    let code = expect_str(EXTRACT_FUNCTIONS, input)?;
    let functions: Vec<&str> = FUNCTION_DEF
        .find_iter(code)
        .map(|m| m.as_str().trim())
        .collect();
    Ok(json!(functions))
}

/// Complexity score of a snippet: its length in characters
pub fn calculate_complexity(input: &Value) -> Result<Value, ToolError> {
    let snippet = expect_str(CALCULATE_COMPLEXITY, input)?;
    Ok(json!(snippet.chars().count()))
}

/// Style warnings for the source
pub fn lint_code(input: &Value) -> Result<Value, ToolError> {
    let code = expect_str(LINT_CODE, input)?;
    let mut warnings = Vec::new();
    if code.contains("bad_var") {
        warnings.push("Variable name 'bad_var' is ambiguous".to_string());
    }
    Ok(json!(warnings))
}
