//! Workflow catalog: built-in graphs and declarative definitions

pub mod code_review;
pub mod definition;

pub use code_review::{build_code_review_graph, CODE_REVIEW};
pub use definition::{Comparison, ConditionalEdgeDefinition, DefinitionError, GraphDefinition, NodeDefinition};

use crate::core::WorkflowGraph;
use crate::tools::ToolRegistry;

/// Names of the graphs that ship with the engine
pub fn builtin_workflows() -> Vec<&'static str> {
    vec![CODE_REVIEW]
}

/// Build a shipped graph by name
pub fn build_builtin(name: &str, tools: &ToolRegistry) -> Option<WorkflowGraph> {
    match name {
        CODE_REVIEW => Some(build_code_review_graph(tools)),
        _ => None,
    }
}
