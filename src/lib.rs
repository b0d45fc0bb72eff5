//! workflow-engine - a minimal graph execution engine

pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod server;
pub mod tools;
pub mod workflows;

// Re-export commonly used types
pub use crate::core::{Node, NodeError, Predicate, Routes, RunResult, RunState, RunStatus, StepRecord, WorkflowGraph};
pub use crate::execution::{ExecutionEngine, ExecutionEvent, WorkflowRunner};
pub use crate::tools::{Tool, ToolError, ToolRegistry};
