//! Graph execution: the run loop and run tracking

pub mod engine;
pub mod runner;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent};
pub use runner::WorkflowRunner;
