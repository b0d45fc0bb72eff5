//! Core domain models for the workflow engine
//!
//! This module defines the graph definition, node behaviors, branch
//! conditions and the state that flows through a run.

pub mod condition;
pub mod config;
pub mod graph;
pub mod node;
pub mod state;

pub use condition::*;
pub use graph::*;
pub use node::*;
pub use state::*;
