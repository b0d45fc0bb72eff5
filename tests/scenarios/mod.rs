//! Scenario-based tests for workflow-engine

mod code_review;
mod conditional_routing;
mod failure_handling;
mod state_isolation;
mod step_cap;
