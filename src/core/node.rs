//! Node behaviors - the unit of work executed by the run loop

use crate::core::RunState;
use crate::tools::ToolError;
use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

/// Errors raised by node behaviors
///
/// The engine never catches these: a failing node aborts the run and the
/// error is returned as-is to the caller of `run`.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Missing state field '{0}'")]
    MissingField(String),

    #[error("Invalid value for state field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("{0}")]
    Failed(String),
}

impl NodeError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NodeError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A named step's behavior: consume the current state, produce the next one
#[async_trait]
pub trait Node: Send + Sync {
    async fn apply(&self, state: RunState) -> Result<RunState, NodeError>;
}

/// Adapter for synchronous closures
pub struct FnNode<F> {
    func: F,
}

impl<F> FnNode<F>
where
    F: Fn(RunState) -> Result<RunState, NodeError> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Node for FnNode<F>
where
    F: Fn(RunState) -> Result<RunState, NodeError> + Send + Sync,
{
    async fn apply(&self, state: RunState) -> Result<RunState, NodeError> {
        (self.func)(state)
    }
}

/// Adapter for closures returning a future
pub struct AsyncFnNode<F> {
    func: F,
}

impl<F, Fut> AsyncFnNode<F>
where
    F: Fn(RunState) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RunState, NodeError>> + Send,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> Node for AsyncFnNode<F>
where
    F: Fn(RunState) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RunState, NodeError>> + Send,
{
    async fn apply(&self, state: RunState) -> Result<RunState, NodeError> {
        (self.func)(state).await
    }
}
