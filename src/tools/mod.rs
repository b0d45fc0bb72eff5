//! Tool registry - named operations that node behaviors call into
//!
//! Registries are plain values passed to the code that builds a graph, so
//! separate graphs (and tests) can each carry their own set of tools.

pub mod builtin;

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error types for tool operations
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{0}' is not registered")]
    NotFound(String),

    #[error("Tool '{tool}' expected {expected}")]
    InvalidInput { tool: String, expected: &'static str },

    #[error("Tool '{tool}' failed: {message}")]
    Execution { tool: String, message: String },
}

/// A named, synchronous operation over JSON values
pub trait Tool: Send + Sync {
    fn call(&self, input: &Value) -> Result<Value, ToolError>;
}

impl<F> Tool for F
where
    F: Fn(&Value) -> Result<Value, ToolError> + Send + Sync,
{
    fn call(&self, input: &Value) -> Result<Value, ToolError> {
        self(input)
    }
}

/// Name-to-tool lookup
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in tools
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_builtins(&mut registry);
        registry
    }

    /// Register (or replace) a tool
    pub fn register<T: Tool + 'static>(&mut self, name: impl Into<String>, tool: T) -> &mut Self {
        self.tools.insert(name.into(), Arc::new(tool));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Look up a tool, failing if it is missing
    pub fn require(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.get(name).ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// Look up and invoke a tool in one go
    pub fn call(&self, name: &str, input: &Value) -> Result<Value, ToolError> {
        self.require(name)?.call(input)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
