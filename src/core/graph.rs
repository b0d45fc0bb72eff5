//! Graph definition: nodes, edges and the entry point

use crate::core::{AsyncFnNode, ConditionalEdge, FnNode, Node, NodeError, Predicate, Routes, RunState};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A named directed graph of node behaviors
///
/// Built once through the registration methods, then shared read-only by
/// every run. No well-formedness checks are made: edges and the entry point
/// may name nodes that were never registered.
#[derive(Clone)]
pub struct WorkflowGraph {
    name: String,
    nodes: HashMap<String, Arc<dyn Node>>,
    edges: HashMap<String, String>,
    conditional_edges: HashMap<String, ConditionalEdge>,
    entry_point: Option<String>,
}

impl WorkflowGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            conditional_edges: HashMap::new(),
            entry_point: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register (or replace) the behavior for `name`
    pub fn add_node<N: Node + 'static>(&mut self, name: impl Into<String>, node: N) -> &mut Self {
        self.nodes.insert(name.into(), Arc::new(node));
        self
    }

    /// Register a synchronous closure as a node
    pub fn add_fn_node<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(RunState) -> Result<RunState, NodeError> + Send + Sync + 'static,
    {
        self.add_node(name, FnNode::new(func))
    }

    /// Register an asynchronous closure as a node
    pub fn add_async_node<F, Fut>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(RunState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RunState, NodeError>> + Send + 'static,
    {
        self.add_node(name, AsyncFnNode::new(func))
    }

    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry_point = Some(name.into());
        self
    }

    /// Register the unconditional successor of `from`, replacing any previous one
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.insert(from.into(), to.into());
        self
    }

    /// Register a branch for `from`; it takes precedence over `add_edge`
    pub fn add_conditional_edge<P: Predicate + 'static>(
        &mut self,
        from: impl Into<String>,
        predicate: P,
        routes: Routes,
    ) -> &mut Self {
        self.conditional_edges
            .insert(from.into(), ConditionalEdge::new(predicate, routes));
        self
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    pub fn node(&self, name: &str) -> Option<&Arc<dyn Node>> {
        self.nodes.get(name)
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Registered node names, sorted
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn edge(&self, from: &str) -> Option<&str> {
        self.edges.get(from).map(String::as_str)
    }

    pub fn conditional_edge(&self, from: &str) -> Option<&ConditionalEdge> {
        self.conditional_edges.get(from)
    }

    /// Select the node after `current`, given the state `current` produced
    ///
    /// Conditional routing wins over the unconditional edge; no routing at
    /// all ends the run.
    pub fn next_node(&self, current: &str, state: &RunState) -> Option<String> {
        if let Some(branch) = self.conditional_edges.get(current) {
            branch.next(state)
        } else {
            self.edges.get(current).cloned()
        }
    }
}

impl fmt::Debug for WorkflowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowGraph")
            .field("name", &self.name)
            .field("nodes", &self.node_names())
            .field("edges", &self.edges)
            .field("conditional_edges", &self.conditional_edges)
            .field("entry_point", &self.entry_point)
            .finish()
    }
}
