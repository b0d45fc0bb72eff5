//! Branch conditions for conditional edges

use crate::core::RunState;
use std::fmt;
use std::sync::Arc;

/// Decides a branch outcome from the state a node just produced
pub trait Predicate: Send + Sync {
    fn evaluate(&self, state: &RunState) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&RunState) -> bool + Send + Sync,
{
    fn evaluate(&self, state: &RunState) -> bool {
        self(state)
    }
}

/// Route table of a conditional edge
///
/// `None` for an outcome means the run terminates when that outcome is
/// produced, whether it was set explicitly or left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routes {
    pub on_true: Option<String>,
    pub on_false: Option<String>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successor when the predicate holds
    pub fn when_true(mut self, node: impl Into<String>) -> Self {
        self.on_true = Some(node.into());
        self
    }

    /// Successor when the predicate does not hold
    pub fn when_false(mut self, node: impl Into<String>) -> Self {
        self.on_false = Some(node.into());
        self
    }

    /// Look up the successor for an outcome
    pub fn route(&self, outcome: bool) -> Option<&str> {
        if outcome {
            self.on_true.as_deref()
        } else {
            self.on_false.as_deref()
        }
    }
}

/// A predicate paired with its route table
#[derive(Clone)]
pub struct ConditionalEdge {
    predicate: Arc<dyn Predicate>,
    routes: Routes,
}

impl ConditionalEdge {
    pub fn new<P: Predicate + 'static>(predicate: P, routes: Routes) -> Self {
        Self {
            predicate: Arc::new(predicate),
            routes,
        }
    }

    /// Evaluate the predicate and pick the successor
    pub fn next(&self, state: &RunState) -> Option<String> {
        let outcome = self.predicate.evaluate(state);
        self.routes.route(outcome).map(str::to_string)
    }
}

impl fmt::Debug for ConditionalEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalEdge")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}
