//! Main execution engine - drives state through the graph

use crate::core::{config::DEFAULT_MAX_STEPS, NodeError, RunResult, RunState, StepRecord, WorkflowGraph};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Events that can occur during a run
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    RunStarted {
        graph: String,
        entry_point: Option<String>,
    },
    NodeStarted {
        step: usize,
        node: String,
    },
    NodeMissing {
        step: usize,
        node: String,
    },
    NodeCompleted {
        step: usize,
        node: String,
        next_node: Option<String>,
    },
    RunCompleted {
        graph: String,
        steps: usize,
        capped: bool,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// Runs a graph definition over independent states
///
/// The engine holds no per-run mutable data, so one instance can serve many
/// concurrent runs.
#[derive(Clone)]
pub struct ExecutionEngine {
    graph: Arc<WorkflowGraph>,
    max_steps: usize,
    event_handlers: Vec<EventHandler>,
}

impl ExecutionEngine {
    pub fn new(graph: impl Into<Arc<WorkflowGraph>>) -> Self {
        Self {
            graph: graph.into(),
            max_steps: DEFAULT_MAX_STEPS,
            event_handlers: Vec::new(),
        }
    }

    /// Override the step cap
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Run the graph from its entry point
    ///
    /// The initial state is copied, never aliased. A failing node aborts the
    /// run and its error is returned unchanged.
    pub async fn run(&self, initial_state: &RunState) -> Result<RunResult, NodeError> {
        let graph_name = self.graph.name().to_string();
        let mut state = initial_state.clone();
        let mut current = self.graph.entry_point().map(str::to_string);
        let mut log: Vec<StepRecord> = Vec::new();
        let mut step = 0;

        info!(graph = %graph_name, entry_point = ?current, "Starting run");
        self.emit_event(ExecutionEvent::RunStarted {
            graph: graph_name.clone(),
            entry_point: current.clone(),
        });

        while let Some(node_name) = current.take() {
            if step >= self.max_steps {
                current = Some(node_name);
                break;
            }
            step += 1;

            log.push(StepRecord::new(step, node_name.as_str(), &state));

            let node = match self.graph.node(&node_name) {
                Some(node) => node,
                None => {
                    warn!(graph = %graph_name, step, node = %node_name, "Node not registered, ending run");
                    self.emit_event(ExecutionEvent::NodeMissing {
                        step,
                        node: node_name,
                    });
                    break;
                }
            };

            debug!(step, node = %node_name, "Executing node");
            self.emit_event(ExecutionEvent::NodeStarted {
                step,
                node: node_name.clone(),
            });

            state = node.apply(state).await?;

            current = self.graph.next_node(&node_name, &state);
            debug!(step, node = %node_name, next = ?current, "Node completed");
            self.emit_event(ExecutionEvent::NodeCompleted {
                step,
                node: node_name,
                next_node: current.clone(),
            });
        }

        let capped = current.is_some();
        if capped {
            warn!(
                graph = %graph_name,
                max_steps = self.max_steps,
                "Step cap reached, returning accumulated state"
            );
        }

        info!(graph = %graph_name, steps = log.len(), capped, "Run finished");
        self.emit_event(ExecutionEvent::RunCompleted {
            graph: graph_name,
            steps: log.len(),
            capped,
        });

        Ok(RunResult { state, log, capped })
    }
}
