//! HTTP API: start runs, poll their state, register graphs

pub mod routes;

use crate::core::WorkflowGraph;
use crate::execution::{ExecutionEngine, WorkflowRunner};
use crate::tools::ToolRegistry;
use crate::workflows;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared server state
pub struct AppState {
    graphs: RwLock<HashMap<String, Arc<ExecutionEngine>>>,
    tools: ToolRegistry,
    runner: WorkflowRunner,
    max_steps: usize,
}

impl AppState {
    /// State with no graphs registered
    pub fn new(tools: ToolRegistry, runner: WorkflowRunner, max_steps: usize) -> Self {
        Self {
            graphs: RwLock::new(HashMap::new()),
            tools,
            runner,
            max_steps,
        }
    }

    /// State with every built-in workflow registered under its own name
    pub async fn with_builtin_workflows(
        tools: ToolRegistry,
        runner: WorkflowRunner,
        max_steps: usize,
    ) -> Self {
        let state = Self::new(tools, runner, max_steps);
        for name in workflows::builtin_workflows() {
            if let Some(graph) = workflows::build_builtin(name, &state.tools) {
                state.register_graph(name, graph).await;
            }
        }
        state
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn runner(&self) -> &WorkflowRunner {
        &self.runner
    }

    /// Register (or replace) a graph under `id`
    pub async fn register_graph(&self, id: impl Into<String>, graph: WorkflowGraph) {
        let engine = ExecutionEngine::new(graph).with_max_steps(self.max_steps);
        self.graphs.write().await.insert(id.into(), Arc::new(engine));
    }

    pub async fn engine(&self, id: &str) -> Option<Arc<ExecutionEngine>> {
        self.graphs.read().await.get(id).cloned()
    }

    /// Registered graph ids, sorted
    pub async fn graph_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.graphs.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/graph/create", post(routes::create_graph))
        .route("/graph/run/{graph_id}", post(routes::run_graph))
        .route("/graph/state/{run_id}", get(routes::get_run_state))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until Ctrl-C
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down HTTP server");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}
