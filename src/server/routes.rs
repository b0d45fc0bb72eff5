use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::{RunState, RunStatus, StepRecord};
use crate::server::AppState;
use crate::workflows::GraphDefinition;

/// Error body: `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("{:#}", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub initial_state: RunState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub run_id: Uuid,
    pub status: RunStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunStateResponse {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub current_state: Option<RunState>,
    pub error: Option<String>,
    pub logs: Vec<StepRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphCreateResponse {
    pub graph_id: String,
    pub message: String,
}

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "graphs": state.graph_ids().await,
        "tools": state.tools().names(),
    }))
}

// POST /graph/create
pub async fn create_graph(
    State(state): State<Arc<AppState>>,
    Json(definition): Json<GraphDefinition>,
) -> Result<Json<GraphCreateResponse>, ApiError> {
    let graph = definition
        .build(state.tools())
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let graph_id = Uuid::new_v4().to_string();
    let node_count = definition.nodes.len();
    state.register_graph(graph_id.clone(), graph).await;

    info!(%graph_id, name = %definition.name, nodes = node_count, "Graph registered");
    Ok(Json(GraphCreateResponse {
        graph_id,
        message: format!("Graph '{}' created with {} nodes", definition.name, node_count),
    }))
}

// POST /graph/run/{graph_id}
pub async fn run_graph(
    State(state): State<Arc<AppState>>,
    Path(graph_id): Path<String>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let engine = state
        .engine(&graph_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Graph '{}' not found", graph_id)))?;

    let run_id = state.runner().submit(engine, request.initial_state).await?;
    debug!(%run_id, %graph_id, "Run accepted");

    Ok(Json(RunResponse {
        run_id,
        status: RunStatus::Queued,
    }))
}

// GET /graph/state/{run_id}
pub async fn get_run_state(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<RunStateResponse>, ApiError> {
    let run_id = Uuid::parse_str(&run_id).map_err(|_| ApiError::not_found("Run ID not found"))?;

    let record = state
        .runner()
        .store()
        .load_run(run_id)
        .await?
        .ok_or_else(|| {
            warn!(%run_id, "Unknown run requested");
            ApiError::not_found("Run ID not found")
        })?;

    Ok(Json(RunStateResponse {
        run_id: record.run_id,
        status: record.status,
        current_state: Some(record.current_state),
        error: record.error,
        logs: record.logs,
    }))
}
