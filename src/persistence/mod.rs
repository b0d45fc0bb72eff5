//! Persistence layer for run status and history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

pub use crate::core::RunStatus;
use crate::core::{RunResult, RunState, StepRecord};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Status, state and log of one tracked run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique run ID
    pub run_id: Uuid,

    /// Graph the run executes
    pub workflow: String,

    /// Lifecycle status
    pub status: RunStatus,

    /// Initial state until the run completes, final state afterwards
    pub current_state: RunState,

    /// Failure message of a failed run
    pub error: Option<String>,

    /// Execution log of a completed run
    pub logs: Vec<StepRecord>,

    /// Whether the run stopped on the step cap
    pub capped: bool,

    /// When the run was accepted
    pub created_at: DateTime<Utc>,

    /// When the run reached a terminal status
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    /// Create a queued record
    pub fn queued(workflow: impl Into<String>, initial_state: RunState) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            workflow: workflow.into(),
            status: RunStatus::Queued,
            current_state: initial_state,
            error: None,
            logs: Vec::new(),
            capped: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Mark run as started
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
    }

    /// Mark run as completed with its result
    pub fn complete(&mut self, result: RunResult) {
        self.status = RunStatus::Completed;
        self.current_state = result.state;
        self.logs = result.log;
        self.capped = result.capped;
        self.completed_at = Some(Utc::now());
    }

    /// Mark run as failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }
}

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Insert or replace a run record
    async fn save_run(&self, run: &RunRecord) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunRecord>>;

    /// List runs, newest first, optionally for one workflow
    async fn list_runs(&self, workflow: Option<&str>, limit: usize) -> Result<Vec<RunRecord>>;

    /// List all workflow names with recorded runs
    async fn list_workflows(&self) -> Result<Vec<String>>;

    /// Delete a run
    async fn delete_run(&self, run_id: Uuid) -> Result<()>;
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryPersistence {
    runs: RwLock<HashMap<Uuid, RunRecord>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_run(&self, run: &RunRecord) -> Result<()> {
        self.runs.write().await.insert(run.run_id, run.clone());
        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunRecord>> {
        Ok(self.runs.read().await.get(&run_id).cloned())
    }

    async fn list_runs(&self, workflow: Option<&str>, limit: usize) -> Result<Vec<RunRecord>> {
        let runs = self.runs.read().await;
        let mut result: Vec<RunRecord> = runs
            .values()
            .filter(|r| workflow.map_or(true, |w| r.workflow == w))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }

    async fn list_workflows(&self) -> Result<Vec<String>> {
        let runs = self.runs.read().await;
        let mut names: Vec<String> = runs.values().map(|r| r.workflow.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn delete_run(&self, run_id: Uuid) -> Result<()> {
        self.runs.write().await.remove(&run_id);
        Ok(())
    }
}
