//! Run tracking - executes runs and records their status

use crate::core::{RunState, RunStatus};
use crate::execution::ExecutionEngine;
use crate::persistence::{PersistenceBackend, RunRecord};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info};
use uuid::Uuid;

/// Drives runs of an engine and keeps their records up to date
///
/// The engine itself never catches node failures; this is where they are
/// turned into a `failed` status and an error message.
#[derive(Clone)]
pub struct WorkflowRunner {
    store: Arc<dyn PersistenceBackend>,
}

impl WorkflowRunner {
    pub fn new(store: Arc<dyn PersistenceBackend>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PersistenceBackend> {
        &self.store
    }

    /// Queue a run and execute it on a background task
    ///
    /// Returns as soon as the queued record is stored.
    pub async fn submit(&self, engine: Arc<ExecutionEngine>, initial_state: RunState) -> Result<Uuid> {
        let record = RunRecord::queued(engine.graph().name(), initial_state);
        let run_id = record.run_id;
        self.store
            .save_run(&record)
            .await
            .context("Failed to record queued run")?;

        info!(%run_id, workflow = %record.workflow, "Run queued");

        let runner = self.clone();
        tokio::spawn(async move {
            let fallback = record.clone();
            let worker = runner.clone();
            let outcome = tokio::spawn(async move { worker.execute(record, &engine).await }).await;

            let failure = match outcome {
                Ok(Ok(_)) => return,
                Ok(Err(e)) => format!("{:#}", e),
                Err(e) => join_failure(e),
            };
            runner.record_failure(fallback, failure).await;
        });

        Ok(run_id)
    }

    /// Execute a run in place and return its final record
    pub async fn run_to_completion(
        &self,
        engine: &ExecutionEngine,
        initial_state: RunState,
    ) -> Result<RunRecord> {
        let record = RunRecord::queued(engine.graph().name(), initial_state);
        self.store
            .save_run(&record)
            .await
            .context("Failed to record queued run")?;
        self.execute(record, engine).await
    }

    async fn execute(&self, mut record: RunRecord, engine: &ExecutionEngine) -> Result<RunRecord> {
        record.start();
        self.store
            .save_run(&record)
            .await
            .context("Failed to record running run")?;

        let outcome = engine.run(&record.current_state).await;
        match outcome {
            Ok(result) => {
                info!(
                    run_id = %record.run_id,
                    steps = result.steps(),
                    capped = result.capped,
                    "Run completed"
                );
                record.complete(result);
            }
            Err(e) => {
                error!(run_id = %record.run_id, "Run failed: {}", e);
                record.fail(e.to_string());
            }
        }

        self.store
            .save_run(&record)
            .await
            .context("Failed to record run outcome")?;
        Ok(record)
    }

    /// Best-effort final save for a run whose task did not record an outcome
    async fn record_failure(&self, mut record: RunRecord, message: String) {
        error!(run_id = %record.run_id, "Run aborted: {}", message);
        record.fail(message);
        if let Err(e) = self.store.save_run(&record).await {
            error!(run_id = %record.run_id, "Failed to record run failure: {:#}", e);
        }
    }

    /// Poll until the run reaches a terminal status
    pub async fn wait_for(&self, run_id: Uuid, poll: std::time::Duration) -> Result<RunRecord> {
        loop {
            match self.store.load_run(run_id).await? {
                Some(record) if record.status.is_terminal() => return Ok(record),
                Some(_) => tokio::time::sleep(poll).await,
                None => anyhow::bail!("Run {} not found", run_id),
            }
        }
    }

    /// Current status of a run, if it exists
    pub async fn status(&self, run_id: Uuid) -> Result<Option<RunStatus>> {
        Ok(self.store.load_run(run_id).await?.map(|r| r.status))
    }
}

fn join_failure(err: JoinError) -> String {
    if !err.is_panic() {
        return "run task was cancelled".to_string();
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("node panicked: {}", message)
}
