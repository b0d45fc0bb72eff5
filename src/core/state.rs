//! Run state and execution log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Working memory of a single run: a schema-less, string-keyed JSON map.
///
/// Node behaviors receive the state by value and return the complete next
/// state. The engine never merges fields on their behalf.
pub type RunState = Map<String, Value>;

/// One iteration of the run loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based step index
    pub step: usize,

    /// Node about to execute
    pub node: String,

    /// Deep copy of the state the node is about to consume
    pub state_snapshot: RunState,

    /// When the step was recorded
    pub timestamp: DateTime<Utc>,
}

impl StepRecord {
    pub fn new(step: usize, node: impl Into<String>, state: &RunState) -> Self {
        Self {
            step,
            node: node.into(),
            state_snapshot: state.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// State produced by the last executed node
    pub state: RunState,

    /// Ordered audit trail, one record per iteration
    pub log: Vec<StepRecord>,

    /// True when the loop stopped on the step cap with a successor still pending
    pub capped: bool,
}

impl RunResult {
    /// Node identifiers in the order they were visited
    pub fn visited(&self) -> Vec<&str> {
        self.log.iter().map(|r| r.node.as_str()).collect()
    }

    /// Number of loop iterations taken
    pub fn steps(&self) -> usize {
        self.log.len()
    }
}

/// Lifecycle status of a tracked run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Accepted, not started yet
    Queued,
    /// Run loop in progress
    Running,
    /// Run loop returned a result
    Completed,
    /// A node behavior failed
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    /// Check if the run can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(RunStatus::Queued),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("Unknown run status: {}", other)),
        }
    }
}
