//! CLI command definitions

use crate::core::RunState;
use clap::Args;
use serde_json::Value;

/// Run a workflow once
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Built-in workflow to run
    #[arg(short, long, default_value = "code-review")]
    pub workflow: String,

    /// Graph definition file (YAML); overrides --workflow
    #[arg(short, long)]
    pub file: Option<String>,

    /// Initial state as a JSON object
    #[arg(long)]
    pub state: Option<String>,

    /// State field overrides (key=value, value parsed as JSON when possible)
    #[arg(long, value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Step cap for this run
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,

    /// Print the final state and log as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    /// Assemble the initial state from --state and --set
    pub fn initial_state(&self) -> Result<RunState, String> {
        let mut state = match &self.state {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => return Err("Initial state must be a JSON object".to_string()),
                Err(e) => return Err(format!("Invalid initial state: {}", e)),
            },
            None => RunState::new(),
        };

        for (key, raw) in &self.set {
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
            state.insert(key.clone(), value);
        }

        Ok(state)
    }
}

/// Validate a graph definition
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to graph definition YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Serve the HTTP API
#[derive(Debug, Args, Clone)]
pub struct ServeCommand {
    /// Bind host (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep run records in memory only
    #[arg(long)]
    pub no_history: bool,
}

/// Show run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Workflow name to filter by
    #[arg(short, long)]
    pub workflow: Option<String>,

    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Show a specific run
    #[arg(long)]
    pub run_id: Option<String>,

    /// List the workflows that have recorded runs
    #[arg(long, conflicts_with_all = ["run_id", "delete"])]
    pub workflows: bool,

    /// Delete a recorded run
    #[arg(long, value_name = "RUN_ID", conflicts_with = "run_id")]
    pub delete: Option<String>,

    /// Show full details
    #[arg(long)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
