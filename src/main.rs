use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use workflow_engine::cli::commands::{HistoryCommand, RunCommand, ServeCommand, ValidateCommand};
use workflow_engine::cli::output::*;
use workflow_engine::cli::{Cli, Command};
use workflow_engine::core::config::EngineConfig;
use workflow_engine::core::RunStatus;
use workflow_engine::execution::{ExecutionEngine, WorkflowRunner};
use workflow_engine::persistence::{InMemoryPersistence, PersistenceBackend, RunRecord, SqliteRunStore};
use workflow_engine::server::{self, AppState};
use workflow_engine::tools::ToolRegistry;
use workflow_engine::workflows::{self, GraphDefinition};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = EngineConfig::load(cli.config.as_deref()).context("Failed to load engine config")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_workflow(cmd, &config).await?,
        Command::Validate(cmd) => validate_definition(cmd)?,
        Command::Serve(cmd) => serve(cmd, &config).await?,
        Command::History(cmd) => show_history(cmd, &config).await?,
    }

    Ok(())
}

/// Open the configured history store, or an in-memory one
async fn open_store(config: &EngineConfig, no_history: bool) -> Result<Arc<dyn PersistenceBackend>> {
    if no_history || !config.history.enabled {
        return Ok(Arc::new(InMemoryPersistence::new()));
    }
    let store = SqliteRunStore::open(&config.database_path())
        .await
        .context("Failed to open run history")?;
    Ok(Arc::new(store))
}

async fn run_workflow(cmd: &RunCommand, config: &EngineConfig) -> Result<()> {
    let tools = ToolRegistry::with_builtins();

    let graph = match &cmd.file {
        Some(file) => GraphDefinition::from_file(file)
            .and_then(|def| def.build(&tools))
            .with_context(|| format!("Failed to load graph definition {}", file))?,
        None => workflows::build_builtin(&cmd.workflow, &tools).with_context(|| {
            format!(
                "Unknown workflow '{}' (available: {})",
                cmd.workflow,
                workflows::builtin_workflows().join(", ")
            )
        })?,
    };

    let initial_state = cmd.initial_state().map_err(anyhow::Error::msg)?;

    let mut engine =
        ExecutionEngine::new(graph).with_max_steps(cmd.max_steps.unwrap_or(config.max_steps));
    if !cmd.json {
        engine.add_event_handler(|event| println!("{}", format_execution_event(event)));
    }

    let store = open_store(config, cmd.no_history).await?;
    let runner = WorkflowRunner::new(store);
    let record = runner.run_to_completion(&engine, initial_state).await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!();
        print_run_details(&record, true)?;
    }

    if record.status == RunStatus::Failed {
        error!("{}", record.error.as_deref().unwrap_or("run failed"));
        std::process::exit(1);
    }

    Ok(())
}

fn validate_definition(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating graph definition...", INFO);

    let tools = ToolRegistry::with_builtins();
    let result = GraphDefinition::from_file(&cmd.file).and_then(|def| {
        def.validate(&tools)?;
        Ok(def)
    });

    match result {
        Ok(def) => {
            println!("{} Graph definition is valid!", CHECK);
            println!("  Name: {}", style(&def.name).bold());
            println!("  Nodes: {}", style(def.nodes.len()).cyan());
            println!(
                "  Edges: {}",
                style(def.edges.len() + def.conditional_edges.len()).cyan()
            );
            println!("  Start: {}", style(&def.start_node).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&def)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

async fn serve(cmd: &ServeCommand, config: &EngineConfig) -> Result<()> {
    let mut config = config.clone();
    if let Some(host) = &cmd.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }

    let store = open_store(&config, cmd.no_history).await?;
    let state = AppState::with_builtin_workflows(
        ToolRegistry::with_builtins(),
        WorkflowRunner::new(store),
        config.max_steps,
    )
    .await;

    println!(
        "{} Serving {} on {}",
        ROCKET,
        style(state.graph_ids().await.join(", ")).bold(),
        style(config.bind_address()).cyan()
    );

    server::serve(&config.bind_address(), Arc::new(state)).await
}

async fn show_history(cmd: &HistoryCommand, config: &EngineConfig) -> Result<()> {
    let store = open_store(config, false).await?;

    if cmd.workflows {
        let names = store.list_workflows().await?;
        if cmd.json {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "workflows": names }))?);
        } else if names.is_empty() {
            println!("{} No runs recorded", INFO);
        } else {
            println!("{} Workflows with recorded runs:", INFO);
            for name in &names {
                println!("  {}", style(name).bold());
            }
        }
        return Ok(());
    }

    if let Some(run_id) = &cmd.delete {
        let run_id = uuid::Uuid::parse_str(run_id).context("Invalid run ID format")?;
        if store.load_run(run_id).await?.is_none() {
            println!("{} Run not found", WARN);
            return Ok(());
        }
        store.delete_run(run_id).await?;
        println!("{} Deleted run {}", CHECK, style(run_id).cyan());
        return Ok(());
    }

    // If specific run ID is requested
    if let Some(run_id) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id).context("Invalid run ID format")?;
        match store.load_run(run_id).await? {
            Some(record) => print_run_details(&record, cmd.verbose)?,
            None => println!("{} Run not found", WARN),
        }
        return Ok(());
    }

    let runs = store.list_runs(cmd.workflow.as_deref(), cmd.limit).await?;

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{} Run history (showing latest {}):", INFO, cmd.limit);
        for record in &runs {
            println!("  {}", format_run_summary(record));
        }
    }

    Ok(())
}

fn print_run_details(record: &RunRecord, verbose: bool) -> Result<()> {
    println!("{} Run Details", INFO);
    println!("  ID: {}", style(record.run_id).cyan());
    println!("  Workflow: {}", style(&record.workflow).bold());
    println!("  Status: {}", format_status(record.status));
    println!("  Started: {}", style(record.created_at.to_rfc3339()).dim());
    if let Some(completed) = record.completed_at {
        println!("  Completed: {}", style(completed.to_rfc3339()).dim());
    }
    if record.capped {
        println!("  {} Stopped at the step cap", WARN);
    }
    if let Some(error) = &record.error {
        println!("  Error: {}", style(error).red());
    }

    if !record.logs.is_empty() {
        println!("\n  {}", style("Steps:").bold());
        for step in &record.logs {
            println!("{}", format_step_record(step));
        }
    }

    if verbose {
        println!("\n  {}", style("Final state:").bold());
        let json = serde_json::to_string_pretty(&record.current_state)?;
        for line in json.lines() {
            println!("    {}", line);
        }
    }

    Ok(())
}
