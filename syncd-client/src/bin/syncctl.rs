//! # syncctl
//!
//! Thin CLI wrapper over `syncd_client::Client`, following the usual
//! `-ctl`/`-cli` split: the library does the work, this binary only parses
//! arguments and prints results.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use syncd_client::{Client, ClientConfig};
use syncd_shared::TaskConfig;

#[derive(Debug, Parser)]
#[command(name = "syncctl", about = "Operator CLI for the sync daemon control-plane API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Task lifecycle operations.
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Print the overall status histogram.
    Status,
}

#[derive(Debug, Subcommand)]
enum TaskCommands {
    /// List every known task.
    List,
    /// Create a task from a JSON task-config file.
    Create {
        file: PathBuf,
        #[arg(long, value_parser = ["now", "inspect"])]
        run: Option<String>,
    },
    /// Delete a task by name.
    Delete { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let client = Client::from_env()?;

    match cli.command {
        Commands::Task { command } => run_task_command(&client, command).await?,
        Commands::Status => {
            let status = client.status().await?;
            println!("successful: {}", status.task_summary.status.successful);
            println!("errored:    {}", status.task_summary.status.errored);
            println!("critical:   {}", status.task_summary.status.critical);
            println!("unknown:    {}", status.task_summary.status.unknown);
            println!("enabled:    {}", status.task_summary.enabled.enabled_true);
            println!("disabled:   {}", status.task_summary.enabled.enabled_false);
        }
    }

    Ok(())
}

async fn run_task_command(client: &Client, command: TaskCommands) -> anyhow::Result<()> {
    match command {
        TaskCommands::List => {
            let tasks = client.tasks().await?;
            if tasks.is_empty() {
                println!("no tasks registered");
            }
            for task in tasks {
                println!("{}\tenabled={}\tmodule={}", task.name, task.enabled, task.module);
            }
        }
        TaskCommands::Create { file, run } => {
            let contents = std::fs::read_to_string(&file)?;
            let task: TaskConfig = serde_json::from_str(&contents)?;
            let name = task.name.clone();
            let response = client.create_task(task, run.as_deref()).await?;
            println!("created task '{name}' (request_id={})", response.request_id);
            if let Some(run) = response.run {
                println!("plan:\n{}", run.plan);
            }
        }
        TaskCommands::Delete { name } => {
            client.delete_task(&name).await?;
            println!("deleted task '{name}'");
        }
    }
    Ok(())
}

/// Exposed for callers embedding `syncctl`'s startup sequence, e.g.
/// integration harnesses that want to block until the daemon is ready
/// before issuing CLI commands.
#[allow(dead_code)]
async fn wait_for_ready(client: &Client) -> anyhow::Result<()> {
    client.wait_for_api(Duration::from_secs(30)).await?;
    Ok(())
}
