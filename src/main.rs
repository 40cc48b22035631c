//! Courier - send saved API requests and check their responses
//!
//! Works on a workspace file (`~/.courier/workspace.yaml` by default) that
//! holds collections and environments in the export format.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use courier::app::{render_report, run_collection};
use courier::constants::{APP_NAME, APP_VERSION, DEFAULT_TIMEOUT_SECS, LOG_FILE_NAME};
use courier::storage::{self, Storage};
use courier::{table, Environment, HttpTransport, Workspace};

#[derive(Parser)]
#[command(name = APP_NAME, version = APP_VERSION, about, long_about = None)]
struct Cli {
    /// Workspace file (.yaml or .json)
    #[arg(long, env = "COURIER_WORKSPACE", global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List collections, their requests, and environments
    List,

    /// Send the requests of a collection and check their assertions
    Run {
        collection: String,

        /// Only send this request
        #[arg(short, long)]
        request: Option<String>,

        /// Environment whose variables fill the placeholders
        #[arg(short, long, env = "COURIER_ENV")]
        env: Option<String>,

        /// Transport timeout in seconds
        #[arg(long, env = "COURIER_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Set a variable, creating the environment if needed
    SetVar {
        env: String,
        key: String,
        value: String,
    },

    /// Merge collections and environments from a document (same names are replaced)
    Import { file: PathBuf },

    /// Write collections and environments to a document
    Export { file: PathBuf },

    /// Print a JSON file as a table
    Table {
        file: PathBuf,

        /// Number of rows to show
        #[arg(long, default_value_t = 20)]
        head: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let workspace_path = cli.workspace.unwrap_or_else(Storage::default_path);

    // Initialize logging to file next to the workspace
    let log_dir = workspace_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let storage = Storage::new(&workspace_path);
    let mut workspace = storage
        .load()
        .with_context(|| format!("loading workspace {}", workspace_path.display()))?;

    match cli.command {
        Command::List => print_listing(&workspace),
        Command::Run {
            collection,
            request,
            env,
            timeout,
        } => {
            if env.is_some() {
                workspace.set_active_environment(env.as_deref())?;
            }
            let transport = HttpTransport::new(Duration::from_secs(timeout))?;
            let report =
                run_collection(&mut workspace, &transport, &collection, request.as_deref()).await?;
            println!("{}", render_report(&report));
            if !report.succeeded() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::SetVar { env, key, value } => {
            if workspace.environment(&env).is_none() {
                workspace.add_environment(Environment::new(env.as_str()))?;
            }
            workspace.set_variable(&env, &key, &value)?;
            storage.save(&workspace)?;
            println!("{}: {} = {}", env, key, value);
        }
        Command::Import { file } => {
            let doc = storage::read_document(&file)?;
            let summary = workspace.import(doc)?;
            storage.save(&workspace)?;
            println!(
                "Imported {} new and {} replaced collection(s), {} new and {} replaced environment(s)",
                summary.collections_added,
                summary.collections_replaced,
                summary.environments_added,
                summary.environments_replaced
            );
        }
        Command::Export { file } => {
            storage::write_document(&file, &workspace.export())?;
            println!("Exported to {}", file.display());
        }
        Command::Table { file, head } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let json: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            match table::flatten(&json) {
                Ok(t) => {
                    println!("{}", t.head(head).to_tsv());
                    println!();
                    println!("{} row(s); numeric columns: {}", t.len(), t.numeric_columns().join(", "));
                }
                Err(e) => {
                    println!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_listing(workspace: &Workspace) {
    if workspace.collections().is_empty() {
        println!("No collections");
    }
    for collection in workspace.collections() {
        println!("{} ({} request(s))", collection.name, collection.requests.len());
        for request in &collection.requests {
            println!(
                "  {:<8}{}  {}  [{} test(s)]",
                request.method,
                request.name,
                request.url,
                request.assertions.len()
            );
        }
    }
    for environment in workspace.environments() {
        println!("env {} ({} variable(s))", environment.name, environment.variables.len());
    }
}
