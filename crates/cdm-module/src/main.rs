//! cdm-module
//!
//! Runs Rubrik CDM task modules for a configuration-management host runtime.
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use cdm_client::HttpConnector;
use clap::{Parser, Subcommand};
use color_eyre::Result;
use eyre::eyre;
use tracing_subscriber::EnvFilter;

mod config;
mod runner;

use config::Config;

#[derive(Parser)]
#[command(name = "cdm-module", version)]
#[command(about = "Run Rubrik CDM task modules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task with arguments read from a JSON file
    Run {
        /// Task name, with or without the `rubrik_` prefix
        task: String,
        /// File holding a JSON object of module arguments
        args_file: PathBuf,
    },
    /// Print a task's documentation block
    Doc {
        /// Task name, with or without the `rubrik_` prefix
        task: String,
    },
    /// List the available tasks
    List,
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = Config::load_default()?;
    init_tracing(&config);

    match cli.command {
        Commands::Run { task, args_file } => {
            let connector = HttpConnector::new(config.connection.client_options());
            let result = runner::run_module(
                &task,
                &args_file,
                |name| std::env::var(name).ok(),
                &connector,
            )
            .await;

            println!("{}", serde_json::to_string(&result)?);
            if result.is_failure() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Doc { task } => {
            let task = cdm_core::find_task(&task).ok_or_else(|| eyre!("unknown task: {task}"))?;
            print!("{}", cdm_core::render_documentation(task.as_ref())?);
        }
        Commands::List => {
            for task in cdm_core::builtin_tasks() {
                println!("{:<28} {}", task.name(), task.description());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
