//! `scout` entry point.
//!
//! This binary is the composition root. It:
//!
//! 1. **Loads configuration**: `.env`, then `scout.toml` (or `--config`),
//!    then environment overrides, validated once.
//! 2. **Wires observability**: `tracing-subscriber` with a text or JSON layer,
//!    plus an OTLP exporter when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Constructs infrastructure**: Ollama, Qdrant and the optional SaaS
//!    adapters, injected into `PipelineExecutor`.
//! 4. **Runs goals** one after another, each with its own state, and reports.

mod config;
mod observability;
mod report;
mod wiring;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;

use crate::config::ScoutConfig;
use crate::observability::LogFormat;

/// Finds leads in previously ingested posts, qualifies them with a language
/// model, and files the good ones.
#[derive(Parser)]
#[command(name = "scout", version, about)]
struct Cli {
    /// Configuration file. Defaults to `scout.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv). Ignored when RUST_LOG is set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once per goal.
    Run {
        /// Goal text; repeat for several runs. Defaults to the configured goal.
        #[arg(long = "goal")]
        goals: Vec<String>,

        /// Write the final state of every run to this JSON file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration with secrets redacted.
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.verbose, cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    };
    telemetry.shutdown();
    code
}

async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = ScoutConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Config {
            action: ConfigAction::Show,
        } => {
            print!(
                "{}",
                config
                    .to_redacted_toml()
                    .context("failed to render configuration")?
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Run { goals, output } => run(&config, goals, output).await,
    }
}

async fn run(
    config: &ScoutConfig,
    goals: Vec<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let executor = wiring::build_executor(config)?;
    let goals = if goals.is_empty() {
        vec![config.goal.clone()]
    } else {
        goals
    };

    let mut reports = Vec::with_capacity(goals.len());
    for goal in &goals {
        let report = executor.run(goal).await;
        print!("{}", report::render(&report));
        reports.push(report);
    }

    if let Some(path) = output {
        report::write_audit(&path, &reports)?;
        info!(path = %path.display(), runs = reports.len(), "audit written");
    }

    let failed = reports.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        eprintln!("{failed} of {} run(s) failed", reports.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
