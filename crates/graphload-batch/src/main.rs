//! CLI entry point for graphload.
//!
//! Reads a file of `;`-terminated graph query statements and executes them
//! in order against the configured graph, continuing past failed statements.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use graphload_core::config::{load_config, DEFAULT_FILE_PREFIX};
use graphload_core::ConnectionSettings;
use graphload_graph::{ConnectionManager, Neo4jDriver};

use graphload_batch::config::{BatchConfig, UnterminatedPolicy};
use graphload_batch::run::{exit_status, write_run_report, BatchRun, EXIT_FATAL};

#[derive(Parser)]
#[command(name = "graphload")]
#[command(about = "Execute a file of graph query statements against a graph database")]
struct Cli {
    /// File of `;`-terminated statements.
    file: PathBuf,

    /// Config file prefix (default: graphload).
    #[arg(short, long, default_value = DEFAULT_FILE_PREFIX)]
    config: String,

    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Trailing text without a `;`: drop or execute.
    #[arg(long)]
    on_unterminated: Option<UnterminatedPolicy>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match run(cli) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let cfg = load_config(&cli.config)?;
    let settings = ConnectionSettings::from_config(&cfg)?;
    let mut batch = BatchConfig::from_config(&cfg)?;
    if let Some(policy) = cli.on_unterminated {
        batch.on_unterminated = policy;
    }
    let report_path = cli
        .report
        .clone()
        .or_else(|| batch.report_path.as_ref().map(PathBuf::from));

    let manager = ConnectionManager::new(Neo4jDriver::new(), Neo4jDriver::capability());
    let mut batch_run = BatchRun::new(manager, batch);

    let result = write_run_report(
        batch_run.run_blocking(settings, &cli.file),
        report_path.as_deref(),
    );
    match &result {
        Ok(summary) => println!("{summary}"),
        Err(e) => eprintln!("error: {e}"),
    }

    Ok(exit_status(&result))
}
