mod aggregate;
mod config;
mod csv;
mod export_split;
mod ids;
mod ipc;
mod model;
mod normalize;
mod pipeline;
mod schema;
mod tables;
mod weight;

use clap::{Parser, Subcommand};
use config::Config;
use schema::Table;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "outlined", version, about = "Course outline normalization sidecar")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file overriding the built-in defaults.
    #[arg(long, global = true, env = "OUTLINED_CONFIG")]
    config: Option<PathBuf>,

    /// Output root; partitions go to <output>/scrape, merged tables to <output>/final.
    #[arg(long, global = true, env = "OUTLINED_OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer JSON-line requests on stdin (default).
    Serve,
    /// Split an exported outlines table into personnel, condition and assessment tables.
    Split {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Merge every partition's tables into <output>/final.
    Aggregate {
        /// Comma-separated partition codes; defaults to the configured departments.
        #[arg(long, value_delimiter = ',')]
        partitions: Option<Vec<String>>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries IPC responses, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn serve(config: Config) {
    let mut state = ipc::AppState::new(config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request");
                let _ = writeln!(stdout, "{}", ipc::unparseable(e.to_string()));
                let _ = stdout.flush();
                continue;
            }
        };

        tracing::debug!(id = req.id.as_str(), method = req.method.as_str(), "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(out) = cli.output {
        config.output_dir = out;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            serve(config);
            Ok(())
        }
        Command::Split { input, out } => {
            let out = out.unwrap_or_else(|| config.output_dir.clone());
            let summary = export_split::split_outlines_export(&input, &out, &config)?;
            tracing::info!(
                courses = summary.courses,
                skipped = summary.skipped,
                groups = summary.rows.rows_for(Table::AssessmentGroups),
                assessments = summary.rows.rows_for(Table::Assessments),
                out = %out.display(),
                "split completed successfully"
            );
            Ok(())
        }
        Command::Aggregate { partitions } => {
            let partitions = partitions.unwrap_or_else(|| config.departments.clone());
            if let Some(p) = partitions.iter().find(|p| !config.has_department(p)) {
                anyhow::bail!("unknown partition: {}", p);
            }
            let summary =
                aggregate::aggregate(&config.scrape_dir(), &config.final_dir(), &partitions)?;
            for (table, rows) in &summary.rows {
                tracing::debug!(table = table.name(), rows, "consolidated");
            }
            tracing::info!(
                merged = summary.merged.len(),
                skipped = summary.skipped.len(),
                "aggregation completed successfully"
            );
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("process failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
