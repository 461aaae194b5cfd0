//! Stream a sourcing query from the command line
//!
//! Progress messages go to stderr while the backend works; the final ranking
//! goes to stdout, either as a table or as the JSON snapshot.

use clap::Parser;
use rankstream::{
    AggregateState, HttpTransport, PayloadAdapter, QuerySlot, RankStreamConfig, RankedItem,
    SessionState,
};
use std::{io, path::PathBuf, process::ExitCode, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{error, info, warn};

/// Failures that stop the client before a ranking is printed
#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] rankstream::Error),

    #[error("cannot read configuration {}: {source}", path.display())]
    ReadConfig { path: PathBuf, source: io::Error },

    #[error("cannot render snapshot: {0}")]
    Render(#[from] serde_json::Error),

    #[error("query must not be blank")]
    BlankQuery,
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "rankstream")]
#[command(about = "Stream a ranked sourcing query", long_about = None)]
struct Cli {
    /// Natural-language query
    #[arg(value_parser = non_blank)]
    query: String,

    /// JSON configuration file; missing sections use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend endpoint (overrides the configuration file)
    #[arg(long)]
    endpoint: Option<String>,

    /// Fail when no data arrives for this many milliseconds
    #[arg(long)]
    idle_timeout_ms: Option<u64>,

    /// Number of results to print
    #[arg(short = 'n', long, default_value = "10")]
    top: usize,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// One printed row of the ranking
struct Row {
    score: f64,
    label: String,
    rationale: Option<String>,
}

/// Reads the company record shape the sourcing backend emits
struct CompanyRows;

impl PayloadAdapter for CompanyRows {
    type Output = Row;

    fn adapt(&self, item: &RankedItem) -> Option<Row> {
        let payload = item.payload();
        let label = payload
            .pointer("/company/name")
            .or_else(|| payload.get("name"))
            .and_then(|name| name.as_str())
            .map_or_else(|| item.id().to_string(), str::to_owned);
        let rationale = payload
            .get("rationale")
            .and_then(|r| r.as_str())
            .map(str::to_owned);

        Some(Row {
            score: item.score().value(),
            label,
            rationale,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::from(2)
        }
    }
}

fn non_blank(query: &str) -> Result<String, String> {
    if query.trim().is_empty() {
        return Err(CliError::BlankQuery.to_string());
    }
    Ok(query.to_owned())
}

async fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = load_config(&cli)?;
    let transport = Arc::new(HttpTransport::new(&config.transport)?);
    info!(endpoint = %transport.endpoint(), "Using backend");

    let slot = QuerySlot::new(transport, config)?;
    let mut snapshots = slot.subscribe();
    if slot.submit(&cli.query).is_none() {
        return Err(CliError::BlankQuery);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_status: Option<String> = None;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                warn!("Interrupted, cancelling query");
                slot.cancel();
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                report_progress(&snapshot, &mut last_status);
                if snapshot.is_complete || snapshot.is_failed() {
                    break;
                }
            }
        }
    }

    let Some(report) = slot.wait().await else {
        return Ok(ExitCode::FAILURE);
    };
    let snapshot = slot.snapshot();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_ranking(&snapshot, cli.top);
    }

    eprintln!(
        "{} results, {} malformed lines, {} bytes in {}ms",
        report.stats.results_applied,
        report.stats.malformed_lines,
        report.stats.bytes_received,
        (report.finished_at - report.started_at).num_milliseconds()
    );

    Ok(match report.state {
        SessionState::Completed => ExitCode::SUCCESS,
        SessionState::Cancelled => ExitCode::from(130),
        _ => {
            if let Some(failure) = &report.failure {
                error!("{failure}");
            }
            ExitCode::FAILURE
        }
    })
}

fn load_config(cli: &Cli) -> CliResult<RankStreamConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
                path: path.clone(),
                source,
            })?;
            RankStreamConfig::from_json(&json)?
        }
        None => RankStreamConfig::default(),
    };

    if let Some(endpoint) = &cli.endpoint {
        config.transport.endpoint = endpoint.clone();
    }
    if let Some(ms) = cli.idle_timeout_ms {
        config.session = config
            .session
            .with_idle_timeout(Duration::from_millis(ms));
    }
    config.validate()?;
    Ok(config)
}

fn report_progress(snapshot: &AggregateState, last_status: &mut Option<String>) {
    if snapshot.status_message != *last_status {
        if let Some(status) = &snapshot.status_message {
            eprintln!("… {status}");
        }
        last_status.clone_from(&snapshot.status_message);
    }
}

fn print_ranking(snapshot: &AggregateState, top: usize) {
    let rows = snapshot.adapt(&CompanyRows);
    if rows.is_empty() {
        println!("No results.");
        return;
    }

    for (rank, row) in rows.iter().take(top).enumerate() {
        println!("{:>3}. {:>6.1}  {}", rank + 1, row.score, row.label);
        if let Some(rationale) = &row.rationale {
            println!("             {rationale}");
        }
    }
    if rows.len() > top {
        println!("... {} more", rows.len() - top);
    }
}
