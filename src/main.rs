use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sise::{DirectorySource, MatchStrategy, SiseError, Tool};

#[derive(Parser, Debug)]
#[command(name = "sise", version, about = "Search suckless patch descriptions")]
struct Args {
    /// Text to search for. Every whitespace-separated word must appear.
    query: Option<String>,

    /// Corpus directory holding one subdirectory per patch
    #[arg(long, env = "SISE_ROOT")]
    root: Option<PathBuf>,

    /// Project whose cached patch pages are searched when --root is not given
    #[arg(long, value_enum, default_value_t = ToolArg::Dwm)]
    tool: ToolArg,

    /// How the query is compared against descriptions
    #[arg(long, value_enum, default_value_t = StrategyArg::Terms)]
    strategy: StrategyArg,

    /// Case-insensitive matching
    #[arg(short, long)]
    ignore_case: bool,

    /// Search with a single worker regardless of corpus size
    #[arg(long)]
    sequential: bool,

    /// Upper bound on parallel workers
    #[arg(long)]
    max_workers: Option<usize>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ToolArg {
    Dwm,
    St,
    Surf,
}

impl From<ToolArg> for Tool {
    fn from(arg: ToolArg) -> Self {
        match arg {
            ToolArg::Dwm  => Tool::Dwm,
            ToolArg::St   => Tool::St,
            ToolArg::Surf => Tool::Surf,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Every word must appear somewhere in the description
    Terms,
    /// The whole query must appear within one line
    Phrase,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Terms  => MatchStrategy::Terms,
            StrategyArg::Phrase => MatchStrategy::Phrase,
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "sise=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e.to_string()))
        .context("installing log subscriber")
}

fn diagnose(err: &SiseError) {
    eprintln!("{}{}", err.category(), err);
}

fn search(args: Args) -> Result<bool, SiseError> {
    // Reject a missing query before resolving or touching the corpus.
    let query = sise::SearchQuery::parse(args.query.unwrap_or_default())?;

    let source = match args.root {
        Some(root) => DirectorySource::new(root),
        None       => DirectorySource::for_tool(args.tool.into())?,
    };

    let mut builder = sise::search()
        .query(query.raw())
        .source(source)
        .strategy(args.strategy.into())
        .ignore_case(args.ignore_case)
        .sequential(args.sequential);
    if let Some(n) = args.max_workers {
        builder = builder.max_workers(n);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = builder.run(&mut out)?;
    out.flush().map_err(|e| SiseError::Io { path: "<stdout>".into(), source: e })?;

    for failure in &report.failures {
        diagnose(failure);
    }
    tracing::debug!(
        matches = report.matches,
        scanned = report.scanned,
        workers = report.workers,
        elapsed_ms = report.stats.duration.as_millis() as u64,
        "search finished"
    );
    Ok(report.is_success())
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    match search(args) {
        Ok(true)  => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => {
            diagnose(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}
