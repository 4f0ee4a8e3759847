use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelmatch_api::CatalogCandidate;
use reelmatch_core::config::{AppConfig, LoggingConfig};
use reelmatch_core::error::CoreError;
use reelmatch_core::normalize::normalize;
use reelmatch_core::scorer;

#[derive(Parser, Debug)]
#[command(name = "reelmatch", version, about = "Match media file names against a catalog")]
struct Cli {
    /// Config file to use instead of the per-user one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a file or folder name
    Parse {
        name: String,
        /// Also strip season/episode markers
        #[arg(long)]
        series: bool,
    },
    /// Print the normalized form of a title
    Normalize { title: String },
    /// Score catalog candidates (a JSON array) against a title
    Score {
        #[arg(long)]
        title: String,
        #[arg(long)]
        year: Option<u32>,
        /// Pick the candidate with this id outright
        #[arg(long)]
        external_id: Option<u64>,
        #[arg(long)]
        candidates: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] CoreError),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("reelmatch: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = init_tracing(&config.logging);

    match run(&cli.command, &config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("reelmatch: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

/// Log to stderr, and to a daily file when a log directory is configured.
/// `RUST_LOG` overrides the configured filter.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let (file_layer, guard) = match &logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "reelmatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn run(command: &Command, config: &AppConfig) -> Result<String, CliError> {
    match command {
        Command::Parse { name, series } => {
            let parsed = reelmatch_parse::parse(name, *series);
            Ok(serde_json::to_string_pretty(&parsed)?)
        }
        Command::Normalize { title } => Ok(normalize(title)),
        Command::Score {
            title,
            year,
            external_id,
            candidates,
        } => {
            let raw = std::fs::read_to_string(candidates).map_err(|source| CliError::Read {
                path: candidates.clone(),
                source,
            })?;
            let candidates: Vec<CatalogCandidate> = serde_json::from_str(&raw)?;
            tracing::debug!(count = candidates.len(), "Loaded candidates");

            let outcome = external_id
                .and_then(|id| scorer::identify(id, &candidates))
                .or_else(|| scorer::score(title, &candidates, *year, &config.scoring));
            Ok(serde_json::to_string_pretty(&outcome)?)
        }
    }
}
