// ABOUTME: Command line entry point for the reindex migrator
// ABOUTME: Parses --config, installs logging and maps the run outcome to an exit code

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reindex-migrator")]
#[command(version)]
#[command(about = "Migrate indices from Elasticsearch to OpenSearch.", long_about = None)]
struct Cli {
    /// Path to the configuration YAML file.
    #[arg(long, value_name = "FILE")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match reindex_migrator::migrate(&cli.config).await {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            for (index, reason) in &summary.failed {
                warn!("Not migrated: {} ({})", index, reason);
            }
            ExitCode::FAILURE
        }
        Err(err) if err.is_fatal() => {
            error!("Migration aborted before any reindex task was submitted: {}", err);
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("Migration failed. Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
