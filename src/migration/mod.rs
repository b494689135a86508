// ABOUTME: Migration orchestration module
// ABOUTME: Loads a run's configuration, builds the cluster client and drives the reindex jobs

pub mod job;
pub mod orchestrator;

pub use job::{JobState, MigrationJob, MigrationRun};
pub use orchestrator::{Orchestrator, OrchestratorSettings, RunSummary};

use std::path::Path;

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::remote::ClusterClient;

/// Runs a full migration from a configuration file.
///
/// Configuration and client errors are returned before any task is
/// submitted; per-job failures are reported in the summary instead.
pub async fn migrate(config_path: &Path) -> Result<RunSummary> {
    let config = MigrationConfig::from_file(config_path)?;
    let client = ClusterClient::new(&config.es_target_config)?;

    let orchestrator = Orchestrator::new(client, OrchestratorSettings::from_config(&config));
    Ok(orchestrator.run(&config.source_indices).await)
}
