// ABOUTME: Library root for the reindex migrator
// ABOUTME: Copies indices between clusters through remote reindex tasks on the target

pub mod config;
pub mod error;
pub mod migration;
pub mod remote;

pub use config::{MigrationConfig, RemoteCredentials, TargetClusterConfig};
pub use error::{MigratorError, Result};
pub use migration::{migrate, Orchestrator, OrchestratorSettings, RunSummary};
pub use remote::{ClusterClient, SearchClusterClient};
