// ABOUTME: Error taxonomy for the reindex migrator
// ABOUTME: Fatal run errors (config, client init) and per-job errors (submit, poll, remote)

use thiserror::Error;

use crate::migration::JobState;

pub type Result<T> = std::result::Result<T, MigratorError>;

#[derive(Debug, Error)]
pub enum MigratorError {
    /// Configuration file missing, unreadable or invalid. Fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target cluster client could not be constructed. Fatal.
    #[error("Client initialization error: {0}")]
    ClientInit(String),

    #[error("Failed to start reindex task for {index}: {reason}")]
    Submission { index: String, reason: String },

    #[error("Failed to check status for task {task_id}: {reason}")]
    Poll { task_id: String, reason: String },

    /// The cluster reported the reindex task as finished with an error.
    #[error("Reindex task for {index} failed: {reason}")]
    RemoteJob { index: String, reason: String },

    #[error("Invalid job state transition from {from:?} to {to:?}")]
    InvalidTransition { from: JobState, to: JobState },
}

impl MigratorError {
    /// Whether this error aborts the whole run rather than a single job.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MigratorError::Config(_) | MigratorError::ClientInit(_))
    }
}
