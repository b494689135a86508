// ABOUTME: Submits one remote reindex task per source index and polls them to completion
// ABOUTME: Per-job failures are logged and isolated; only setup errors abort a run

use std::time::Duration;
use tracing::{error, info, warn};

use super::job::{JobState, MigrationJob, MigrationRun};
use crate::config::{MigrationConfig, RemoteCredentials};
use crate::error::{MigratorError, Result};
use crate::remote::SearchClusterClient;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub dest_index: String,
    pub remote: RemoteCredentials,
    pub poll_interval: Duration,
}

impl OrchestratorSettings {
    pub fn from_config(config: &MigrationConfig) -> Self {
        Self {
            dest_index: config.target_index.clone(),
            remote: config.es_source_remote.clone(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub completed: Vec<String>,
    /// `(source_index, reason)` for every failed job, including failed submissions.
    pub failed: Vec<(String, String)>,
    pub cycles: u32,
    pub elapsed: Duration,
}

impl RunSummary {
    fn from_run(run: &MigrationRun, cycles: u32) -> Self {
        let mut summary = RunSummary {
            cycles,
            elapsed: run.elapsed(),
            ..Default::default()
        };
        for job in run.jobs() {
            match job.state() {
                JobState::Completed => summary.completed.push(job.source_index().to_string()),
                JobState::Failed => summary.failed.push((
                    job.source_index().to_string(),
                    job.failure().unwrap_or_default().to_string(),
                )),
                JobState::Pending | JobState::Submitted => {}
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Orchestrator<C> {
    client: C,
    settings: OrchestratorSettings,
}

impl<C: SearchClusterClient> Orchestrator<C> {
    pub fn new(client: C, settings: OrchestratorSettings) -> Self {
        Self { client, settings }
    }

    #[cfg(test)]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Submits and polls every source index, then logs the elapsed time.
    ///
    /// There is no overall timeout: a task the cluster never finishes keeps
    /// the loop polling until the process is killed.
    pub async fn run(&self, sources: &[String]) -> RunSummary {
        let mut run = self.submit_all(sources).await;
        let cycles = self.poll_until_done(&mut run).await;
        let summary = RunSummary::from_run(&run, cycles);

        info!(
            "Migration completed in {:.2} seconds ({} completed, {} failed)",
            summary.elapsed.as_secs_f64(),
            summary.completed.len(),
            summary.failed.len()
        );
        summary
    }

    /// Submits one reindex task per source index, in order. A failed
    /// submission leaves its job failed and never polled.
    pub async fn submit_all(&self, sources: &[String]) -> MigrationRun {
        let mut run = MigrationRun::new();
        for source in sources {
            let mut job = MigrationJob::new(source.as_str(), self.settings.dest_index.as_str());
            self.submit(&mut job).await;
            run.push(job);
        }
        run
    }

    async fn submit(&self, job: &mut MigrationJob) {
        info!(
            "Attempting to start reindex from {} on remote {} to {} on target cluster",
            job.source_index(),
            self.settings.remote.host,
            job.dest_index()
        );

        let submitted = self
            .client
            .submit_reindex(job.source_index(), job.dest_index(), &self.settings.remote)
            .await
            .and_then(|task_id| {
                if task_id.trim().is_empty() {
                    anyhow::bail!("cluster returned an empty task id");
                }
                Ok(task_id)
            });

        match submitted {
            Ok(task_id) => {
                info!(
                    "Reindex task started successfully. Source: {}, Target: {}, Task ID: {}",
                    job.source_index(),
                    job.dest_index(),
                    task_id
                );
                log_transition(job.mark_submitted(task_id));
            }
            Err(err) => {
                let err = MigratorError::Submission {
                    index: job.source_index().to_string(),
                    reason: format!("{:#}", err),
                };
                error!("{}", err);
                log_transition(job.mark_failed(err.to_string()));
            }
        }
    }

    /// Sleeps one interval before every cycle until no job is active.
    /// Returns the number of cycles run.
    pub async fn poll_until_done(&self, run: &mut MigrationRun) -> u32 {
        let mut cycles = 0;
        while !run.is_finished() {
            tokio::time::sleep(self.settings.poll_interval).await;
            self.poll_cycle(run).await;
            cycles += 1;
        }
        cycles
    }

    /// Queries every active job once, in order.
    pub async fn poll_cycle(&self, run: &mut MigrationRun) {
        for job in run.active_jobs_mut() {
            self.poll(job).await;
        }
    }

    async fn poll(&self, job: &mut MigrationJob) {
        let Some(task_id) = job.task_id().map(str::to_string) else {
            return;
        };

        let status = match self.client.get_task_status(&task_id).await {
            Ok(status) => {
                info!(
                    "Checked status for task {}: {}",
                    task_id,
                    if status.completed { "completed" } else { "in progress" }
                );
                status
            }
            Err(err) => {
                let err = MigratorError::Poll {
                    task_id: task_id.clone(),
                    reason: format!("{:#}", err),
                };
                error!("{}", err);
                log_transition(job.mark_failed(err.to_string()));
                return;
            }
        };

        if !status.completed {
            match status.progress() {
                Some(p) if p.total > 0 => info!(
                    "Reindexing task for {} is still in progress ({} created, {} updated of {})",
                    job.source_index(),
                    p.created,
                    p.updated,
                    p.total
                ),
                _ => info!(
                    "Reindexing task for {} is still in progress...",
                    job.source_index()
                ),
            }
            return;
        }

        match status.error_message() {
            Some(reason) => {
                let err = MigratorError::RemoteJob {
                    index: job.source_index().to_string(),
                    reason,
                };
                error!("{}", err);
                log_transition(job.mark_failed(err.to_string()));
            }
            None => {
                let failures = status.failure_count();
                if failures > 0 {
                    warn!(
                        "Reindexing task for {} reported {} document failures",
                        job.source_index(),
                        failures
                    );
                }
                info!(
                    "Reindexing task for {} completed successfully.",
                    job.source_index()
                );
                log_transition(job.mark_completed());
            }
        }
    }
}

fn log_transition(result: Result<()>) {
    if let Err(err) = result {
        error!("{}", err);
    }
}
