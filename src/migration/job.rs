// ABOUTME: Per-index migration jobs and the run that owns them
// ABOUTME: Enforces the Pending -> Submitted -> Completed/Failed lifecycle

use std::time::Duration;
use tokio::time::Instant;

use crate::error::{MigratorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Submitted,
    Completed,
    Failed,
}

impl JobState {
    /// `Pending -> Failed` is only reachable when submission fails, before a task id exists.
    pub fn can_transition_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Pending, JobState::Submitted)
                | (JobState::Pending, JobState::Failed)
                | (JobState::Submitted, JobState::Completed)
                | (JobState::Submitted, JobState::Failed)
        )
    }
}

/// One reindex of a source index into the destination index.
#[derive(Debug, Clone)]
pub struct MigrationJob {
    source_index: String,
    dest_index: String,
    task_id: Option<String>,
    state: JobState,
    failure: Option<String>,
}

impl MigrationJob {
    pub fn new(source_index: impl Into<String>, dest_index: impl Into<String>) -> Self {
        Self {
            source_index: source_index.into(),
            dest_index: dest_index.into(),
            task_id: None,
            state: JobState::Pending,
            failure: None,
        }
    }

    pub fn source_index(&self) -> &str {
        &self.source_index
    }

    pub fn dest_index(&self) -> &str {
        &self.dest_index
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Only submitted jobs are polled.
    pub fn is_active(&self) -> bool {
        self.state == JobState::Submitted
    }

    pub fn mark_submitted(&mut self, task_id: impl Into<String>) -> Result<()> {
        self.transition(JobState::Submitted)?;
        self.task_id = Some(task_id.into());
        Ok(())
    }

    pub fn mark_completed(&mut self) -> Result<()> {
        self.transition(JobState::Completed)
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(JobState::Failed)?;
        self.failure = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, next: JobState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(MigratorError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

/// All jobs of one invocation, in configuration order. Finished jobs stay
/// here for the summary; the active set is the submitted ones.
#[derive(Debug)]
pub struct MigrationRun {
    jobs: Vec<MigrationJob>,
    started: Instant,
}

impl MigrationRun {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn push(&mut self, job: MigrationJob) {
        self.jobs.push(job);
    }

    pub fn jobs(&self) -> &[MigrationJob] {
        &self.jobs
    }

    pub fn active_jobs_mut(&mut self) -> impl Iterator<Item = &mut MigrationJob> {
        self.jobs.iter_mut().filter(|job| job.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.jobs.iter().filter(|job| job.is_active()).count()
    }

    pub fn is_finished(&self) -> bool {
        self.active_count() == 0
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for MigrationRun {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_lifecycle() {
        let mut job = MigrationJob::new("logs-2023", "logs-archive");
        assert_eq!(job.state(), JobState::Pending);
        assert!(job.task_id().is_none());

        job.mark_submitted("task-1").unwrap();
        assert_eq!(job.state(), JobState::Submitted);
        assert_eq!(job.task_id(), Some("task-1"));
        assert!(job.is_active());

        job.mark_completed().unwrap();
        assert_eq!(job.state(), JobState::Completed);
        assert!(!job.is_active());
    }

    #[test]
    fn test_submission_failure_has_no_task_id() {
        let mut job = MigrationJob::new("logs-2023", "logs-archive");
        job.mark_failed("connection refused").unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert!(job.task_id().is_none());
        assert_eq!(job.failure(), Some("connection refused"));
    }

    #[test]
    fn test_pending_cannot_complete() {
        let mut job = MigrationJob::new("logs-2023", "logs-archive");
        let err = job.mark_completed().unwrap_err();
        assert!(matches!(
            err,
            MigratorError::InvalidTransition {
                from: JobState::Pending,
                to: JobState::Completed
            }
        ));
        assert_eq!(job.state(), JobState::Pending);
    }

    #[test]
    fn test_terminal_states_never_change() {
        let mut job = MigrationJob::new("logs-2023", "logs-archive");
        job.mark_submitted("task-1").unwrap();
        job.mark_failed("mapping conflict").unwrap();

        assert!(job.mark_completed().is_err());
        assert!(job.mark_submitted("task-2").is_err());
        assert!(job.mark_failed("again").is_err());
        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.task_id(), Some("task-1"));
        assert_eq!(job.failure(), Some("mapping conflict"));
    }

    #[test]
    fn test_transition_table() {
        use JobState::*;
        let all = [Pending, Submitted, Completed, Failed];
        for from in all {
            for to in all {
                let expected = matches!(
                    (from, to),
                    (Pending, Submitted) | (Pending, Failed) | (Submitted, Completed) | (Submitted, Failed)
                );
                assert_eq!(from.can_transition_to(to), expected, "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn test_run_active_set() {
        let mut run = MigrationRun::new();
        let mut submitted = MigrationJob::new("a", "dest");
        submitted.mark_submitted("task-a").unwrap();
        let mut failed = MigrationJob::new("b", "dest");
        failed.mark_failed("refused").unwrap();
        run.push(submitted);
        run.push(failed);

        assert_eq!(run.jobs().len(), 2);
        assert_eq!(run.active_count(), 1);
        assert!(!run.is_finished());

        for job in run.active_jobs_mut() {
            job.mark_completed().unwrap();
        }
        assert!(run.is_finished());
    }
}
