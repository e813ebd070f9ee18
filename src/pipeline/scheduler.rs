// file: src/pipeline/scheduler.rs
// description: bounded-concurrency execution of independent transfer jobs
// reference: semaphore-gated fan-out over an unordered completion stream

use crate::error::{Result, VaultError};
use crate::pipeline::progress::ProgressTracker;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;
use uuid::Uuid;

/// One independent unit of transfer work. Jobs carry no dependencies on each
/// other; that independence is what makes bounded concurrency safe.
pub struct Job {
    pub id: Uuid,
    pub label: String,
    action: BoxFuture<'static, Result<()>>,
}

impl Job {
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            action: Box::pin(action),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct JobResult {
    pub id: Uuid,
    pub label: String,
    pub outcome: JobOutcome,
}

impl JobResult {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, JobOutcome::Failed(_))
    }
}

/// Terminal outcome of a whole batch, in completion order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<JobResult>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobResult> {
        self.results.iter().filter(|r| r.is_failed())
    }
}

/// Runs batches of independent jobs with at most `limit` in flight at any
/// instant. Every job reaches exactly one terminal outcome; a failing or
/// panicking job releases its capacity and never cancels siblings.
pub struct JobScheduler {
    limit: usize,
}

impl JobScheduler {
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(VaultError::Config(
                "concurrency limit must be greater than 0".to_string(),
            ));
        }
        Ok(Self { limit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Submits all jobs up front and collects their outcomes as they
    /// complete. Completion order is whatever the runtime produces; callers
    /// must not assume submission order. An empty batch completes
    /// immediately.
    pub async fn run(&self, jobs: Vec<Job>, progress: &ProgressTracker) -> BatchReport {
        let semaphore = Arc::new(Semaphore::new(self.limit));

        let tasks = jobs.into_iter().map(|job| {
            let semaphore = semaphore.clone();

            async move {
                let Job { id, label, action } = job;

                let Ok(permit) = semaphore.acquire_owned().await else {
                    // The gate is never closed while a batch runs; fail the
                    // job rather than panic if that ever changes.
                    progress.inc_failed();
                    return JobResult {
                        id,
                        label,
                        outcome: JobOutcome::Failed("scheduler gate closed".to_string()),
                    };
                };

                let joined = tokio::spawn(action).await;
                drop(permit);

                let outcome = match joined {
                    Ok(Ok(())) => {
                        progress.inc_succeeded();
                        JobOutcome::Success
                    }
                    Ok(Err(e)) => {
                        progress.inc_failed();
                        warn!("Job failed for {}: {}", label, e);
                        JobOutcome::Failed(e.to_string())
                    }
                    Err(e) => {
                        progress.inc_failed();
                        warn!("Job panicked for {}: {}", label, e);
                        JobOutcome::Failed(format!("job panicked: {}", e))
                    }
                };

                JobResult { id, label, outcome }
            }
        });

        let results = stream::iter(tasks)
            .buffer_unordered(self.limit)
            .collect::<Vec<_>>()
            .await;

        BatchReport { results }
    }
}
