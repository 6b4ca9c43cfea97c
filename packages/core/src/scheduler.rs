//! Boundary to the job scheduler that owns the canonical set of jobs.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Job, JobHandle};

/// Scheduler boundary errors.
///
/// Any of these means the scheduler's own structures could not be read or
/// changed, so the calling operation has to be abandoned.
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),
    #[error("Scheduler rejected the request: {0}")]
    Rejected(String),
}

/// Operations the publishing subsystem needs from a job scheduler.
pub trait JobScheduler: Send + Sync + 'static {
    /// Enumerate every job the scheduler currently knows about.
    fn jobs(&self) -> impl Future<Output = Result<Vec<Job>, SchedulerError>> + Send;

    /// Look up a single job by handle.
    fn job(
        &self,
        handle: JobHandle,
    ) -> impl Future<Output = Result<Option<Job>, SchedulerError>> + Send;

    /// Take a queued job off the queue and finish it without running it.
    ///
    /// This must be atomic with respect to the scheduler handing the job to
    /// a worker. Returns `false` when the job was no longer queued.
    fn remove_from_queue_and_finish(
        &self,
        handle: JobHandle,
    ) -> impl Future<Output = Result<bool, SchedulerError>> + Send;
}

/// Configuration for scheduler behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of concurrent workers.
    pub concurrency: u32,
    /// How long a finished job stays listed (seconds).
    pub after_life_secs: u64,
    /// How often idle workers ask for work (milliseconds).
    pub poll_interval_ms: u64,
    /// How often expired finished jobs are reclaimed (milliseconds).
    pub sweep_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            after_life_secs: 60,
            poll_interval_ms: 100,
            sweep_interval_ms: 30_000,
        }
    }
}

impl SchedulerConfig {
    /// Set the number of workers.
    pub fn with_concurrency(mut self, concurrency: u32) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set how long finished jobs stay listed.
    pub fn with_after_life(mut self, after_life: Duration) -> Self {
        self.after_life_secs = after_life.as_secs();
        self
    }

    /// Set the worker poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the reclaim sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn after_life(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.after_life_secs as i64)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}
