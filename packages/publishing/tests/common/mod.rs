#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actors::{FnHandler, HandlerFuture, JobHandlerRegistry, Scheduler, start_scheduler};
use publish_core::{Job, JobHandle, JobScheduler, JobState, SchedulerConfig, SchedulerError};
use tokio::sync::watch;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn test_config(concurrency: u32) -> SchedulerConfig {
    SchedulerConfig::default()
        .with_concurrency(concurrency)
        .with_poll_interval(Duration::from_millis(5))
        .with_sweep_interval(Duration::from_millis(20))
}

pub async fn start(
    concurrency: u32,
    handlers: JobHandlerRegistry,
) -> Result<Arc<Scheduler>, Box<dyn std::error::Error>> {
    let (scheduler, _handle) = start_scheduler(test_config(concurrency), handlers).await?;
    Ok(Arc::new(scheduler))
}

/// Handler that returns as soon as it starts.
pub fn instant(
    category: &'static str,
) -> FnHandler<impl Fn(&Job) -> HandlerFuture + Send + Sync + 'static> {
    FnHandler::new(category, |_job: &Job| -> HandlerFuture { Box::pin(async { Ok(()) }) })
}

/// Handler that keeps running until its run is forced to finish and the
/// test opens the gate.
///
/// Jobs without a publish status only wait for the gate.
pub fn gated(
    category: &'static str,
    gate: watch::Receiver<bool>,
) -> FnHandler<impl Fn(&Job) -> HandlerFuture + Send + Sync + 'static> {
    FnHandler::new(category, move |job: &Job| -> HandlerFuture {
        let status = job.publish_status().cloned();
        let gate = gate.clone();
        Box::pin(async move {
            loop {
                let finished = status.as_ref().is_none_or(|status| status.is_finished());
                let open = *gate.borrow();
                if finished && open {
                    return Ok(());
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
    })
}

/// Poll `check` until it holds or five seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Submit jobs and wait until they are all running.
pub async fn submit_running(scheduler: &Scheduler, jobs: &[Job]) -> TestResult {
    for job in jobs {
        scheduler.submit(job.clone()).await?;
    }
    if !eventually(|| jobs.iter().all(|job| job.status.state() == JobState::Running)).await {
        return Err("jobs did not start".into());
    }
    Ok(())
}

/// Scheduler that fails or refuses queue removal for chosen jobs.
pub struct FaultyScheduler {
    pub inner: Arc<Scheduler>,
    /// Removal of these jobs fails with `Unavailable`.
    pub failing: Vec<JobHandle>,
    /// Removal always reports that the job already left the queue.
    pub lose_race: bool,
}

impl JobScheduler for FaultyScheduler {
    async fn jobs(&self) -> Result<Vec<Job>, SchedulerError> {
        self.inner.jobs().await
    }

    async fn job(&self, handle: JobHandle) -> Result<Option<Job>, SchedulerError> {
        self.inner.job(handle).await
    }

    async fn remove_from_queue_and_finish(
        &self,
        handle: JobHandle,
    ) -> Result<bool, SchedulerError> {
        if self.failing.contains(&handle) {
            return Err(SchedulerError::Unavailable("queue is locked".to_string()));
        }
        if self.lose_race {
            return Ok(false);
        }
        self.inner.remove_from_queue_and_finish(handle).await
    }
}
