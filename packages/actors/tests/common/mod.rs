use std::time::Duration;

use actors::{FnHandler, HandlerFuture, JobHandlerRegistry, Scheduler, start_scheduler};
use publish_core::{Job, JobScheduler, JobState, SchedulerConfig};

pub fn test_config(concurrency: u32) -> SchedulerConfig {
    SchedulerConfig::default()
        .with_concurrency(concurrency)
        .with_poll_interval(Duration::from_millis(5))
        .with_sweep_interval(Duration::from_millis(20))
}

/// Handler that keeps running until its publish run is forced to finish.
pub fn until_finished(
    category: &'static str,
) -> FnHandler<impl Fn(&Job) -> HandlerFuture + Send + Sync + 'static> {
    FnHandler::new(category, |job: &Job| -> HandlerFuture {
        let status = job.publish_status().cloned();
        Box::pin(async move {
            while let Some(ref status) = status {
                if status.is_finished() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            Ok(())
        })
    })
}

pub async fn start(
    config: SchedulerConfig,
    handlers: JobHandlerRegistry,
) -> Result<Scheduler, Box<dyn std::error::Error>> {
    let (scheduler, _handle) = start_scheduler(config, handlers).await?;
    Ok(scheduler)
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

pub async fn count_in_state(scheduler: &Scheduler, state: JobState) -> usize {
    scheduler
        .jobs()
        .await
        .map(|jobs| jobs.iter().filter(|job| job.status.state() == state).count())
        .unwrap_or(0)
}

/// Wait until exactly `count` listed jobs are in `state`.
pub async fn wait_for_count(scheduler: &Scheduler, state: JobState, count: usize) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if count_in_state(scheduler, state).await == count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
