mod common;

use std::ops::ControlFlow;
use std::time::Duration;

use actors::{FnHandler, HandlerFuture, JobHandlerRegistry};
use publish_core::{Account, Job, JobEvent, PublishItemResult, PublishOperation};
use publishing::{
    CancelBehavior, CancelOutcome, CancellationController, PublishError, PublishRun,
    PublishSettings,
};

use common::{TestResult, eventually, start};

#[test]
fn test_checkpoint_follows_cancel_behavior() -> TestResult {
    let job = Job::publish("Publish site", "publish");
    let hard = PublishRun::new(&job, &PublishSettings::default());
    let soft = PublishRun::new(
        &job,
        &PublishSettings::default().with_cancel_behavior(CancelBehavior::Soft),
    );

    assert!(!hard.is_canceled());
    assert_eq!(hard.checkpoint()?, ControlFlow::Continue(()));
    assert_eq!(soft.checkpoint()?, ControlFlow::Continue(()));

    job.publish_status().ok_or("publish status")?.force_finish();

    assert!(hard.is_canceled());
    assert!(matches!(hard.checkpoint(), Err(PublishError::Canceled)));
    assert_eq!(soft.checkpoint()?, ControlFlow::Break(()));
    Ok(())
}

#[test]
fn test_record_item_updates_statistics() {
    let job = Job::publish("Publish site", "publish").with_total(2);
    let run = PublishRun::new(&job, &PublishSettings::default());

    run.record_item("a", Some("Home"), Some(PublishItemResult::new(PublishOperation::Created)));
    run.record_item("b", None, Some(PublishItemResult::new(PublishOperation::None)));

    let stats = run.statistics();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(job.status.processed(), 1);
    assert_eq!(job.status.total(), 2);
}

/// Job body that publishes items until its run is canceled.
fn publisher(
    settings: PublishSettings,
) -> FnHandler<impl Fn(&Job) -> HandlerFuture + Send + Sync + 'static> {
    FnHandler::new("publish", move |job: &Job| -> HandlerFuture {
        let run = PublishRun::new(job, &settings);
        Box::pin(async move {
            let mut item = 0u64;
            loop {
                match run.checkpoint() {
                    Ok(ControlFlow::Continue(())) => {}
                    Ok(ControlFlow::Break(())) => return Ok(()),
                    Err(e) => return Err(e.to_string()),
                }
                item += 1;
                run.record_item(
                    format!("item-{}", item),
                    None,
                    Some(PublishItemResult::new(PublishOperation::Updated)),
                );
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
    })
}

async fn finish_error(
    behavior: CancelBehavior,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let mut handlers = JobHandlerRegistry::new();
    handlers.register(publisher(
        PublishSettings::default().with_cancel_behavior(behavior),
    ));
    let scheduler = start(1, handlers).await?;
    let mut events = scheduler.subscribe();
    let controller = CancellationController::new(scheduler.clone());

    let job = Job::publish("Publish site", "publish");
    let handle = scheduler.submit(job.clone()).await?;
    assert!(eventually(|| job.status.processed() >= 3).await);

    let outcome = controller
        .cancel_job(&Account::administrator("admin"), Some(&job))
        .await?;
    assert_eq!(outcome, CancelOutcome::FinishRequested);

    let error = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(JobEvent::Finished { handle: h, error, .. }) if h == handle => return Ok(error),
                Ok(_) => continue,
                Err(e) => return Err(e),
            }
        }
    })
    .await??;

    let processed = job.status.processed();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(job.status.processed(), processed);

    scheduler.shutdown();
    Ok(error)
}

#[tokio::test]
async fn test_hard_stop_aborts_running_job() -> TestResult {
    let error = finish_error(CancelBehavior::HardStop).await?;
    assert_eq!(error.as_deref(), Some("Publishing job was canceled"));
    Ok(())
}

#[tokio::test]
async fn test_soft_stop_completes_running_job() -> TestResult {
    let error = finish_error(CancelBehavior::Soft).await?;
    assert_eq!(error, None);
    Ok(())
}
