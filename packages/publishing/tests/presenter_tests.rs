mod common;

use std::time::Duration;

use actors::JobHandlerRegistry;
use publish_core::{Account, Job, JobHandle, JobState};
use publishing::{
    ALREADY_COMPLETED, CONFIRM_CANCEL, CONFIRM_CANCEL_ALL, CancelReply, EMPTY_LIST_MESSAGE,
    JobList, JobListPresenter, NOT_ALLOWED, NOTHING_TO_CANCEL, Prompt, PublishSettings,
    SELECT_JOB_FIRST,
};
use tokio::sync::watch;

use common::{TestResult, eventually, gated, instant, start, submit_running};

#[tokio::test]
async fn test_empty_list_shows_message() -> TestResult {
    let scheduler = start(0, JobHandlerRegistry::new()).await?;
    let presenter = JobListPresenter::new(scheduler.clone(), PublishSettings::default());

    let list = presenter.refresh().await?;
    assert_eq!(
        list,
        JobList::Empty {
            message: EMPTY_LIST_MESSAGE.to_string()
        }
    );
    assert!(list.rows().is_empty());

    let json = serde_json::to_value(&list)?;
    assert_eq!(json["kind"], "empty");

    scheduler.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_rows_render_progress_and_keep_selection() -> TestResult {
    let scheduler = start(0, JobHandlerRegistry::new()).await?;
    let mut presenter = JobListPresenter::new(scheduler.clone(), PublishSettings::default());

    let counted = Job::publish("Publish site", "publish")
        .with_owner(Account::new("editor"))
        .with_total(40);
    let open_ended = Job::publish("Publish media", "publish");
    scheduler.submit(counted.clone()).await?;
    scheduler.submit(open_ended.clone()).await?;
    for _ in 0..3 {
        counted.status.increment_processed();
    }

    presenter.select(Some(&counted.handle.to_string()));
    let list = presenter.refresh().await?;
    let rows = list.rows();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].id, counted.handle.to_string());
    assert_eq!(rows[0].header, "Publish site");
    assert_eq!(rows[0].state, "Queued");
    assert_eq!(rows[0].owner, "editor");
    assert_eq!(rows[0].processed, "3/40");
    assert!(!rows[0].started.is_empty());
    assert!(rows[0].selected);

    assert_eq!(rows[1].owner, "Unknown");
    assert_eq!(rows[1].processed, "0");
    assert!(!rows[1].selected);

    // The selection survives the next refresh.
    let list = presenter.refresh().await?;
    assert!(list.rows()[0].selected);

    scheduler.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_cancel_prompts() -> TestResult {
    let (open, gate) = watch::channel(false);
    let mut handlers = JobHandlerRegistry::new();
    handlers.register(gated("publish", gate));
    let scheduler = start(1, handlers).await?;
    let mut presenter = JobListPresenter::new(scheduler.clone(), PublishSettings::default());

    assert_eq!(presenter.prompt_cancel().await?, Prompt::Alert(SELECT_JOB_FIRST.to_string()));
    assert_eq!(
        presenter.prompt_cancel_all().await?,
        Prompt::Alert(NOTHING_TO_CANCEL.to_string())
    );

    let job = Job::publish("Publish site", "publish");
    submit_running(&scheduler, std::slice::from_ref(&job)).await?;
    presenter.select(Some(&job.handle.to_string()));

    assert_eq!(presenter.prompt_cancel().await?, Prompt::Confirm(CONFIRM_CANCEL.to_string()));
    assert_eq!(
        presenter.prompt_cancel_all().await?,
        Prompt::Confirm(CONFIRM_CANCEL_ALL.to_string())
    );

    let _ = open.send(true);
    if let Some(status) = job.publish_status() {
        status.force_finish();
    }
    scheduler.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_stale_selection_asks_for_a_new_one() -> TestResult {
    let scheduler = start(0, JobHandlerRegistry::new()).await?;
    let mut presenter = JobListPresenter::new(scheduler.clone(), PublishSettings::default());

    let job = Job::publish("Publish site", "publish");
    scheduler.submit(job.clone()).await?;
    presenter.select(Some(&job.handle.to_string()));
    assert_eq!(presenter.prompt_cancel().await?, Prompt::Confirm(CONFIRM_CANCEL.to_string()));

    // A handle the scheduler never knew, then garbage left over in the list.
    presenter.select(Some(&JobHandle::new().to_string()));
    assert_eq!(presenter.prompt_cancel().await?, Prompt::Alert(SELECT_JOB_FIRST.to_string()));
    presenter.select(Some("row-3"));
    assert_eq!(presenter.prompt_cancel().await?, Prompt::Alert(SELECT_JOB_FIRST.to_string()));

    scheduler.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_confirm_cancel_checks_permission() -> TestResult {
    let scheduler = start(0, JobHandlerRegistry::new()).await?;
    let mut presenter = JobListPresenter::new(scheduler.clone(), PublishSettings::default());
    let editor = Account::new("editor");

    let job = Job::publish("Publish site", "publish");
    scheduler.submit(job.clone()).await?;
    presenter.select(Some(&job.handle.to_string()));

    assert!(!presenter.can_cancel(&editor));
    assert_eq!(
        presenter.confirm_cancel(&editor).await?,
        CancelReply::Refused(Prompt::Alert(NOT_ALLOWED.to_string()))
    );
    assert_eq!(
        presenter.confirm_cancel_all(&editor).await?,
        CancelReply::Refused(Prompt::Alert(NOT_ALLOWED.to_string()))
    );
    assert_eq!(job.status.state(), JobState::Queued);

    let presenter_with_button = {
        let mut p = JobListPresenter::new(
            scheduler.clone(),
            PublishSettings::default().with_cancel_button(true),
        );
        p.select(presenter.selected());
        p
    };
    assert_eq!(
        presenter_with_button.confirm_cancel(&editor).await?,
        CancelReply::Canceled(1)
    );
    assert_eq!(job.status.state(), JobState::Finished);

    scheduler.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_confirm_cancel_reports_completed_job() -> TestResult {
    let mut handlers = JobHandlerRegistry::new();
    handlers.register(instant("publish"));
    let scheduler = start(1, handlers).await?;
    let mut presenter = JobListPresenter::new(scheduler.clone(), PublishSettings::default());
    let admin = Account::administrator("admin");

    let job = Job::publish("Publish site", "publish");
    scheduler.submit(job.clone()).await?;
    assert!(eventually(|| job.status.state() == JobState::Finished).await);

    presenter.select(Some(&job.handle.to_string()));
    assert_eq!(
        presenter.confirm_cancel(&admin).await?,
        CancelReply::Refused(Prompt::Alert(ALREADY_COMPLETED.to_string()))
    );

    presenter.select(None);
    assert_eq!(
        presenter.confirm_cancel(&admin).await?,
        CancelReply::Refused(Prompt::Alert(SELECT_JOB_FIRST.to_string()))
    );
    assert_eq!(presenter.confirm_cancel_all(&admin).await?, CancelReply::Canceled(0));

    scheduler.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_refresh_loop_publishes_lists() -> TestResult {
    let scheduler = start(0, JobHandlerRegistry::new()).await?;
    let presenter = JobListPresenter::new(
        scheduler.clone(),
        PublishSettings::default().with_refresh_interval(Duration::from_millis(10)),
    );
    let (mut lists, task) = presenter.spawn_refresh();

    let job = Job::publish("Publish site", "publish");
    scheduler.submit(job.clone()).await?;

    let seen = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if lists.changed().await.is_err() {
                return false;
            }
            let shown = lists
                .borrow_and_update()
                .rows()
                .iter()
                .any(|row| row.id == job.handle.to_string());
            if shown {
                return true;
            }
        }
    })
    .await?;
    assert!(seen);

    drop(lists);
    tokio::time::timeout(Duration::from_secs(5), task).await??;

    scheduler.shutdown();
    Ok(())
}
