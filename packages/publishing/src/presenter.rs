//! Headless model of the publishing job list and its cancel actions.

use std::sync::Arc;

use chrono::Local;
use publish_core::{Account, JobScheduler, JobSnapshot, JobState};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cancel::{CancelOutcome, CancellationController};
use crate::error::PublishResult;
use crate::query::JobQuery;
use crate::settings::PublishSettings;

pub const EMPTY_LIST_MESSAGE: &str = "There are no publishing jobs to display.";
pub const CONFIRM_CANCEL: &str = "Are you sure you want to cancel selected publishing job?";
pub const SELECT_JOB_FIRST: &str = "Please select a job from the list to cancel.";
pub const CONFIRM_CANCEL_ALL: &str = "Are you sure you want to cancel all current publishing jobs?";
pub const NOTHING_TO_CANCEL: &str = "There are no publishing jobs to cancel.";
pub const ALREADY_COMPLETED: &str = "This job has already been completed.";
pub const NOT_ALLOWED: &str = "You do not have permission to cancel publishing jobs.";

/// One rendered job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRow {
    pub id: String,
    pub header: String,
    pub name: String,
    pub category: String,
    pub state: String,
    pub owner: String,
    pub processed: String,
    pub started: String,
    pub selected: bool,
}

impl JobRow {
    fn render(snapshot: &JobSnapshot, selected: Option<&str>) -> Self {
        let processed = match snapshot.total() {
            0 => snapshot.processed().to_string(),
            total => format!("{}/{}", snapshot.processed(), total),
        };
        let started = snapshot
            .queue_time()
            .map(|time| time.with_timezone(&Local).format("%-I:%M:%S %p").to_string())
            .unwrap_or_default();

        Self {
            id: snapshot.handle().to_string(),
            header: snapshot.name().to_string(),
            name: snapshot.name().to_string(),
            category: snapshot.category().to_string(),
            state: snapshot.state().to_string(),
            owner: snapshot.owner_name().to_string(),
            processed,
            started,
            selected: selected == Some(snapshot.handle()),
        }
    }
}

/// Rendered job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobList {
    /// No publish jobs; show the message instead of rows.
    Empty { message: String },
    Rows { rows: Vec<JobRow> },
}

impl JobList {
    fn empty() -> Self {
        JobList::Empty {
            message: EMPTY_LIST_MESSAGE.to_string(),
        }
    }

    pub fn rows(&self) -> &[JobRow] {
        match self {
            JobList::Empty { .. } => &[],
            JobList::Rows { rows } => rows,
        }
    }
}

/// Something to show the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Prompt {
    /// Ask before going ahead.
    Confirm(String),
    /// Inform; there is nothing to confirm.
    Alert(String),
}

impl Prompt {
    fn alert(text: &str) -> Self {
        Prompt::Alert(text.to_string())
    }

    fn confirm(text: &str) -> Self {
        Prompt::Confirm(text.to_string())
    }
}

/// Result of a confirmed cancel action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReply {
    /// Number of jobs canceled.
    Canceled(usize),
    /// Nothing was canceled; tell the operator why.
    Refused(Prompt),
}

/// Job list with a selection and cancel actions.
pub struct JobListPresenter<S> {
    query: JobQuery<S>,
    controller: CancellationController<S>,
    settings: PublishSettings,
    selected: Option<String>,
}

impl<S: JobScheduler> JobListPresenter<S> {
    pub fn new(scheduler: Arc<S>, settings: PublishSettings) -> Self {
        Self {
            query: JobQuery::new(scheduler.clone()),
            controller: CancellationController::new(scheduler),
            settings,
            selected: None,
        }
    }

    /// Select a row by handle, or clear the selection.
    pub fn select(&mut self, handle: Option<&str>) {
        self.selected = handle
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Check whether `account` may use the cancel actions.
    pub fn can_cancel(&self, account: &Account) -> bool {
        self.settings.can_cancel(account)
    }

    /// Render the current publish jobs, keeping the selection.
    pub async fn refresh(&self) -> PublishResult<JobList> {
        let listing = self.query.list_publish_jobs().await?;
        if listing.is_empty() {
            return Ok(JobList::empty());
        }

        let selected = self.selected.as_deref();
        Ok(JobList::Rows {
            rows: listing
                .iter()
                .map(|snapshot| JobRow::render(&snapshot, selected))
                .collect(),
        })
    }

    /// Prompt shown when the operator asks to cancel the selected job.
    ///
    /// A selection that no longer resolves to a job counts as no selection.
    pub async fn prompt_cancel(&self) -> PublishResult<Prompt> {
        let job = self.query.find_selected(self.selected.as_deref()).await?;
        Ok(match job {
            Some(_) => Prompt::confirm(CONFIRM_CANCEL),
            None => Prompt::alert(SELECT_JOB_FIRST),
        })
    }

    /// Prompt shown when the operator asks to cancel all jobs.
    pub async fn prompt_cancel_all(&self) -> PublishResult<Prompt> {
        let running = self.query.list_publish_jobs_in_state(JobState::Running).await?;
        Ok(if running.is_empty() {
            Prompt::alert(NOTHING_TO_CANCEL)
        } else {
            Prompt::confirm(CONFIRM_CANCEL_ALL)
        })
    }

    /// Cancel the selected job after the operator confirmed.
    pub async fn confirm_cancel(&self, actor: &Account) -> PublishResult<CancelReply> {
        if !self.can_cancel(actor) {
            return Ok(CancelReply::Refused(Prompt::alert(NOT_ALLOWED)));
        }
        let Some(selected) = self.selected.as_deref() else {
            return Ok(CancelReply::Refused(Prompt::alert(SELECT_JOB_FIRST)));
        };

        Ok(match self.controller.cancel_handle(actor, selected).await? {
            CancelOutcome::NotFound => CancelReply::Refused(Prompt::alert(SELECT_JOB_FIRST)),
            CancelOutcome::AlreadyCompleted => {
                CancelReply::Refused(Prompt::alert(ALREADY_COMPLETED))
            }
            _ => CancelReply::Canceled(1),
        })
    }

    /// Cancel all unfinished publish jobs after the operator confirmed.
    pub async fn confirm_cancel_all(&self, actor: &Account) -> PublishResult<CancelReply> {
        if !self.can_cancel(actor) {
            return Ok(CancelReply::Refused(Prompt::alert(NOT_ALLOWED)));
        }
        Ok(CancelReply::Canceled(self.controller.cancel_all(actor).await?))
    }

    /// Re-render the list every refresh interval.
    ///
    /// The loop ends once every receiver is dropped. Failed refreshes are
    /// logged and the previous list is kept.
    pub fn spawn_refresh(self) -> (watch::Receiver<JobList>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(JobList::empty());
        let period = self.settings.refresh_interval();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match self.refresh().await {
                    Ok(list) => {
                        if tx.send(list).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Publish jobs: failed to refresh job list: {}", e);
                        if tx.is_closed() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Publish jobs: refresh loop stopped");
        });

        (rx, handle)
    }
}
