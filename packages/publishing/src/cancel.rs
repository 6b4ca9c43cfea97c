//! Forced cancellation of publish jobs.

use std::sync::Arc;

use chrono::Utc;
use publish_core::{Account, Job, JobScheduler, JobState};

use crate::error::PublishResult;
use crate::query::JobQuery;

/// Result of cancelling a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Nothing was selected or the handle no longer resolves.
    NotFound,
    /// The job had already finished. Nothing was changed.
    AlreadyCompleted,
    /// The job was still queued and went straight to the finished set.
    Dequeued,
    /// The job's publish run was forced to finish; its workers stop at their
    /// next checkpoint.
    FinishRequested,
    /// The job has no publish status, so it was only expired and audited.
    ExpiredOnly,
}

impl CancelOutcome {
    /// Check whether the job was actually acted upon.
    pub fn is_canceled(&self) -> bool {
        matches!(
            self,
            CancelOutcome::Dequeued | CancelOutcome::FinishRequested | CancelOutcome::ExpiredOnly
        )
    }
}

/// Drives forced cancellation of publish jobs on a scheduler.
pub struct CancellationController<S> {
    query: JobQuery<S>,
}

impl<S> Clone for CancellationController<S> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
        }
    }
}

impl<S: JobScheduler> CancellationController<S> {
    pub fn new(scheduler: Arc<S>) -> Self {
        Self {
            query: JobQuery::new(scheduler),
        }
    }

    /// Get the query used to resolve jobs.
    pub fn query(&self) -> &JobQuery<S> {
        &self.query
    }

    /// Force a job to stop.
    ///
    /// A queued job is removed from the queue and finished without ever
    /// running. A running job has its publish run forced to `Finished` and
    /// is left to stop cooperatively; this call does not wait for it.
    pub async fn cancel_job(
        &self,
        actor: &Account,
        job: Option<&Job>,
    ) -> PublishResult<CancelOutcome> {
        let Some(job) = job else {
            tracing::warn!(
                "Publish cancel: Failed to cancel a publishing job. The job was not found."
            );
            return Ok(CancelOutcome::NotFound);
        };

        if job.status.state().is_terminal() {
            tracing::debug!("Publish cancel: job {} has already been completed", job.handle);
            return Ok(CancelOutcome::AlreadyCompleted);
        }

        let publish_status = job.publish_status();
        if publish_status.is_none() {
            tracing::warn!(
                "Publish cancel: job has no publish status, only expiring \"{}/{}\"",
                job.name,
                job.handle
            );
        }

        // Expire first so a dequeued job is reclaimed right away.
        let previous_expiry = job.status.replace_expiry(Some(Utc::now()));

        let mut outcome = None;
        if job.status.state() == JobState::Queued {
            let removed = match self
                .query
                .scheduler()
                .remove_from_queue_and_finish(job.handle)
                .await
            {
                Ok(removed) => removed,
                Err(e) => {
                    job.status.replace_expiry(previous_expiry);
                    tracing::error!(
                        "Publish cancel: failed to remove job {} from the queue: {}",
                        job.handle,
                        e
                    );
                    return Err(e.into());
                }
            };
            if removed {
                outcome = Some(CancelOutcome::Dequeued);
            } else {
                // A worker dequeued it first.
                tracing::debug!("Publish cancel: job {} left the queue before removal", job.handle);
            }
        }

        let outcome = match outcome {
            Some(outcome) => outcome,
            None => match publish_status {
                Some(status) => {
                    status.force_finish();
                    CancelOutcome::FinishRequested
                }
                None => CancelOutcome::ExpiredOnly,
            },
        };

        if let Some(status) = publish_status {
            status.add_message(format!(
                "Publishing job was forced to finish by \"{}\" user",
                actor.name
            ));
        }
        tracing::info!(
            target: "audit",
            "Publish cancel: Publishing job \"{}/{}\" was forced to finish by \"{}\" user",
            job.name,
            job.handle,
            actor.name
        );

        Ok(outcome)
    }

    /// Resolve a handle string and cancel the job it names.
    pub async fn cancel_handle(
        &self,
        actor: &Account,
        handle: &str,
    ) -> PublishResult<CancelOutcome> {
        let job = self.query.find_selected(Some(handle)).await?;
        self.cancel_job(actor, job.as_ref()).await
    }

    /// Cancel every publish job that has not finished yet.
    ///
    /// Returns how many jobs were canceled. A failure on one job is logged
    /// and the remaining jobs are still attempted.
    pub async fn cancel_all(&self, actor: &Account) -> PublishResult<usize> {
        let listing = self.query.list_publish_jobs().await?;

        let mut canceled = 0;
        for snapshot in listing.iter() {
            if snapshot.state_value() == Some(JobState::Finished) {
                continue;
            }
            match self.cancel_handle(actor, snapshot.handle()).await {
                Ok(outcome) if outcome.is_canceled() => canceled += 1,
                Ok(_) => {}
                Err(e) => tracing::error!(
                    "Publish cancel: failed to cancel job {}: {}",
                    snapshot.handle(),
                    e
                ),
            }
        }

        tracing::info!("Publish cancel: {} publishing related jobs were canceled.", canceled);
        Ok(canceled)
    }

    /// Cancel every unfinished publish job submitted by `owner`.
    pub async fn cancel_owned_by(&self, actor: &Account, owner: &Account) -> PublishResult<usize> {
        let listing = self.query.list_publish_jobs().await?;

        let mut canceled = 0;
        for job in listing.jobs() {
            if !job.is_owned_by(owner) || job.status.state().is_terminal() {
                continue;
            }
            match self.cancel_job(actor, Some(job)).await {
                Ok(outcome) if outcome.is_canceled() => canceled += 1,
                Ok(_) => {}
                Err(e) => tracing::error!(
                    "Publish cancel: failed to cancel job {} owned by \"{}\": {}",
                    job.handle,
                    owner.name,
                    e
                ),
            }
        }

        if canceled > 0 {
            tracing::info!(
                "Publish cancel: {} publishing jobs owned by \"{}\" were canceled.",
                canceled,
                owner.name
            );
        }
        Ok(canceled)
    }
}
