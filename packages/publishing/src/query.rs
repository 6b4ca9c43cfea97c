//! Read-only queries over the scheduler's publish jobs.

use std::sync::Arc;

use publish_core::{Job, JobHandle, JobScheduler, JobSnapshot, JobState};

use crate::error::PublishResult;

/// Which jobs a listing keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    /// Category starts with `publish`.
    AnyPublish,
    /// Category is exactly `publish` and the job is in the given state.
    ExactInState(JobState),
}

impl Filter {
    fn matches(&self, job: &Job) -> bool {
        match self {
            Filter::AnyPublish => job.is_publish_category(),
            Filter::ExactInState(state) => {
                job.is_exact_publish_category() && job.status.state() == *state
            }
        }
    }
}

/// Publish jobs captured from one scheduler enumeration.
///
/// Snapshots are built lazily while iterating and `iter` can be called any
/// number of times. Job states are read live, so a job may have moved on by
/// the time its snapshot is produced.
#[derive(Debug, Clone)]
pub struct JobListing {
    jobs: Vec<Job>,
}

impl JobListing {
    /// Iterate over the listed jobs as snapshots, in scheduler order.
    pub fn iter(&self) -> impl Iterator<Item = JobSnapshot> + '_ {
        self.jobs.iter().map(JobSnapshot::from)
    }

    /// The listed jobs themselves.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Queries publish jobs known to a scheduler.
pub struct JobQuery<S> {
    scheduler: Arc<S>,
}

impl<S> Clone for JobQuery<S> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S: JobScheduler> JobQuery<S> {
    pub fn new(scheduler: Arc<S>) -> Self {
        Self { scheduler }
    }

    /// Get the scheduler this query reads from.
    pub fn scheduler(&self) -> &Arc<S> {
        &self.scheduler
    }

    async fn list(&self, filter: Filter) -> PublishResult<JobListing> {
        let jobs = self.scheduler.jobs().await.inspect_err(|e| {
            tracing::error!("Publish jobs: failed to enumerate scheduler jobs: {}", e);
        })?;

        Ok(JobListing {
            jobs: jobs.into_iter().filter(|job| filter.matches(job)).collect(),
        })
    }

    /// List every job whose category starts with `publish`, ignoring case.
    pub async fn list_publish_jobs(&self) -> PublishResult<JobListing> {
        self.list(Filter::AnyPublish).await
    }

    /// List jobs whose category is exactly `publish`, ignoring case, that
    /// are currently in `state`.
    ///
    /// Narrower than `list_publish_jobs`: categories such as
    /// `publish:incremental` are not included.
    pub async fn list_publish_jobs_in_state(&self, state: JobState) -> PublishResult<JobListing> {
        self.list(Filter::ExactInState(state)).await
    }

    /// Resolve a selected list entry to its job.
    ///
    /// Returns `None` when nothing is selected, the selection is not a valid
    /// handle, or the scheduler no longer knows the job.
    pub async fn find_selected(&self, selection: Option<&str>) -> PublishResult<Option<Job>> {
        let Some(selection) = selection.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        match JobHandle::parse(selection) {
            Ok(handle) => self.find(handle).await,
            Err(e) => {
                tracing::debug!(
                    "Publish jobs: selection '{}' is not a job handle: {}",
                    selection,
                    e
                );
                Ok(None)
            }
        }
    }

    /// Look up a job by handle.
    pub async fn find(&self, handle: JobHandle) -> PublishResult<Option<Job>> {
        let job = self.scheduler.job(handle).await.inspect_err(|e| {
            tracing::error!("Publish jobs: failed to look up job {}: {}", handle, e);
        })?;
        Ok(job)
    }
}
