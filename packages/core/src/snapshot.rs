//! Read projection of a job for listings.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::job::{Account, Job, JobHandle, JobState, JobStatus};

/// Label used when a status or owner is missing.
pub const UNKNOWN: &str = "Unknown";

/// Point-in-time view of one job.
///
/// Identity fields are copied when the snapshot is taken; the status is the
/// job's live status, so reads through it reflect later progress. Holding a
/// snapshot does not keep the job registered with the scheduler.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    handle: String,
    name: String,
    category: String,
    status: Option<Arc<JobStatus>>,
    owner: Option<Account>,
}

impl JobSnapshot {
    pub fn new(
        handle: JobHandle,
        name: impl Into<String>,
        category: impl Into<String>,
        status: Option<Arc<JobStatus>>,
        owner: Option<Account>,
    ) -> Self {
        Self {
            handle: handle.to_string(),
            name: name.into(),
            category: category.into(),
            status,
            owner,
        }
    }

    /// String form of the job handle.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn status(&self) -> Option<&Arc<JobStatus>> {
        self.status.as_ref()
    }

    pub fn owner(&self) -> Option<&Account> {
        self.owner.as_ref()
    }

    /// Current state, read live.
    pub fn state_value(&self) -> Option<JobState> {
        self.status.as_ref().map(|status| status.state())
    }

    /// State label, or `Unknown` without a status.
    pub fn state(&self) -> &'static str {
        self.state_value().map_or(UNKNOWN, |state| state.as_str())
    }

    /// Owner display name, or `Unknown` without an owner.
    pub fn owner_name(&self) -> &str {
        self.owner.as_ref().map_or(UNKNOWN, |owner| owner.name.as_str())
    }

    pub fn processed(&self) -> u64 {
        self.status.as_ref().map_or(0, |status| status.processed())
    }

    pub fn total(&self) -> u64 {
        self.status.as_ref().map_or(0, |status| status.total())
    }

    pub fn queue_time(&self) -> Option<DateTime<Utc>> {
        self.status.as_ref().map(|status| status.queue_time())
    }
}

impl From<&Job> for JobSnapshot {
    fn from(job: &Job) -> Self {
        Self::new(
            job.handle,
            job.name.clone(),
            job.category.clone(),
            Some(job.status.clone()),
            job.owner.clone(),
        )
    }
}
