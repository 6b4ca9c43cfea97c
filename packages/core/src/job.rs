//! Job domain types for background work tracked by the scheduler.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::publish::PublishStatus;

/// Opaque handle for a job, using ULID for chronological sorting.
///
/// Handles are stable for the job's lifetime and round-trip through their
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(pub Ulid);

impl JobHandle {
    /// Create a new unique job handle.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a job handle from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s.trim())?))
    }
}

impl Default for JobHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobHandle {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Lifecycle state of a job. Transitions only move forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Waiting for a worker.
    #[default]
    Queued,
    /// Being executed by a worker.
    Running,
    /// Done, either normally or forced.
    Finished,
}

impl JobState {
    /// Get the display label for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "Queued",
            JobState::Running => "Running",
            JobState::Finished => "Finished",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Finished)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the user that submitted a job or requested an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(default)]
    pub is_administrator: bool,
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_administrator: false,
        }
    }

    pub fn administrator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_administrator: true,
        }
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug)]
struct StatusRecord {
    state: JobState,
    processed: u64,
    total: u64,
    expiry: Option<DateTime<Utc>>,
}

/// Live, shared status of a job.
///
/// Every mutation goes through the status lock, which is the protection
/// domain for the job-level `processed` counter. Readers take the lock only
/// long enough to copy a field, so a value may already be stale when used.
#[derive(Debug)]
pub struct JobStatus {
    queue_time: DateTime<Utc>,
    record: Mutex<StatusRecord>,
}

impl JobStatus {
    /// Create a queued status stamped with the current time.
    pub fn new() -> Self {
        Self {
            queue_time: Utc::now(),
            record: Mutex::new(StatusRecord {
                state: JobState::Queued,
                processed: 0,
                total: 0,
                expiry: None,
            }),
        }
    }

    fn record(&self) -> MutexGuard<'_, StatusRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// When the job was created.
    pub fn queue_time(&self) -> DateTime<Utc> {
        self.queue_time
    }

    pub fn state(&self) -> JobState {
        self.record().state
    }

    /// Move the job forward to `next`.
    ///
    /// Returns `false` without touching the state when `next` is not later
    /// than the current state.
    pub fn advance(&self, next: JobState) -> bool {
        let mut record = self.record();
        if next > record.state {
            record.state = next;
            true
        } else {
            false
        }
    }

    /// Number of items handled so far.
    pub fn processed(&self) -> u64 {
        self.record().processed
    }

    /// Count one more processed item and return the new total.
    pub fn increment_processed(&self) -> u64 {
        let mut record = self.record();
        record.processed += 1;
        record.processed
    }

    /// Expected item count; zero when unknown.
    pub fn total(&self) -> u64 {
        self.record().total
    }

    pub fn set_total(&self, total: u64) {
        self.record().total = total;
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.record().expiry
    }

    pub fn set_expiry(&self, expiry: DateTime<Utc>) {
        self.record().expiry = Some(expiry);
    }

    /// Swap the expiry and return the previous one.
    pub fn replace_expiry(&self, expiry: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        std::mem::replace(&mut self.record().expiry, expiry)
    }

    /// Set the expiry only if none has been set yet.
    ///
    /// Returns the expiry in effect afterwards.
    pub fn expire_at_if_unset(&self, expiry: DateTime<Utc>) -> DateTime<Utc> {
        *self.record().expiry.get_or_insert(expiry)
    }

    /// Check whether the job's expiry has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.record().expiry.is_some_and(|expiry| expiry <= now)
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-job payload, fixed when the job is created.
#[derive(Debug, Clone)]
pub enum JobPayload {
    /// Any job that is not a publish run.
    Generic,
    /// A publish run carrying its shared statistics and messages.
    Publish(Arc<PublishStatus>),
}

/// A unit of background work.
///
/// Cloning a job is cheap and shares the live status and payload, so every
/// clone observes the same progress.
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique handle for this job.
    pub handle: JobHandle,
    /// Display label, not unique.
    pub name: String,
    /// Free-text tag used for routing and filtering.
    pub category: String,
    /// User that submitted the job, if any.
    pub owner: Option<Account>,
    /// Live status shared with every clone.
    pub status: Arc<JobStatus>,
    /// Job-specific payload.
    pub payload: JobPayload,
}

impl Job {
    /// Create a new queued job without a publish payload.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            handle: JobHandle::new(),
            name: name.into(),
            category: category.into(),
            owner: None,
            status: Arc::new(JobStatus::new()),
            payload: JobPayload::Generic,
        }
    }

    /// Create a new queued publish job with a fresh publish status attached.
    pub fn publish(name: impl Into<String>, category: impl Into<String>) -> Self {
        let mut job = Self::new(name, category);
        job.payload = JobPayload::Publish(Arc::new(PublishStatus::new(job.status.clone())));
        job
    }

    /// Set the owner for this job.
    pub fn with_owner(mut self, owner: Account) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the expected item count for this job.
    pub fn with_total(self, total: u64) -> Self {
        self.status.set_total(total);
        self
    }

    /// Get the publish status, if this is a publish job.
    pub fn publish_status(&self) -> Option<&Arc<PublishStatus>> {
        match &self.payload {
            JobPayload::Publish(status) => Some(status),
            JobPayload::Generic => None,
        }
    }

    /// Check if the category marks this job as part of the publishing subsystem.
    pub fn is_publish_category(&self) -> bool {
        self.category
            .get(..PUBLISH_CATEGORY.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(PUBLISH_CATEGORY))
    }

    /// Check if the category is exactly `publish`, ignoring case.
    pub fn is_exact_publish_category(&self) -> bool {
        self.category.eq_ignore_ascii_case(PUBLISH_CATEGORY)
    }

    /// Check whether the owner is the given account name.
    pub fn is_owned_by(&self, account: &Account) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.name == account.name)
    }
}

/// Category tag of publish jobs.
pub const PUBLISH_CATEGORY: &str = "publish";
