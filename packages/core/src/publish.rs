//! Publish run state shared between the job, its workers and operators.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::job::{JobState, JobStatus};

/// Outcome the publish engine decided for a single content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOperation {
    /// Nothing had to be done for the item.
    None,
    Skipped,
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for PublishOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishOperation::None => write!(f, "None"),
            PublishOperation::Skipped => write!(f, "Skipped"),
            PublishOperation::Created => write!(f, "Created"),
            PublishOperation::Updated => write!(f, "Updated"),
            PublishOperation::Deleted => write!(f, "Deleted"),
        }
    }
}

/// What the engine decided for the children of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildAction {
    #[default]
    Allow,
    Skip,
}

impl std::fmt::Display for ChildAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildAction::Allow => write!(f, "Allow"),
            ChildAction::Skip => write!(f, "Skip"),
        }
    }
}

/// Classified result of publishing one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishItemResult {
    pub operation: PublishOperation,
    #[serde(default)]
    pub child_action: ChildAction,
    /// Why the engine chose this operation; may be empty.
    #[serde(default)]
    pub explanation: String,
}

impl PublishItemResult {
    pub fn new(operation: PublishOperation) -> Self {
        Self {
            operation,
            child_action: ChildAction::default(),
            explanation: String::new(),
        }
    }

    pub fn with_child_action(mut self, child_action: ChildAction) -> Self {
        self.child_action = child_action;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }
}

/// Per-run counters of item outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishStatistics {
    pub skipped: u64,
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
}

impl PublishStatistics {
    /// Count one item with the given operation.
    ///
    /// `None` and `Skipped` share the skipped counter.
    pub fn record(&mut self, operation: PublishOperation) {
        match operation {
            PublishOperation::None | PublishOperation::Skipped => self.skipped += 1,
            PublishOperation::Created => self.created += 1,
            PublishOperation::Updated => self.updated += 1,
            PublishOperation::Deleted => self.deleted += 1,
        }
    }

    /// Total items counted across all outcomes.
    pub fn total(&self) -> u64 {
        self.skipped + self.created + self.updated + self.deleted
    }
}

/// Live status of one publish run.
///
/// A single instance is shared by the job, every worker processing the run
/// and any operator cancelling it. The statistics lock is independent from
/// the job status lock.
#[derive(Debug)]
pub struct PublishStatus {
    job_status: Arc<JobStatus>,
    messages: Mutex<Vec<String>>,
    statistics: Mutex<PublishStatistics>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PublishStatus {
    /// Create a publish status mirroring the given job status.
    pub fn new(job_status: Arc<JobStatus>) -> Self {
        Self {
            job_status,
            messages: Mutex::new(Vec::new()),
            statistics: Mutex::new(PublishStatistics::default()),
        }
    }

    /// Current lifecycle state of the run.
    pub fn state(&self) -> JobState {
        self.job_status.state()
    }

    /// Move the run forward to `state`; earlier states are ignored.
    pub fn set_state(&self, state: JobState) -> bool {
        self.job_status.advance(state)
    }

    /// Force the run to `Finished` so its workers stop at their next checkpoint.
    pub fn force_finish(&self) -> bool {
        self.set_state(JobState::Finished)
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Append a log line.
    pub fn add_message(&self, message: impl Into<String>) {
        lock(&self.messages).push(message.into());
    }

    /// Copy of all log lines in the order they were added.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }

    /// Record one item outcome under the run statistics lock.
    pub fn record(&self, operation: PublishOperation) {
        lock(&self.statistics).record(operation);
    }

    /// Copy of the current counters.
    pub fn statistics(&self) -> PublishStatistics {
        *lock(&self.statistics)
    }
}
