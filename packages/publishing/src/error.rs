//! Error types for the publishing subsystem.

use publish_core::SchedulerError;
use thiserror::Error;

/// Publishing errors.
///
/// Informational outcomes such as a missing or already finished job are not
/// errors; see `CancelOutcome`.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The scheduler could not be read or changed; the operation was abandoned.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// The publish run was forced to finish and stopped without completing.
    #[error("Publishing job was canceled")]
    Canceled,

    #[error("Invalid publish setting {name}: {reason}")]
    InvalidSettings { name: String, reason: String },
}

/// Result type for publishing operations.
pub type PublishResult<T> = Result<T, PublishError>;
