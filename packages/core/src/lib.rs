//! Core domain types for the publish job subsystem.
//!
//! This crate contains shared types used across all packages:
//! - Job, JobStatus and JobSnapshot for tracked background work
//! - PublishStatus and PublishStatistics for publish runs
//! - The JobScheduler boundary and scheduler events

mod events;
mod job;
mod publish;
mod scheduler;
mod snapshot;

pub use events::JobEvent;
pub use job::{Account, Job, JobHandle, JobPayload, JobState, JobStatus, PUBLISH_CATEGORY};
pub use publish::{
    ChildAction, PublishItemResult, PublishOperation, PublishStatistics, PublishStatus,
};
pub use scheduler::{JobScheduler, SchedulerConfig, SchedulerError};
pub use snapshot::{JobSnapshot, UNKNOWN};
