//! Event types for job lifecycle updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JobHandle;

/// Events emitted by the scheduler as jobs move through their lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// A new job was queued.
    Queued {
        handle: JobHandle,
        name: String,
        category: String,
        timestamp: DateTime<Utc>,
    },
    /// A worker started executing a job.
    Started {
        handle: JobHandle,
        worker_id: String,
        timestamp: DateTime<Utc>,
    },
    /// A job body returned, successfully or not.
    Finished {
        handle: JobHandle,
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// A queued job was taken off the queue and finished without running.
    Dequeued {
        handle: JobHandle,
        timestamp: DateTime<Utc>,
    },
    /// An expired finished job was dropped from the scheduler.
    Reclaimed {
        handle: JobHandle,
        timestamp: DateTime<Utc>,
    },
}

impl JobEvent {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            JobEvent::Queued { timestamp, .. } => *timestamp,
            JobEvent::Started { timestamp, .. } => *timestamp,
            JobEvent::Finished { timestamp, .. } => *timestamp,
            JobEvent::Dequeued { timestamp, .. } => *timestamp,
            JobEvent::Reclaimed { timestamp, .. } => *timestamp,
        }
    }

    /// Get the handle of the job this event is about.
    pub fn handle(&self) -> JobHandle {
        match self {
            JobEvent::Queued { handle, .. } => *handle,
            JobEvent::Started { handle, .. } => *handle,
            JobEvent::Finished { handle, .. } => *handle,
            JobEvent::Dequeued { handle, .. } => *handle,
            JobEvent::Reclaimed { handle, .. } => *handle,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            JobEvent::Queued {
                handle,
                name,
                category,
                ..
            } => format!("Job {} '{}' queued as {}", handle, name, category),
            JobEvent::Started {
                handle, worker_id, ..
            } => format!("Job {} started by {}", handle, worker_id),
            JobEvent::Finished { handle, error, .. } => match error {
                Some(error) => format!("Job {} finished with error: {}", handle, error),
                None => format!("Job {} finished", handle),
            },
            JobEvent::Dequeued { handle, .. } => format!("Job {} removed from queue", handle),
            JobEvent::Reclaimed { handle, .. } => format!("Job {} reclaimed", handle),
        }
    }
}
