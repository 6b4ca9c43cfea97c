//! Message types for actor communication.

use publish_core::{Job, JobHandle, SchedulerError};
use ractor::RpcReplyPort;

/// Messages for the SchedulerActor.
#[derive(Debug)]
pub enum SchedulerMessage {
    /// Queue a new job.
    Submit {
        job: Box<Job>,
        reply: RpcReplyPort<Result<JobHandle, SchedulerError>>,
    },

    /// Request the next queued job for a worker.
    RequestJob {
        worker_id: String,
        reply: RpcReplyPort<Option<Job>>,
    },

    /// Report that a job body returned.
    JobFinished {
        handle: JobHandle,
        worker_id: String,
        error: Option<String>,
    },

    /// Take a queued job off the queue and finish it.
    RemoveFromQueueAndFinish {
        handle: JobHandle,
        reply: RpcReplyPort<bool>,
    },

    /// Get a job by handle.
    GetJob {
        handle: JobHandle,
        reply: RpcReplyPort<Option<Job>>,
    },

    /// List every known job: queued, running, then finished.
    ListJobs { reply: RpcReplyPort<Vec<Job>> },

    /// Stop all workers and the scheduler.
    Shutdown,

    /// Periodic tick for reclaiming expired jobs.
    Tick,
}

/// Messages for the WorkerActor.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Shutdown the worker.
    Shutdown,

    /// Poll tick.
    Heartbeat,
}
