//! Worker actor for executing job bodies.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use publish_core::Job;
use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::handler::JobHandlerRegistry;
use crate::messages::{SchedulerMessage, WorkerMessage};

/// State for the worker actor.
pub struct WorkerActorState {
    /// Unique worker ID.
    pub worker_id: String,
    /// Job currently being executed.
    pub current_job: Option<Job>,
    /// Scheduler actor reference.
    pub scheduler: ActorRef<SchedulerMessage>,
    /// Handler registry.
    pub handlers: Arc<JobHandlerRegistry>,
    /// Whether the worker should continue running.
    pub running: bool,
}

impl WorkerActorState {
    /// Check if the worker is idle.
    pub fn is_idle(&self) -> bool {
        self.current_job.is_none()
    }
}

/// Worker actor arguments.
pub struct WorkerArgs {
    pub worker_id: String,
    pub scheduler: ActorRef<SchedulerMessage>,
    pub handlers: Arc<JobHandlerRegistry>,
    pub poll_interval: Duration,
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Execute a job body and report back to the scheduler.
///
/// Runs inline in the worker's message handler, so a worker never holds
/// more than one job. A panicking body finishes its job with an error and
/// leaves the worker alive.
async fn run_job(state: &mut WorkerActorState, job: Job) -> Result<(), ActorProcessingErr> {
    let handle = job.handle;
    state.current_job = Some(job.clone());

    let error = match state.handlers.get(&job.category) {
        Some(handler) => {
            let body = AssertUnwindSafe(async { handler.handle(&job).await });
            match body.catch_unwind().await {
                Ok(result) => result.err(),
                Err(panic) => Some(format!("Job body panicked: {}", panic_message(&*panic))),
            }
        }
        None => Some(format!("No handler for job category: {}", job.category)),
    };

    if let Some(ref error) = error {
        tracing::warn!("Job {} '{}' ended with error: {}", handle, job.name, error);
    }

    state.current_job = None;
    state.scheduler.send_message(SchedulerMessage::JobFinished {
        handle,
        worker_id: state.worker_id.clone(),
        error,
    })?;
    Ok(())
}

/// Worker actor that executes one job at a time.
pub struct WorkerActor;

impl Actor for WorkerActor {
    type Msg = WorkerMessage;
    type State = WorkerActorState;
    type Arguments = WorkerArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::debug!("Starting worker: {}", args.worker_id);

        // Start the poll loop
        let myself_clone = myself.clone();
        let poll_interval = args.poll_interval;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(poll_interval).await;
                if myself_clone.send_message(WorkerMessage::Heartbeat).is_err() {
                    break;
                }
            }
        });

        Ok(WorkerActorState {
            worker_id: args.worker_id,
            current_job: None,
            scheduler: args.scheduler,
            handlers: args.handlers,
            running: true,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            WorkerMessage::Shutdown => {
                tracing::debug!("Shutting down worker: {}", state.worker_id);
                state.running = false;
                myself.stop(None);
                return Ok(());
            }

            WorkerMessage::Heartbeat => {
                if !state.running {
                    myself.stop(None);
                    return Ok(());
                }

                // If idle, request a job
                if state.is_idle() {
                    let timeout = Duration::from_secs(5);
                    let result = ractor::rpc::call(
                        &state.scheduler,
                        |reply| SchedulerMessage::RequestJob {
                            worker_id: state.worker_id.clone(),
                            reply,
                        },
                        Some(timeout),
                    )
                    .await;
                    if let Ok(ractor::rpc::CallResult::Success(Some(job))) = result {
                        run_job(state, job).await?;
                    }
                }
            }
        }

        Ok(())
    }
}
