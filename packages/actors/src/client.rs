//! Client handle for talking to a running scheduler actor.

use publish_core::{Job, JobEvent, JobHandle, JobScheduler, SchedulerConfig, SchedulerError};
use ractor::{Actor, ActorRef};
use tokio::sync::broadcast;

use crate::handler::JobHandlerRegistry;
use crate::messages::SchedulerMessage;
use crate::scheduler::{SchedulerActor, SchedulerArgs};

/// Cloneable handle to a scheduler actor.
#[derive(Clone)]
pub struct Scheduler {
    actor: ActorRef<SchedulerMessage>,
    event_tx: broadcast::Sender<JobEvent>,
}

fn unavailable(error: impl std::fmt::Display) -> SchedulerError {
    SchedulerError::Unavailable(error.to_string())
}

impl Scheduler {
    /// Queue a job for execution.
    pub async fn submit(&self, job: Job) -> Result<JobHandle, SchedulerError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(SchedulerMessage::Submit {
                job: Box::new(job),
                reply: tx.into(),
            })
            .map_err(unavailable)?;
        rx.await.map_err(unavailable)?
    }

    /// Subscribe to job lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Stop all workers and the scheduler.
    pub fn shutdown(&self) {
        let _ = self.actor.send_message(SchedulerMessage::Shutdown);
    }

    /// Get the underlying actor reference.
    pub fn actor(&self) -> &ActorRef<SchedulerMessage> {
        &self.actor
    }
}

impl JobScheduler for Scheduler {
    async fn jobs(&self) -> Result<Vec<Job>, SchedulerError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(SchedulerMessage::ListJobs { reply: tx.into() })
            .map_err(unavailable)?;
        rx.await.map_err(unavailable)
    }

    async fn job(&self, handle: JobHandle) -> Result<Option<Job>, SchedulerError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(SchedulerMessage::GetJob {
                handle,
                reply: tx.into(),
            })
            .map_err(unavailable)?;
        rx.await.map_err(unavailable)
    }

    async fn remove_from_queue_and_finish(
        &self,
        handle: JobHandle,
    ) -> Result<bool, SchedulerError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(SchedulerMessage::RemoveFromQueueAndFinish {
                handle,
                reply: tx.into(),
            })
            .map_err(unavailable)?;
        rx.await.map_err(unavailable)
    }
}

/// Start a scheduler with the given configuration and job bodies.
pub async fn start_scheduler(
    config: SchedulerConfig,
    handlers: JobHandlerRegistry,
) -> Result<(Scheduler, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    let (event_tx, _) = broadcast::channel(1024);
    let args = SchedulerArgs {
        config,
        handlers,
        event_tx: event_tx.clone(),
    };
    let (actor, handle) = Actor::spawn(None, SchedulerActor, args).await?;

    Ok((Scheduler { actor, event_tx }, handle))
}
