//! Scheduler actor owning the queued, running and finished job collections.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use publish_core::{Job, JobEvent, JobHandle, JobState, SchedulerConfig, SchedulerError};
use ractor::{Actor, ActorProcessingErr, ActorRef, SupervisionEvent};
use tokio::sync::broadcast;

use crate::handler::JobHandlerRegistry;
use crate::messages::{SchedulerMessage, WorkerMessage};
use crate::worker_actor::{WorkerActor, WorkerArgs};

/// State for the scheduler actor.
pub struct SchedulerState {
    /// Scheduler configuration.
    pub config: SchedulerConfig,
    /// Jobs waiting for a worker, oldest first.
    queued: VecDeque<Job>,
    /// Jobs handed to a worker, in start order.
    running: Vec<Job>,
    /// Finished jobs kept until their expiry passes.
    finished: Vec<Job>,
    /// Worker actors.
    workers: Vec<ActorRef<WorkerMessage>>,
    /// Handler registry for workers.
    handlers: Arc<JobHandlerRegistry>,
    /// Event broadcaster.
    event_tx: broadcast::Sender<JobEvent>,
}

impl SchedulerState {
    /// Broadcast an event.
    fn broadcast(&self, event: JobEvent) {
        tracing::debug!("{}", event.description());
        let _ = self.event_tx.send(event);
    }

    /// Move a job into the finished collection and stamp its expiry.
    fn finish(&mut self, job: Job) {
        let now = Utc::now();
        job.status.advance(JobState::Finished);
        job.status.expire_at_if_unset(now + self.config.after_life());
        self.finished.push(job);
    }

    /// Drop finished jobs whose expiry has passed.
    fn reclaim_expired(&mut self) {
        let now = Utc::now();
        let (expired, kept): (Vec<Job>, Vec<Job>) = std::mem::take(&mut self.finished)
            .into_iter()
            .partition(|job| job.status.is_expired(now));
        self.finished = kept;

        for job in expired {
            self.broadcast(JobEvent::Reclaimed {
                handle: job.handle,
                timestamp: now,
            });
        }
    }

    fn find(&self, handle: JobHandle) -> Option<&Job> {
        self.queued
            .iter()
            .chain(self.running.iter())
            .chain(self.finished.iter())
            .find(|job| job.handle == handle)
    }
}

/// Scheduler actor arguments.
pub struct SchedulerArgs {
    pub config: SchedulerConfig,
    pub handlers: JobHandlerRegistry,
    pub event_tx: broadcast::Sender<JobEvent>,
}

/// Scheduler actor that queues jobs, hands them to workers and keeps
/// finished jobs listed until they expire.
pub struct SchedulerActor;

impl Actor for SchedulerActor {
    type Msg = SchedulerMessage;
    type State = SchedulerState;
    type Arguments = SchedulerArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Starting job scheduler with {} workers",
            args.config.concurrency
        );

        // Start periodic tick
        let myself_clone = myself.clone();
        let sweep_interval = args.config.sweep_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            loop {
                interval.tick().await;
                if myself_clone.send_message(SchedulerMessage::Tick).is_err() {
                    break;
                }
            }
        });

        Ok(SchedulerState {
            config: args.config,
            queued: VecDeque::new(),
            running: Vec::new(),
            finished: Vec::new(),
            workers: Vec::new(),
            handlers: Arc::new(args.handlers),
            event_tx: args.event_tx,
        })
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        for index in 0..state.config.concurrency {
            let args = WorkerArgs {
                worker_id: format!("worker-{}", index + 1),
                scheduler: myself.clone(),
                handlers: state.handlers.clone(),
                poll_interval: state.config.poll_interval(),
            };

            let (worker, _handle) =
                Actor::spawn_linked(None, WorkerActor, args, myself.get_cell())
                    .await
                    .map_err(|e| {
                        ActorProcessingErr::from(format!("Failed to spawn worker: {}", e))
                    })?;
            state.workers.push(worker);
        }
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SchedulerMessage::Submit { job, reply } => {
                let job = *job;
                if job.status.state() != JobState::Queued {
                    let _ = reply.send(Err(SchedulerError::Rejected(format!(
                        "job {} is already {}",
                        job.handle,
                        job.status.state()
                    ))));
                    return Ok(());
                }
                if state.find(job.handle).is_some() {
                    let _ = reply.send(Err(SchedulerError::Rejected(format!(
                        "job {} is already scheduled",
                        job.handle
                    ))));
                    return Ok(());
                }

                let handle = job.handle;
                state.broadcast(JobEvent::Queued {
                    handle,
                    name: job.name.clone(),
                    category: job.category.clone(),
                    timestamp: Utc::now(),
                });
                state.queued.push_back(job);

                let _ = reply.send(Ok(handle));
            }

            SchedulerMessage::RequestJob { worker_id, reply } => {
                match state.queued.pop_front() {
                    Some(job) => {
                        job.status.advance(JobState::Running);
                        state.running.push(job.clone());

                        state.broadcast(JobEvent::Started {
                            handle: job.handle,
                            worker_id,
                            timestamp: Utc::now(),
                        });

                        let _ = reply.send(Some(job));
                    }
                    None => {
                        let _ = reply.send(None);
                    }
                }
            }

            SchedulerMessage::JobFinished {
                handle,
                worker_id: _,
                error,
            } => {
                if let Some(index) = state.running.iter().position(|job| job.handle == handle) {
                    let job = state.running.remove(index);
                    state.finish(job);

                    state.broadcast(JobEvent::Finished {
                        handle,
                        error,
                        timestamp: Utc::now(),
                    });
                    state.reclaim_expired();
                }
            }

            SchedulerMessage::RemoveFromQueueAndFinish { handle, reply } => {
                match state.queued.iter().position(|job| job.handle == handle) {
                    Some(index) => {
                        if let Some(job) = state.queued.remove(index) {
                            state.finish(job);
                        }

                        state.broadcast(JobEvent::Dequeued {
                            handle,
                            timestamp: Utc::now(),
                        });
                        state.reclaim_expired();

                        let _ = reply.send(true);
                    }
                    None => {
                        let _ = reply.send(false);
                    }
                }
            }

            SchedulerMessage::GetJob { handle, reply } => {
                let _ = reply.send(state.find(handle).cloned());
            }

            SchedulerMessage::ListJobs { reply } => {
                let jobs: Vec<Job> = state
                    .queued
                    .iter()
                    .chain(state.running.iter())
                    .chain(state.finished.iter())
                    .cloned()
                    .collect();
                let _ = reply.send(jobs);
            }

            SchedulerMessage::Shutdown => {
                tracing::info!("Shutting down job scheduler");
                for worker in &state.workers {
                    let _ = worker.send_message(WorkerMessage::Shutdown);
                }
                myself.stop(None);
                return Ok(());
            }

            SchedulerMessage::Tick => {
                state.reclaim_expired();
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        _state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorFailed(cell, error) => {
                tracing::error!("Worker {} failed: {}", cell.get_id(), error);
            }
            SupervisionEvent::ActorTerminated(cell, _, reason) => {
                tracing::debug!("Worker {} terminated: {:?}", cell.get_id(), reason);
            }
            _ => {}
        }
        Ok(())
    }
}
