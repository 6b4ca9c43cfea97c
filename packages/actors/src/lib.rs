//! Actor system for executing tracked background jobs.
//!
//! This crate provides the Ractor-based job scheduler used by the
//! publishing subsystem.
//!
//! # Architecture
//!
//! - `SchedulerActor` - Owns the queued, running and finished jobs
//! - `WorkerActor` - Pulls queued jobs and executes their bodies
//! - `Scheduler` - Cloneable client implementing `JobScheduler`
//!
//! # Usage
//!
//! ```ignore
//! use actors::{JobHandlerRegistry, start_scheduler};
//! use publish_core::{Job, SchedulerConfig};
//!
//! let (scheduler, _handle) =
//!     start_scheduler(SchedulerConfig::default(), JobHandlerRegistry::new()).await?;
//! let handle = scheduler.submit(Job::publish("Publish site", "publish")).await?;
//! ```

mod client;
mod handler;
mod messages;
mod scheduler;
mod worker_actor;

pub use client::{Scheduler, start_scheduler};
pub use handler::{FnHandler, HandlerFuture, HandlerResult, JobHandler, JobHandlerRegistry};
pub use messages::{SchedulerMessage, WorkerMessage};
pub use scheduler::SchedulerActor;
pub use worker_actor::WorkerActor;

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
