//! Publish job tracking, forced cancellation and run statistics.
//!
//! Everything here works against any `JobScheduler`:
//! - `JobQuery` lists publish jobs as snapshots and resolves selections
//! - `CancellationController` forces queued or running jobs to finish
//! - `StatisticsAggregator` and `PublishRun` update counters from job bodies
//! - `JobListPresenter` renders the job list and drives the cancel prompts
//!
//! # Usage
//!
//! ```ignore
//! use publishing::{CancellationController, JobQuery};
//!
//! let query = JobQuery::new(scheduler.clone());
//! for job in query.list_publish_jobs().await?.iter() {
//!     println!("{} {} {}", job.name(), job.state(), job.owner_name());
//! }
//!
//! let controller = CancellationController::new(scheduler);
//! let canceled = controller.cancel_all(&operator).await?;
//! ```

mod cancel;
mod error;
mod presenter;
mod query;
mod run;
mod settings;
mod statistics;

pub use cancel::{CancelOutcome, CancellationController};
pub use error::{PublishError, PublishResult};
pub use presenter::{
    ALREADY_COMPLETED, CONFIRM_CANCEL, CONFIRM_CANCEL_ALL, CancelReply, EMPTY_LIST_MESSAGE,
    JobList, JobListPresenter, JobRow, NOT_ALLOWED, NOTHING_TO_CANCEL, Prompt, SELECT_JOB_FIRST,
};
pub use query::{JobListing, JobQuery};
pub use run::PublishRun;
pub use settings::{CancelBehavior, PublishSettings};
pub use statistics::{PublishItemContext, StatisticsAggregator};
