//! Cooperative view of a publish run for job bodies.

use std::ops::ControlFlow;
use std::sync::Arc;

use publish_core::{Job, PublishItemResult, PublishStatistics, PublishStatus};

use crate::error::{PublishError, PublishResult};
use crate::settings::{CancelBehavior, PublishSettings};
use crate::statistics::{PublishItemContext, StatisticsAggregator};

/// Handle a job body uses to report items and notice forced cancellation.
///
/// Clones share the same run, so one can be handed to every item worker.
#[derive(Debug, Clone)]
pub struct PublishRun {
    job: Job,
    status: Option<Arc<PublishStatus>>,
    behavior: CancelBehavior,
    aggregator: StatisticsAggregator,
}

impl PublishRun {
    pub fn new(job: &Job, settings: &PublishSettings) -> Self {
        Self {
            job: job.clone(),
            status: job.publish_status().cloned(),
            behavior: settings.cancel_behavior,
            aggregator: StatisticsAggregator::new(settings),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Check whether the run was forced to finish.
    pub fn is_canceled(&self) -> bool {
        self.status.as_ref().is_some_and(|status| status.is_finished())
    }

    /// Decide whether the body may process another item.
    ///
    /// Breaks once the run is canceled with the soft behavior and fails with
    /// `PublishError::Canceled` with the hard-stop behavior.
    pub fn checkpoint(&self) -> PublishResult<ControlFlow<()>> {
        if !self.is_canceled() {
            return Ok(ControlFlow::Continue(()));
        }
        match self.behavior {
            CancelBehavior::HardStop => {
                tracing::info!("Publish run {} stopped: job was canceled", self.job.handle);
                Err(PublishError::Canceled)
            }
            CancelBehavior::Soft => {
                tracing::debug!("Publish run {} stopping early", self.job.handle);
                Ok(ControlFlow::Break(()))
            }
        }
    }

    /// Record the outcome of one item.
    pub fn record_item(
        &self,
        item_id: impl Into<String>,
        name: Option<&str>,
        result: Option<PublishItemResult>,
    ) {
        let mut context = PublishItemContext::for_job(&self.job, item_id);
        context.item_name = name.map(str::to_string);
        context.result = result;
        self.aggregator.process(&context);
    }

    /// Current counters of the run.
    pub fn statistics(&self) -> PublishStatistics {
        self.status
            .as_ref()
            .map(|status| status.statistics())
            .unwrap_or_default()
    }
}
