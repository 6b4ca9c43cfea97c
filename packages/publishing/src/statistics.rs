//! Per-item statistics for running publish jobs.
//!
//! Items of one run are processed by many workers at once. Run counters are
//! updated under the publish status statistics lock and the processed count
//! under the job status lock; the two are never held together.

use std::sync::Arc;

use publish_core::{Job, JobStatus, PublishItemResult, PublishOperation, PublishStatus};

use crate::settings::PublishSettings;

const NULL: &str = "(null)";
const NO_EXPLANATION: &str = "(none)";

/// Everything known about one processed item.
#[derive(Debug, Clone, Default)]
pub struct PublishItemContext {
    /// Identifier of the content item.
    pub item_id: String,
    /// Display name, when the item could be loaded.
    pub item_name: Option<String>,
    /// What the engine decided for the item, if it got that far.
    pub result: Option<PublishItemResult>,
    /// Counters of the run the item belongs to.
    pub run: Option<Arc<PublishStatus>>,
    /// Job executing the run.
    pub job: Option<Job>,
}

impl PublishItemContext {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            ..Self::default()
        }
    }

    /// Attach the job and, for publish jobs, its run counters.
    pub fn for_job(job: &Job, item_id: impl Into<String>) -> Self {
        Self {
            run: job.publish_status().cloned(),
            job: Some(job.clone()),
            ..Self::new(item_id)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    pub fn with_result(mut self, result: PublishItemResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_run(mut self, run: Arc<PublishStatus>) -> Self {
        self.run = Some(run);
        self
    }
}

/// Updates run and job counters once per processed item.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsAggregator {
    trace_to_log: bool,
}

impl StatisticsAggregator {
    pub fn new(settings: &PublishSettings) -> Self {
        Self {
            trace_to_log: settings.trace_to_log,
        }
    }

    /// Enable or disable the per-item trace.
    pub fn with_trace_to_log(mut self, trace_to_log: bool) -> Self {
        self.trace_to_log = trace_to_log;
        self
    }

    /// Record one processed item.
    pub fn process(&self, context: &PublishItemContext) {
        if let Some(run) = &context.run {
            Self::record_item_outcome(run, context.result.as_ref());
        }
        if let Some(job) = &context.job {
            Self::record_item_processed(&job.status, context.result.as_ref());
        }
        if self.trace_to_log {
            Self::trace(context);
        }
    }

    /// Count the item's outcome in the run statistics.
    ///
    /// Items without a result are not counted.
    pub fn record_item_outcome(run: &PublishStatus, result: Option<&PublishItemResult>) {
        if let Some(result) = result {
            run.record(result.operation);
        }
    }

    /// Count the item as processed by its job.
    ///
    /// Items without a result or with operation `None` are not counted.
    pub fn record_item_processed(status: &JobStatus, result: Option<&PublishItemResult>) {
        match result {
            Some(result) if result.operation != PublishOperation::None => {
                status.increment_processed();
            }
            _ => {}
        }
    }

    fn trace(context: &PublishItemContext) {
        let result = context.result.as_ref();
        let name = context.item_name.as_deref().unwrap_or(NULL);
        let operation = result.map_or_else(|| NULL.to_string(), |r| r.operation.to_string());
        let child_action = result.map_or_else(|| NULL.to_string(), |r| r.child_action.to_string());
        let explanation = result
            .map(|r| r.explanation.as_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(NO_EXPLANATION);

        tracing::info!(
            target: "publish::trace",
            "##Publish Item:         {} - {}",
            name,
            context.item_id
        );
        tracing::info!(target: "publish::trace", "##Publish Operation:    {}", operation);
        tracing::info!(target: "publish::trace", "##Publish Child Action: {}", child_action);
        tracing::info!(target: "publish::trace", "##Explanation:          {}", explanation);
    }
}
