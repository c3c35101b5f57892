//! Batched concurrent dispatcher.
//!
//! Work items are split into fixed-size batches. Every item in a batch runs
//! as its own tokio task; the dispatcher waits for the whole batch, appends
//! its results to the sink, advances progress, and only then starts the next
//! batch. Peak concurrency is therefore the batch size, and every batch that
//! finished is already on disk if the process dies mid-run.

pub mod call;

pub use call::complete_item;

use crate::config::RunSettings;
use crate::error::{Error, Result};
use crate::llm::CompletionService;
use crate::model::{BatchReport, CompletionResult, RunSummary, WorkItem};
use crate::retry::RetryPolicy;
use crate::sink::OutputSink;
use crate::telemetry::dispatch::{record_batch_outcome, start_batch_span, start_run_span};
use crate::telemetry::metrics;
use chrono::Utc;
use indicatif::ProgressBar;
use opentelemetry::KeyValue;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

/// What to do with an item whose call exhausted its retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the item, leave it out of the sink, keep going.
    #[default]
    SkipItem,
    /// Write nothing for the batch and abort the run.
    FailBatch,
}

/// Split `items` into consecutive batches of `batch_size`; the last batch
/// holds the remainder.
pub fn partition<T>(items: Vec<T>, batch_size: usize) -> Result<Vec<Vec<T>>> {
    if batch_size == 0 {
        return Err(Error::Config("batch size must be at least 1".to_string()));
    }
    let mut batches = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(batch_size).collect());
    }
    Ok(batches)
}

pub struct Dispatcher<S> {
    service: Arc<S>,
    retry: RetryPolicy,
    batch_size: usize,
    failure_policy: FailurePolicy,
    progress: ProgressBar,
}

impl<S: CompletionService> Dispatcher<S> {
    /// Dispatcher with the default retry policy and [`FailurePolicy::SkipItem`].
    pub fn new(service: Arc<S>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch size must be at least 1".to_string()));
        }
        Ok(Self {
            service,
            retry: RetryPolicy::default(),
            batch_size,
            failure_policy: FailurePolicy::default(),
            progress: ProgressBar::hidden(),
        })
    }

    pub fn from_settings(service: Arc<S>, settings: &RunSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::new(service, settings.batch_size)?
            .with_retry(settings.retry_policy()?)
            .with_failure_policy(settings.failure_policy))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Progress bar advanced after every flushed batch. Hidden by default.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Complete every item against `model`, writing results to `sink`.
    ///
    /// The sink is truncated first. Returns once the last batch is flushed;
    /// a sink error, or a failed item under [`FailurePolicy::FailBatch`],
    /// aborts the run.
    pub async fn run(
        &self,
        items: Vec<WorkItem>,
        model: &str,
        sink: &OutputSink,
    ) -> Result<RunSummary> {
        let total = items.len();
        let batches = partition(items, self.batch_size)?;
        let run_id = Uuid::new_v4();
        let span = start_run_span(&run_id, model, total, self.batch_size);

        async {
            sink.truncate()?;
            self.progress.set_length(total as u64);

            info!(
                batches = batches.len(),
                sink = %sink.path().display(),
                "run started"
            );

            let mut summary = RunSummary::start(model);
            for (index, batch) in batches.into_iter().enumerate() {
                let report = self.run_batch(index, batch, model, sink).await?;
                info!(
                    batch = report.index,
                    size = report.size,
                    written = report.written,
                    failed = report.failed.len(),
                    duration_ms = report.duration.as_millis() as u64,
                    "batch flushed"
                );
                summary.absorb(report);
            }
            summary.finished_at = Utc::now();

            info!(
                batches = summary.batches,
                written = summary.written,
                failed = summary.failed.len(),
                "run finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn run_batch(
        &self,
        index: usize,
        batch: Vec<WorkItem>,
        model: &str,
        sink: &OutputSink,
    ) -> Result<BatchReport> {
        let size = batch.len();
        let span = start_batch_span(index, size);
        let labels = [KeyValue::new("model", model.to_string())];
        let start = Instant::now();

        async {
            let (results, failed) = self.join_batch(batch, model).await?;

            sink.append(&results)?;
            self.progress.inc(size as u64);

            let duration = start.elapsed();
            record_batch_outcome(&span, results.len(), failed.len());
            metrics::batches_flushed().add(1, &labels);
            metrics::results_written().add(results.len() as u64, &labels);
            metrics::batch_duration_ms().record(duration.as_secs_f64() * 1000.0, &labels);

            Ok(BatchReport {
                index,
                size,
                written: results.len(),
                failed,
                duration,
            })
        }
        .instrument(span.clone())
        .await
    }

    /// Spawn one task per item and wait for all of them.
    ///
    /// Results come back in completion order. Under
    /// [`FailurePolicy::FailBatch`] the first failure drops the task set,
    /// aborting whatever is still in flight.
    async fn join_batch(
        &self,
        batch: Vec<WorkItem>,
        model: &str,
    ) -> Result<(Vec<CompletionResult>, Vec<String>)> {
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(batch.len());

        for item in batch {
            let service = Arc::clone(&self.service);
            let retry = self.retry;
            let model = model.to_string();
            let task_id = item.id.clone();
            let handle = tasks.spawn(
                async move { complete_item(service.as_ref(), &retry, &model, item).await }
                    .in_current_span(),
            );
            pending.insert(handle.id(), task_id);
        }

        let mut results = Vec::with_capacity(pending.len());
        let mut failed = Vec::new();

        while let Some(joined) = tasks.join_next_with_id().await {
            let (task, outcome) = match joined {
                Ok((task, outcome)) => (task, outcome),
                Err(e) => (
                    e.id(),
                    Err(Error::Other(format!("completion task did not finish: {e}"))),
                ),
            };
            let task_id = pending.remove(&task).unwrap_or_default();

            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    metrics::completion_failures()
                        .add(1, &[KeyValue::new("model", model.to_string())]);
                    match self.failure_policy {
                        FailurePolicy::SkipItem => {
                            warn!(task_id = %task_id, error = %e, "item skipped");
                            failed.push(task_id);
                        }
                        FailurePolicy::FailBatch => {
                            error!(task_id = %task_id, error = %e, "item failed, abandoning batch");
                            return Err(e);
                        }
                    }
                }
            }
        }

        Ok((results, failed))
    }
}
