//! Dispatch span helpers.
//!
//! One span per run, one child span per batch.

use tracing::Span;
use uuid::Uuid;

/// Start the span for a whole run.
pub fn start_run_span(run_id: &Uuid, model: &str, items: usize, batch_size: usize) -> Span {
    tracing::info_span!(
        "dispatch.run",
        "run.id" = %run_id,
        "run.model" = model,
        "run.items" = items,
        "run.batch_size" = batch_size,
    )
}

/// Start the span for one batch.
///
/// `batch.written` and `batch.failed` are declared empty and filled via
/// [`record_batch_outcome`] once the join barrier has passed.
pub fn start_batch_span(index: usize, size: usize) -> Span {
    tracing::info_span!(
        "dispatch.batch",
        "batch.index" = index,
        "batch.size" = size,
        "batch.written" = tracing::field::Empty,
        "batch.failed" = tracing::field::Empty,
    )
}

pub fn record_batch_outcome(span: &Span, written: usize, failed: usize) {
    span.record("batch.written", written);
    span.record("batch.failed", failed);
}
