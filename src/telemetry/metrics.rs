//! Metric instrument factories for codegen-eval.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"codegen-eval"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for codegen-eval instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("codegen-eval")
}

/// Counter: requests sent to the completion service, retries included.
/// Labels: `model`, `result` ("ok" | "error").
pub fn completion_attempts() -> Counter<u64> {
    meter()
        .u64_counter("codegen_eval.completion.attempts")
        .with_description("Completion service requests, retries included")
        .build()
}

/// Counter: items that exhausted their retry budget.
/// Labels: `model`.
pub fn completion_failures() -> Counter<u64> {
    meter()
        .u64_counter("codegen_eval.completion.failures")
        .with_description("Work items that exhausted their retry budget")
        .build()
}

/// Counter: batches flushed to the output sink.
/// Labels: `model`.
pub fn batches_flushed() -> Counter<u64> {
    meter()
        .u64_counter("codegen_eval.batch.flushed")
        .with_description("Batches appended to the output sink")
        .build()
}

/// Counter: result lines written to the output sink.
/// Labels: `model`.
pub fn results_written() -> Counter<u64> {
    meter()
        .u64_counter("codegen_eval.results.written")
        .with_description("Completion results written to the output sink")
        .build()
}

/// Histogram: wall time from batch spawn to flush, in milliseconds.
/// Labels: `model`.
pub fn batch_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("codegen_eval.batch.duration_ms")
        .with_description("Batch duration in milliseconds")
        .with_unit("ms")
        .build()
}
