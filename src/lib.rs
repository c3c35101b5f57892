//! # codegen-eval
//!
//! Runs a code-generation benchmark against a hosted model.
//!
//! Benchmark tasks are read from a JSON-lines file, sent to the completion
//! service in fixed-size concurrent batches with randomized exponential
//! backoff on failure, and the extracted code is appended to a per-model
//! JSON-lines results file one batch at a time.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod model;
pub mod retry;
pub mod sink;
pub mod source;
pub mod telemetry;
