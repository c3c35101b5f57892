//! Core data model.
//!
//! A work item is one benchmark task: an identifier and the prompt sent to
//! the model. A completion result pairs that identifier with the code the
//! model produced. Both use the benchmark's `task_id` field name on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Work Item
// ---------------------------------------------------------------------------

/// A benchmark task read from the source file.
///
/// Records usually carry more fields (`entry_point`, `canonical_solution`,
/// `test`); those are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkItem {
    #[serde(rename = "task_id")]
    pub id: String,
    pub prompt: String,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Completion Result
// ---------------------------------------------------------------------------

/// One line of the output sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    #[serde(rename = "task_id")]
    pub id: String,
    pub completion: String,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What happened to a single batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Zero-based batch index within the run.
    pub index: usize,
    pub size: usize,
    pub written: usize,
    /// Task ids that exhausted their retry budget.
    pub failed: Vec<String>,
    pub duration: Duration,
}

/// Totals for a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub model: String,
    pub batches: usize,
    pub written: usize,
    pub failed: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub(crate) fn start(model: &str) -> Self {
        let now = Utc::now();
        Self {
            model: model.to_string(),
            batches: 0,
            written: 0,
            failed: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn absorb(&mut self, report: BatchReport) {
        self.batches += 1;
        self.written += report.written;
        self.failed.extend(report.failed);
    }
}
