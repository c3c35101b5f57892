//! Append-only JSON-lines output sink.
//!
//! The file is truncated once at the start of a run and then appended to
//! once per batch. Each append opens, writes, flushes, and closes the file
//! so completed batches are on disk before the next batch starts.

use crate::error::{Error, Result};
use crate::model::CompletionResult;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output location for `model` under `base_dir`:
/// `<base_dir>/results/results-<model>.jsonl`.
pub fn output_path(base_dir: &Path, model: &str) -> PathBuf {
    base_dir
        .join("results")
        .join(format!("results-{model}.jsonl"))
}

#[derive(Debug, Clone)]
pub struct OutputSink {
    path: PathBuf,
}

impl OutputSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sink for `model` at the conventional location under `base_dir`.
    pub fn for_model(base_dir: &Path, model: &str) -> Self {
        Self::new(output_path(base_dir, model))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file (and its parent directory) or empty an existing one.
    pub fn truncate(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| self.err(e))?;
        }
        std::fs::File::create(&self.path).map_err(|e| self.err(e))?;
        debug!(path = %self.path.display(), "sink truncated");
        Ok(())
    }

    /// Append `results` in the given order, one JSON object per line.
    pub fn append(&self, results: &[CompletionResult]) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.err(e))?;
        let mut out = BufWriter::new(file);

        for result in results {
            serde_json::to_writer(&mut out, result)
                .map_err(|e| self.err(std::io::Error::other(e)))?;
            out.write_all(b"\n").map_err(|e| self.err(e))?;
        }
        out.flush().map_err(|e| self.err(e))?;
        Ok(())
    }

    fn err(&self, source: std::io::Error) -> Error {
        Error::Sink {
            path: self.path.clone(),
            source,
        }
    }
}
