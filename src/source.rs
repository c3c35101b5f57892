//! Benchmark source reader.
//!
//! The source is a JSON-lines file, one task record per line, read in full
//! before any dispatch begins.

use crate::error::{Error, Result};
use crate::model::WorkItem;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default input location relative to the base directory.
pub const DEFAULT_INPUT: &str = "data/HumanEval.jsonl";

/// Resolve the default input file under `base_dir`.
pub fn input_path(base_dir: &Path) -> PathBuf {
    base_dir.join(DEFAULT_INPUT)
}

/// Read every work item from `path`, preserving file order.
///
/// Blank lines are skipped. Any other line that is not a record with string
/// `task_id` and `prompt` fields fails the whole read.
pub fn read_work_items(path: &Path) -> Result<Vec<WorkItem>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let items = parse_work_items(path, &content)?;
    debug!(path = %path.display(), count = items.len(), "source loaded");
    Ok(items)
}

fn parse_work_items(path: &Path, content: &str) -> Result<Vec<WorkItem>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<WorkItem>(line).map_err(|source| Error::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })
        })
        .collect()
}
