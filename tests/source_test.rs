//! Integration tests for the benchmark source reader.

use codegen_eval::error::Error;
use codegen_eval::model::WorkItem;
use codegen_eval::source::{input_path, read_work_items};
use std::path::Path;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn reads_items_in_file_order_and_ignores_extra_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "bench.jsonl",
        concat!(
            r#"{"task_id": "HumanEval/0", "prompt": "def a():\n", "entry_point": "a", "test": "assert a()"}"#,
            "\n",
            r#"{"task_id": "HumanEval/1", "prompt": "def b():\n", "canonical_solution": "    return 1"}"#,
            "\n",
        ),
    );

    let items = read_work_items(&path).unwrap();
    assert_eq!(
        items,
        vec![
            WorkItem::new("HumanEval/0", "def a():\n"),
            WorkItem::new("HumanEval/1", "def b():\n"),
        ]
    );
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "bench.jsonl",
        "{\"task_id\": \"t1\", \"prompt\": \"p1\"}\n\n   \n{\"task_id\": \"t2\", \"prompt\": \"p2\"}\n",
    );

    let items = read_work_items(&path).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].id, "t2");
}

#[test]
fn empty_file_yields_no_items() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "empty.jsonl", "");

    assert!(read_work_items(&path).unwrap().is_empty());
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_work_items(&dir.path().join("nope.jsonl")).unwrap_err();

    assert!(matches!(err, Error::Read { .. }));
}

#[test]
fn malformed_line_reports_its_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "bench.jsonl",
        "{\"task_id\": \"t1\", \"prompt\": \"p1\"}\nnot json at all\n",
    );

    match read_work_items(&path).unwrap_err() {
        Error::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn record_without_prompt_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bench.jsonl", "{\"task_id\": \"t1\"}\n");

    let err = read_work_items(&path).unwrap_err();
    assert!(matches!(err, Error::Parse { line: 1, .. }));
}

#[test]
fn default_input_lives_under_data() {
    let path = input_path(Path::new("/work"));
    assert_eq!(path, Path::new("/work/data/HumanEval.jsonl"));
}
