//! Integration tests for logger construction, level gating and sink fan-out.
//!
//! The console sink is replaced with an in-memory buffer and fatal logging
//! uses a recording terminator, so nothing here writes to stderr or exits.

use serde_json::Value;
use service_bootstrap::logging::{
    Field, Level, Logger, LoggerBuilder, RecordingTerminator, SharedBuffer, StructuredLogger,
};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

/// Logger at `level` writing to an in-memory console and, optionally, a file.
fn build(
    level: &str,
    file: Option<&Path>,
) -> (StructuredLogger, SharedBuffer, Arc<RecordingTerminator>) {
    let console = SharedBuffer::new();
    let terminator = Arc::new(RecordingTerminator::new());
    let mut builder = LoggerBuilder::new(level)
        .console_writer(console.clone())
        .terminator(terminator.clone());
    if let Some(path) = file {
        builder = builder.output_path(path);
    }
    let logger = builder.build().expect("Failed to build logger");
    (logger, console, terminator)
}

fn parse(lines: &[String]) -> Vec<Value> {
    lines
        .iter()
        .map(|l| serde_json::from_str(l).expect("log line is not JSON"))
        .collect()
}

fn levels(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["level"].as_str().unwrap().to_string())
        .collect()
}

fn log_all_levels(logger: &dyn Logger) {
    logger.debug("debug message", &[]);
    logger.info("info message", &[]);
    logger.warn("warn message", &[]);
    logger.error("error message", &[]);
    logger.fatal("fatal message", &[]);
}

#[test]
fn test_warn_threshold() {
    let (logger, console, terminator) = build("warn", None);
    log_all_levels(&logger);

    let records = parse(&console.lines());
    assert_eq!(levels(&records), vec!["warn", "error", "fatal"]);
    assert_eq!(terminator.invocations(), 1);
}

#[test]
fn test_unknown_level_behaves_as_info() {
    let (logger, console, _) = build("trace", None);
    assert_eq!(logger.level(), Level::Info);
    log_all_levels(&logger);

    let records = parse(&console.lines());
    assert_eq!(levels(&records), vec!["info", "warn", "error", "fatal"]);
}

#[test]
fn test_fatal_always_emitted() {
    let (logger, console, terminator) = build("fatal", None);
    logger.error("dropped", &[]);
    logger.fatal("going down", &[Field::new("reason", "disk")]);

    let records = parse(&console.lines());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["msg"], "going down");
    assert_eq!(records[0]["reason"], "disk");
    assert_eq!(terminator.codes(), vec![1]);
}

#[test]
fn test_with_does_not_mutate_parent() {
    let (parent, console, _) = build("debug", None);
    let child = parent.with(&[Field::new("request_id", "abc")]);

    child.info("from child", &[]);
    parent.info("from parent", &[]);

    let records = parse(&console.lines());
    assert_eq!(records[0]["request_id"], "abc");
    assert!(records[1].get("request_id").is_none());
    assert!(parent.fields().is_empty());
}

#[test]
fn test_with_extends_and_overrides() {
    let (root, console, _) = build("info", None);
    let a = root.with(&[Field::new("svc", "api"), Field::new("zone", "eu")]);
    let b = a.with(&[Field::new("zone", "us")]);

    b.info("msg", &[]);
    a.info("msg", &[]);

    let records = parse(&console.lines());
    assert_eq!(records[0]["svc"], "api");
    assert_eq!(records[0]["zone"], "us");
    assert_eq!(records[1]["zone"], "eu");
}

#[test]
fn test_file_and_console_receive_identical_records() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("service.log");
    let (logger, console, _) = build("info", Some(path.as_path()));

    logger.debug("below threshold", &[]);
    logger.info("started", &[Field::new("port", 8080)]);
    logger.error("failed", &[Field::new("attempt", 3)]);
    logger.flush();

    let file_lines: Vec<String> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect();
    let console_lines = console.lines();

    assert_eq!(file_lines.len(), 2);
    assert_eq!(file_lines, console_lines);

    let records = parse(&file_lines);
    assert_eq!(records[0]["msg"], "started");
    assert_eq!(records[0]["port"], 8080);
    assert_eq!(records[1]["attempt"], 3);
}

#[test]
fn test_file_sink_appends_across_loggers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("service.log");

    let (first, _, _) = build("info", Some(path.as_path()));
    first.info("one", &[]);
    first.flush();
    drop(first);

    let (second, _, _) = build("info", Some(path.as_path()));
    second.info("two", &[]);
    second.flush();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn test_open_failure_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing").join("service.log");

    let result = LoggerBuilder::new("info")
        .console_writer(SharedBuffer::new())
        .output_path(&path)
        .build();
    assert!(result.is_err());
}

#[test]
fn test_record_shape() {
    let (logger, console, _) = build("debug", None);
    let named = logger.named("api");
    named.info("hello", &[Field::new("k", "v")]);
    named.error("oops", &[]);

    let records = parse(&console.lines());
    let info = &records[0];
    assert_eq!(info["level"], "info");
    assert_eq!(info["logger"], "api");
    assert_eq!(info["msg"], "hello");
    assert_eq!(info["k"], "v");
    assert!(info["time"].as_str().unwrap().contains('T'));
    assert!(info.get("caller").is_none());

    let error = &records[1];
    assert!(error["caller"].is_string());
    assert!(error["stacktrace"].is_string());
}

#[test]
fn test_concurrent_logging_produces_whole_lines() {
    let (logger, console, _) = build("info", None);
    let logger: Arc<dyn Logger> = Arc::new(logger);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let logger = logger.with(&[Field::new("worker", worker)]);
            thread::spawn(move || {
                for i in 0..25 {
                    logger.info("tick", &[Field::new("i", i)]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let records = parse(&console.lines());
    assert_eq!(records.len(), 200);
    assert!(records.iter().all(|r| r["msg"] == "tick"));
}
