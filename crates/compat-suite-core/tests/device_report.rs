// compat-suite-core/tests/device_report.rs
// ============================================================================
// Module: Device Report Tests
// Description: Tests for the device info store and report submission.
// Purpose: Ensure stored streams and submitted status messages are exact.
// ============================================================================

//! ## Overview
//! Validates the info store state machine, multi-stream files, corrupt file
//! handling, and the status messages sent on report submission.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc;

use compat_suite_core::ChannelInstrumentation;
use compat_suite_core::DeviceInfoStore;
use compat_suite_core::DeviceReportLog;
use compat_suite_core::EventSink;
use compat_suite_core::HarnessEvent;
use compat_suite_core::INST_STATUS_ERROR;
use compat_suite_core::INST_STATUS_IN_PROGRESS;
use compat_suite_core::InfoStoreError;
use compat_suite_core::RESULT_KEY;
use compat_suite_core::ReportLog;
use compat_suite_core::ResultType;
use compat_suite_core::ResultUnit;
use compat_suite_core::SubmitOutcome;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Event sink capturing event names.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl EventSink for RecordingSink {
    fn record(&self, event: &HarnessEvent) {
        self.events.lock().unwrap().push(event.event.to_string());
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// SECTION: Info Store
// ============================================================================

/// Tests a fresh store writes one stream object.
#[test]
fn test_store_writes_stream() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DeviceInfoStore::for_report(dir.path(), "Report", "first");
    assert_eq!(store.path(), dir.path().join("Report.reportlog.json"));
    store.open().unwrap();
    store.add_result("latency", 1.5).unwrap();
    store.add_result("label", "fast").unwrap();
    store.add_array_result("samples", [1.0, 2.0]).unwrap();
    store.close().unwrap();
    assert!(!store.is_open());
    assert_eq!(
        read_json(store.path()),
        json!({"first": {"latency": 1.5, "label": "fast", "samples": [1.0, 2.0]}})
    );
}

/// Tests later streams are appended after earlier ones.
#[test]
fn test_store_appends_streams_in_order() {
    let dir = tempfile::tempdir().unwrap();
    for (stream, value) in [("zeta", 1), ("alpha", 2)] {
        let mut store = DeviceInfoStore::for_report(dir.path(), "Report", stream);
        store.open().unwrap();
        store.add_result("value", value).unwrap();
        store.close().unwrap();
    }
    let content = fs::read_to_string(dir.path().join("Report.reportlog.json")).unwrap();
    let zeta_at = content.find("\"zeta\"").unwrap();
    let alpha_at = content.find("\"alpha\"").unwrap();
    assert!(zeta_at < alpha_at, "stream order lost: {content}");
    let value: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value, json!({"zeta": {"value": 1}, "alpha": {"value": 2}}));
}

/// Tests a stream with an existing name replaces the earlier one.
#[test]
fn test_store_replaces_duplicate_stream() {
    let dir = tempfile::tempdir().unwrap();
    for value in [1, 2] {
        let mut store = DeviceInfoStore::for_report(dir.path(), "Report", "same");
        store.open().unwrap();
        store.add_result("value", value).unwrap();
        store.close().unwrap();
    }
    assert_eq!(
        read_json(&dir.path().join("Report.reportlog.json")),
        json!({"same": {"value": 2}})
    );
}

/// Tests the open/closed state machine rejects misuse.
#[test]
fn test_store_state_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DeviceInfoStore::for_report(dir.path(), "Report", "s");
    assert_eq!(store.add_result("x", 1), Err(InfoStoreError::NotOpen("s".to_string())));
    assert_eq!(store.close(), Err(InfoStoreError::NotOpen("s".to_string())));
    store.open().unwrap();
    assert_eq!(store.open(), Err(InfoStoreError::AlreadyOpen("s".to_string())));
    store.close().unwrap();
    assert_eq!(store.close(), Err(InfoStoreError::NotOpen("s".to_string())));
}

/// Tests incomplete or invalid files are reported as corrupt.
#[test]
fn test_store_corrupt_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Report.reportlog.json");
    for content in ["{\"a\": {\"x\": 1}", "not json }", "[1, 2]", ""] {
        fs::write(&path, content).unwrap();
        let mut store = DeviceInfoStore::new(&path, "s");
        let err = store.open().unwrap_err();
        assert!(matches!(err, InfoStoreError::Corrupt { .. }), "accepted {content:?}: {err}");
        assert!(!store.is_open());
    }
}

/// Tests reading every stream of a stored report.
#[test]
fn test_read_report_streams() {
    let dir = tempfile::tempdir().unwrap();
    for stream in ["first", "second"] {
        let mut store = DeviceInfoStore::for_report(dir.path(), "Report", stream);
        store.open().unwrap();
        store.add_result("value", 1).unwrap();
        store.close().unwrap();
    }
    let streams = DeviceInfoStore::read_report(dir.path(), "Report").unwrap();
    assert_eq!(streams.keys().collect::<Vec<_>>(), ["first", "second"]);
    assert_eq!(streams["second"], json!({"value": 1}));

    let err = DeviceInfoStore::read_report(dir.path(), "Absent").unwrap_err();
    assert!(matches!(err, InfoStoreError::NotFound(_)), "{err}");
}

// ============================================================================
// SECTION: Submission
// ============================================================================

/// Tests a complete report is delivered with the in-progress status.
#[test]
fn test_submit_delivers_report() {
    let (sender, receiver) = mpsc::channel();
    let mut channel = ChannelInstrumentation::new(sender);
    let sink = Arc::new(RecordingSink::default());
    let mut log = DeviceReportLog::new("Report", "stream").with_event_sink(sink.clone());
    log.add_values("Foo#bar", "times", &[1.0, 2.0], ResultType::LowerBetter, ResultUnit::Ms)
        .unwrap();
    log.set_summary("Foo#bar", "average", 1.5, ResultType::LowerBetter, ResultUnit::Ms).unwrap();
    let expected = log.report().clone();

    assert_eq!(log.submit(&mut channel), SubmitOutcome::Delivered);

    let message = receiver.recv().unwrap();
    assert_eq!(message.code, INST_STATUS_IN_PROGRESS);
    let bundle = message.bundle.unwrap();
    assert_eq!(bundle.len(), 1);
    assert_eq!(ReportLog::parse(&bundle[RESULT_KEY]).unwrap(), expected);
    assert!(receiver.try_recv().is_err());
    assert_eq!(*sink.events.lock().unwrap(), vec!["report_submitted".to_string()]);
}

/// Tests a report without a summary sends the error status and no bundle.
#[test]
fn test_submit_without_summary_sends_error() {
    let (sender, receiver) = mpsc::channel();
    let mut channel = ChannelInstrumentation::new(sender);
    let mut log = DeviceReportLog::new("Report", "stream");
    log.add_value("Foo#bar", "only", 1.0, ResultType::Neutral, ResultUnit::None).unwrap();

    let outcome = log.submit(&mut channel);
    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));

    let message = receiver.recv().unwrap();
    assert_eq!(message.code, INST_STATUS_ERROR);
    assert!(message.bundle.is_none());
}

/// Tests a closed channel turns delivery into a failed outcome.
#[test]
fn test_submit_to_closed_channel_fails() {
    let (sender, receiver) = mpsc::channel();
    drop(receiver);
    let mut channel = ChannelInstrumentation::new(sender);
    let mut log = DeviceReportLog::new("Report", "stream");
    log.set_summary("Foo#bar", "s", 1.0, ResultType::Neutral, ResultUnit::None).unwrap();
    assert!(matches!(log.submit(&mut channel), SubmitOutcome::Failed { .. }));
}

/// Tests recorded values are mirrored into the info store on submit.
#[test]
fn test_submit_closes_store() {
    let dir = tempfile::tempdir().unwrap();
    let (sender, receiver) = mpsc::channel();
    let mut channel = ChannelInstrumentation::new(sender);
    let mut log = DeviceReportLog::open_in(&dir.path().join("reports"), "Report", "stream").unwrap();
    let store_path = log.store_path().unwrap().to_path_buf();
    log.add_value("Foo#bar", "latency", 4.0, ResultType::LowerBetter, ResultUnit::Ms).unwrap();
    log.add_values("Foo#bar", "frames", &[60.0, 59.5], ResultType::HigherBetter, ResultUnit::Fps)
        .unwrap();
    log.set_summary("Foo#bar", "score", 10.0, ResultType::HigherBetter, ResultUnit::Score).unwrap();

    assert_eq!(log.submit(&mut channel), SubmitOutcome::Delivered);
    assert_eq!(receiver.recv().unwrap().code, INST_STATUS_IN_PROGRESS);
    assert_eq!(
        read_json(&store_path),
        json!({"stream": {"latency": 4.0, "frames": [60.0, 59.5], "score": 10.0}})
    );
}

/// Tests rejected values are not mirrored into the store.
#[test]
fn test_rejected_values_not_mirrored() {
    let dir = tempfile::tempdir().unwrap();
    let (sender, _receiver) = mpsc::channel();
    let mut channel = ChannelInstrumentation::new(sender);
    let mut log = DeviceReportLog::open_in(dir.path(), "Report", "stream").unwrap();
    let store_path = log.store_path().unwrap().to_path_buf();
    assert!(log.add_value("Foo#bar", "bad", f64::NAN, ResultType::Neutral, ResultUnit::None).is_err());
    log.set_summary("Foo#bar", "ok", 1.0, ResultType::Neutral, ResultUnit::None).unwrap();
    assert_eq!(log.submit(&mut channel), SubmitOutcome::Delivered);
    assert_eq!(read_json(&store_path), json!({"stream": {"ok": 1.0}}));
}
