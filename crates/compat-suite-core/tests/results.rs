// compat-suite-core/tests/results.rs
// ============================================================================
// Module: Result Aggregation Tests
// Description: Tests for the invocation/module/case/test result tree.
// Purpose: Ensure result roll-ups count every status correctly.
// ============================================================================

//! ## Overview
//! Validates status transitions, result counting, ordering, and JSON output.

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

use compat_suite_core::InvocationResult;
use compat_suite_core::ModuleResult;
use compat_suite_core::ReportLog;
use compat_suite_core::ResultType;
use compat_suite_core::ResultUnit;
use compat_suite_core::TestResult;
use compat_suite_core::TestStatus;

// ============================================================================
// SECTION: Test Results
// ============================================================================

/// Tests a failure keeps the first trace line as its message.
#[test]
fn test_failed_uses_first_trace_line() {
    let mut result = TestResult::new("testFoo");
    assert_eq!(result.status(), TestStatus::NotExecuted);
    result.failed("java.lang.AssertionError: expected 1\n\tat Foo.testFoo(Foo.java:10)");
    assert_eq!(result.status(), TestStatus::Fail);
    assert_eq!(result.message(), Some("java.lang.AssertionError: expected 1"));
    assert!(result.stack_trace().unwrap().contains("Foo.java:10"));
}

/// Tests a pass does not override an earlier failure.
#[test]
fn test_passed_after_failure_stays_failed() {
    let mut result = TestResult::new("testFoo");
    result.failed("boom");
    result.passed(None);
    assert_eq!(result.status(), TestStatus::Fail);
    result.reset();
    assert_eq!(result.status(), TestStatus::NotExecuted);
    assert_eq!(result.name(), "testFoo");
    assert!(result.message().is_none());
}

/// Tests a passing test keeps its report log.
#[test]
fn test_passed_attaches_report() {
    let mut report = ReportLog::default();
    report.set_summary("Foo#bar", "score", 3.0, ResultType::HigherBetter, ResultUnit::Score).unwrap();
    let mut result = TestResult::new("bar");
    result.passed(Some(report.clone()));
    assert_eq!(result.status(), TestStatus::Pass);
    assert_eq!(result.report_log(), Some(&report));
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Tests counts roll up from tests to the invocation.
#[test]
fn test_count_results_roll_up() {
    let mut invocation = InvocationResult::new(1_000);
    let module = invocation.get_or_create_module("x86 CtsFooTestCases");
    let case = module.get_or_create_result("com.Foo");
    case.get_or_create_result("testA").passed(None);
    case.get_or_create_result("testB").failed("bad");
    case.get_or_create_result("testC");
    module.get_or_create_result("com.Bar").get_or_create_result("testD").passed(None);
    invocation
        .get_or_create_module("arm64-v8a CtsFooTestCases")
        .get_or_create_result("com.Foo")
        .get_or_create_result("testA")
        .passed(None);

    assert_eq!(invocation.count_results(TestStatus::Pass), 3);
    assert_eq!(invocation.count_results(TestStatus::Fail), 1);
    assert_eq!(invocation.count_results(TestStatus::NotExecuted), 1);
    let module = invocation.get_module("x86 CtsFooTestCases").unwrap();
    assert_eq!(module.count_results(TestStatus::Pass), 2);
    assert_eq!(module.get_result("com.Foo").unwrap().count_results(TestStatus::Fail), 1);
}

/// Tests get-or-create returns the existing entry.
#[test]
fn test_get_or_create_is_idempotent() {
    let mut module = ModuleResult::new("x86 CtsFoo");
    module.get_or_create_result("com.Foo").get_or_create_result("testA").failed("first");
    let again = module.get_or_create_result("com.Foo").get_or_create_result("testA");
    assert_eq!(again.status(), TestStatus::Fail);
    assert_eq!(module.results().count(), 1);
}

/// Tests modules iterate in id order and expose their parts.
#[test]
fn test_modules_sorted_by_id() {
    let mut invocation = InvocationResult::new(0);
    for id in ["x86 CtsZeta", "arm64-v8a CtsBeta", "x86 CtsAlpha"] {
        invocation.get_or_create_module(id);
    }
    let ids: Vec<&str> = invocation.modules().map(ModuleResult::id).collect();
    assert_eq!(ids, vec!["arm64-v8a CtsBeta", "x86 CtsAlpha", "x86 CtsZeta"]);
    let module = invocation.get_module("arm64-v8a CtsBeta").unwrap();
    assert_eq!(module.abi(), Some("arm64-v8a"));
    assert_eq!(module.name(), Some("CtsBeta"));
}

/// Tests the result tree serializes with snake case statuses.
#[test]
fn test_invocation_serializes_to_json() {
    let mut invocation = InvocationResult::new(42);
    invocation.set_test_plan("cts");
    invocation.add_build_info("build_fingerprint", "example/fp");
    invocation.add_device_serial("emulator-5554");
    let module = invocation.get_or_create_module("x86 CtsFoo");
    module.set_device_serial("emulator-5554");
    module.get_or_create_result("com.Foo").get_or_create_result("testA");

    let value = serde_json::to_value(&invocation).unwrap();
    assert_eq!(value["start_time_ms"], 42);
    assert_eq!(value["test_plan"], "cts");
    assert_eq!(value["device_serials"][0], "emulator-5554");
    assert_eq!(
        value["modules"]["x86 CtsFoo"]["cases"]["com.Foo"]["results"]["testA"]["status"],
        "not_executed"
    );
}
