// compat-suite-core/tests/proptest_report_log.rs
// ============================================================================
// Module: Report Log Property Tests
// Description: Property-based checks for the report log XML encoding.
// Purpose: Detect round-trip drift across generated reports.
// ============================================================================

//! ## Overview
//! Generated reports must decode to exactly the report that was encoded.

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

use compat_suite_core::ReportLog;
use compat_suite_core::ResultType;
use compat_suite_core::ResultUnit;
use proptest::prelude::*;

fn result_type() -> impl Strategy<Value = ResultType> {
    prop_oneof![
        Just(ResultType::HigherBetter),
        Just(ResultType::LowerBetter),
        Just(ResultType::Neutral),
    ]
}

fn result_unit() -> impl Strategy<Value = ResultUnit> {
    prop_oneof![
        Just(ResultUnit::None),
        Just(ResultUnit::Ms),
        Just(ResultUnit::Fps),
        Just(ResultUnit::Kbps),
        Just(ResultUnit::Byte),
        Just(ResultUnit::Score),
    ]
}

fn label() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.#<>&\"' -]{1,24}"
}

fn detail() -> impl Strategy<Value = (String, Vec<f64>, ResultType, ResultUnit)> {
    (label(), prop::collection::vec(-1.0e9_f64 .. 1.0e9, 1 .. 6), result_type(), result_unit())
}

proptest! {
    #[test]
    fn report_round_trips(
        name in label(),
        stream in label(),
        summary_value in -1.0e12_f64 .. 1.0e12,
        summary_type in result_type(),
        summary_unit in result_unit(),
        details in prop::collection::vec(detail(), 0 .. 6),
    ) {
        let mut report = ReportLog::new(name, stream);
        report
            .set_summary("Generated#summary", "summary", summary_value, summary_type, summary_unit)
            .unwrap();
        for (index, (message, values, result_type, unit)) in details.into_iter().enumerate() {
            let message = format!("{message}-{index}");
            report.add_values("Generated#detail", &message, &values, result_type, unit).unwrap();
        }
        let xml = report.serialize().unwrap();
        let parsed = ReportLog::parse(&xml).unwrap();
        prop_assert_eq!(parsed, report);
    }
}
