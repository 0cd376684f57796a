// compat-suite-core/src/metrics/mod.rs
// ============================================================================
// Module: Compat Suite Metrics
// Description: Statistics, result taxonomy, and the metrics report log.
// Purpose: Turn measured samples into a structured, serializable report.
// Dependencies: quick-xml, serde, thiserror
// ============================================================================

//! ## Overview
//! Metrics are accumulated into a [`ReportLog`] keyed by test id and message,
//! tagged with a [`ResultType`] and [`ResultUnit`], and encoded as XML for
//! delivery to the host aggregator. [`stat`] provides the helpers tests use to
//! derive the values they report.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod codec;
pub mod report_log;
pub mod stat;
pub mod taxonomy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use report_log::DEFAULT_REPORT_LOG_NAME;
pub use report_log::DEFAULT_STREAM_NAME;
pub use report_log::MetricEntry;
pub use report_log::ReportError;
pub use report_log::ReportLog;
pub use stat::MIN_ELAPSED_MS;
pub use stat::MeasureRun;
pub use stat::OutlierRejection;
pub use stat::StatError;
pub use stat::StatResult;
pub use taxonomy::FormatError;
pub use taxonomy::ResultType;
pub use taxonomy::ResultUnit;
