// compat-suite-core/src/lib.rs
// ============================================================================
// Module: Compat Suite Core Library
// Description: Public API surface for the Compat Suite core.
// Purpose: Expose metrics reporting, device delivery, filtering, and results.
// Dependencies: crate::{metrics, device, filter, results, events}
// ============================================================================

//! ## Overview
//! Compat Suite core provides the reusable pieces of a compatibility test
//! harness: statistics over measured samples, the metrics report log and its
//! XML wire encoding, device-side delivery of reports over an instrumentation
//! status channel, test selection filters, and the host-side result model.
//! It performs no device management and integrates through explicit traits.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod device;
pub mod events;
pub mod filter;
pub mod metrics;
pub mod results;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use device::ChannelError;
pub use device::ChannelInstrumentation;
pub use device::DeviceInfoStore;
pub use device::DeviceReportError;
pub use device::DeviceReportLog;
pub use device::INST_STATUS_ERROR;
pub use device::INST_STATUS_IN_PROGRESS;
pub use device::InfoStoreError;
pub use device::InstrumentationChannel;
pub use device::RESULT_KEY;
pub use device::StatusBundle;
pub use device::StatusMessage;
pub use device::SubmitOutcome;
pub use events::EventOutcome;
pub use events::EventSink;
pub use events::FileEventSink;
pub use events::HarnessEvent;
pub use events::NoopEventSink;
pub use events::StderrEventSink;
pub use filter::FilterArgs;
pub use filter::FilterError;
pub use filter::OptionRegistry;
pub use filter::OptionSource;
pub use filter::OptionSpec;
pub use filter::SUPPORTED_ABIS;
pub use filter::TestCase;
pub use filter::TestClass;
pub use filter::TestFilter;
pub use filter::TestSuite;
pub use filter::create_module_id;
pub use filter::create_suite;
pub use filter::get_option_names;
pub use filter::get_option_short_names;
pub use filter::get_valid_cli_args;
pub use filter::parse_module_id;
pub use metrics::FormatError;
pub use metrics::MeasureRun;
pub use metrics::MetricEntry;
pub use metrics::OutlierRejection;
pub use metrics::ReportError;
pub use metrics::ReportLog;
pub use metrics::ResultType;
pub use metrics::ResultUnit;
pub use metrics::StatError;
pub use metrics::StatResult;
pub use results::CaseResult;
pub use results::InvocationResult;
pub use results::ModuleResult;
pub use results::TestResult;
pub use results::TestStatus;
