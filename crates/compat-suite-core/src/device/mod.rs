// compat-suite-core/src/device/mod.rs
// ============================================================================
// Module: Compat Suite Device Reporting
// Description: Device-side report delivery and the on-device info store.
// Purpose: Hand report logs from a running test to the host aggregator.
// Dependencies: serde_json, tempfile, thiserror
// ============================================================================

//! ## Overview
//! Device-side tests record metrics into a [`DeviceReportLog`], which mirrors
//! them into a [`DeviceInfoStore`] file and finally submits the serialized
//! report through an [`InstrumentationChannel`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod channel;
pub mod info_store;
pub mod report_log;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use channel::ChannelError;
pub use channel::ChannelInstrumentation;
pub use channel::INST_STATUS_ERROR;
pub use channel::INST_STATUS_IN_PROGRESS;
pub use channel::InstrumentationChannel;
pub use channel::RESULT_KEY;
pub use channel::StatusBundle;
pub use channel::StatusMessage;
pub use info_store::DeviceInfoStore;
pub use info_store::InfoStoreError;
pub use info_store::REPORT_FILE_SUFFIX;
pub use report_log::DeviceReportError;
pub use report_log::DeviceReportLog;
pub use report_log::SubmitOutcome;
