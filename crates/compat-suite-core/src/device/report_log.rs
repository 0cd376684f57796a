// compat-suite-core/src/device/report_log.rs
// ============================================================================
// Module: Device Report Log
// Description: Report log bound to a device info store and status channel.
// Purpose: Record metrics on the device and deliver them to the host once.
// Dependencies: crate::{metrics, events}, thiserror
// ============================================================================

//! ## Overview
//! [`DeviceReportLog`] wraps a [`ReportLog`]. Recorded values are mirrored
//! into an optional [`DeviceInfoStore`]; mirror failures are logged and never
//! fail the test. [`DeviceReportLog::submit`] consumes the log, so a report
//! is delivered at most once.
//!
//! Invariants:
//! - Exactly one status message is sent per submission.
//! - Successful submissions carry the serialized report under
//!   [`RESULT_KEY`]; failures send [`INST_STATUS_ERROR`] with no bundle.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::device::channel::INST_STATUS_ERROR;
use crate::device::channel::INST_STATUS_IN_PROGRESS;
use crate::device::channel::InstrumentationChannel;
use crate::device::channel::RESULT_KEY;
use crate::device::channel::StatusBundle;
use crate::device::info_store::DeviceInfoStore;
use crate::device::info_store::InfoStoreError;
use crate::events::EventOutcome;
use crate::events::EventSink;
use crate::events::HarnessEvent;
use crate::events::NoopEventSink;
use crate::metrics::ReportError;
use crate::metrics::ReportLog;
use crate::metrics::ResultType;
use crate::metrics::ResultUnit;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Component name used in emitted events.
const COMPONENT: &str = "device_report_log";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of a report submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The report was sent with [`INST_STATUS_IN_PROGRESS`].
    Delivered,
    /// The error status was sent instead.
    Failed {
        /// Why the report could not be delivered.
        reason: String,
    },
}

/// Device-side report log.
pub struct DeviceReportLog {
    /// Accumulated metrics.
    report: ReportLog,
    /// Optional on-device mirror of recorded values.
    store: Option<DeviceInfoStore>,
    /// Destination for operational events.
    events: Arc<dyn EventSink>,
}

impl DeviceReportLog {
    /// Creates a report log without an info store.
    #[must_use]
    pub fn new(name: impl Into<String>, stream_name: impl Into<String>) -> Self {
        Self {
            report: ReportLog::new(name, stream_name),
            store: None,
            events: Arc::new(NoopEventSink),
        }
    }

    /// Creates a report log mirrored into `dir/<name>.reportlog.json`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceReportError`] when the directory cannot be created or
    /// the existing store file cannot be loaded.
    pub fn open_in(dir: &Path, name: &str, stream_name: &str) -> Result<Self, DeviceReportError> {
        fs::create_dir_all(dir).map_err(|err| DeviceReportError::Io(err.to_string()))?;
        let mut store = DeviceInfoStore::for_report(dir, name, stream_name);
        store.open()?;
        Ok(Self {
            report: ReportLog::new(name, stream_name),
            store: Some(store),
            events: Arc::new(NoopEventSink),
        })
    }

    /// Routes operational events to `events`.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the accumulated report.
    #[must_use]
    pub const fn report(&self) -> &ReportLog {
        &self.report
    }

    /// Returns the info store file, when one is attached.
    #[must_use]
    pub fn store_path(&self) -> Option<&Path> {
        self.store.as_ref().map(DeviceInfoStore::path)
    }

    /// Records a single-valued metric.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the report rejects the value.
    pub fn add_value(
        &mut self,
        test_id: &str,
        message: &str,
        value: f64,
        result_type: ResultType,
        unit: ResultUnit,
    ) -> Result<(), ReportError> {
        self.report.add_value(test_id, message, value, result_type, unit)?;
        self.mirror(message, |store| store.add_result(message, value));
        Ok(())
    }

    /// Records a multi-valued metric.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the report rejects the values.
    pub fn add_values(
        &mut self,
        test_id: &str,
        message: &str,
        values: &[f64],
        result_type: ResultType,
        unit: ResultUnit,
    ) -> Result<(), ReportError> {
        self.report.add_values(test_id, message, values, result_type, unit)?;
        self.mirror(message, |store| store.add_array_result(message, values.iter().copied()));
        Ok(())
    }

    /// Sets the summary metric.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the report rejects the value.
    pub fn set_summary(
        &mut self,
        test_id: &str,
        message: &str,
        value: f64,
        result_type: ResultType,
        unit: ResultUnit,
    ) -> Result<(), ReportError> {
        self.report.set_summary(test_id, message, value, result_type, unit)?;
        self.mirror(message, |store| store.add_result(message, value));
        Ok(())
    }

    /// Closes the store, serializes the report, and sends one status message.
    pub fn submit<C>(mut self, channel: &mut C) -> SubmitOutcome
    where
        C: InstrumentationChannel + ?Sized,
    {
        let subject = self.report.stream_name().to_string();
        match self.render() {
            Ok(payload) => {
                let mut bundle = StatusBundle::new();
                bundle.insert(RESULT_KEY.to_string(), payload);
                match channel.send_status(INST_STATUS_IN_PROGRESS, Some(bundle)) {
                    Ok(()) => {
                        self.log(
                            HarnessEvent::new("report_submitted", COMPONENT, EventOutcome::Success)
                                .with_subject(subject),
                        );
                        SubmitOutcome::Delivered
                    }
                    Err(err) => self.fail(subject, err.to_string()),
                }
            }
            Err(reason) => {
                if let Err(err) = channel.send_status(INST_STATUS_ERROR, None) {
                    self.log(
                        HarnessEvent::new("status_send_failed", COMPONENT, EventOutcome::Error)
                            .with_subject(subject.clone())
                            .with_detail(err.to_string()),
                    );
                }
                self.fail(subject, reason)
            }
        }
    }

    /// Closes the store and serializes the report.
    fn render(&mut self) -> Result<String, String> {
        if let Some(store) = self.store.as_mut()
            && store.is_open()
        {
            store.close().map_err(|err| err.to_string())?;
        }
        self.report.serialize().map_err(|err| err.to_string())
    }

    /// Logs a failed submission.
    fn fail(&self, subject: String, reason: String) -> SubmitOutcome {
        self.log(
            HarnessEvent::new("report_submit_failed", COMPONENT, EventOutcome::Error)
                .with_subject(subject)
                .with_detail(reason.clone()),
        );
        SubmitOutcome::Failed {
            reason,
        }
    }

    /// Applies `record` to the store, logging instead of failing.
    fn mirror<F>(&mut self, message: &str, record: F)
    where
        F: FnOnce(&mut DeviceInfoStore) -> Result<(), InfoStoreError>,
    {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(err) = record(store) {
            self.log(
                HarnessEvent::new("store_record_failed", COMPONENT, EventOutcome::Degraded)
                    .with_subject(message)
                    .with_detail(err.to_string()),
            );
        }
    }

    /// Records an event.
    fn log(&self, event: HarnessEvent) {
        self.events.record(&event);
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Device report log setup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceReportError {
    /// Report directory could not be prepared.
    #[error("device report io error: {0}")]
    Io(String),
    /// Info store could not be opened.
    #[error(transparent)]
    Store(#[from] InfoStoreError),
}
