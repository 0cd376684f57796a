// compat-suite-core/src/metrics/report_log.rs
// ============================================================================
// Module: Metrics Report Log
// Description: Ordered collection of metric entries plus a summary.
// Purpose: Accumulate test metrics for delivery to the host aggregator.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ReportLog`] holds detail metrics in insertion order, each identified by
//! an explicit `(test_id, message)` pair, and at most one single-valued
//! summary. Entries are validated on insertion and immutable afterwards. The
//! XML encoding lives in [`crate::metrics::codec`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::metrics::codec;
use crate::metrics::taxonomy::FormatError;
use crate::metrics::taxonomy::ResultType;
use crate::metrics::taxonomy::ResultUnit;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Report name used when a test does not choose one.
pub const DEFAULT_REPORT_LOG_NAME: &str = "DefaultDeviceTestMetrics";
/// Stream name used when a test does not choose one.
pub const DEFAULT_STREAM_NAME: &str = "DefaultStream";

// ============================================================================
// SECTION: Metric Entry
// ============================================================================

/// One named metric with its samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEntry {
    /// Test identifier, conventionally `Class#method`.
    test_id: String,
    /// Human-readable metric label.
    message: String,
    /// Samples in the order they were recorded.
    values: Vec<f64>,
    /// Direction in which the metric improves.
    result_type: ResultType,
    /// Unit of every sample.
    unit: ResultUnit,
}

impl MetricEntry {
    /// Creates a validated metric entry.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::EmptyValues`] when `values` is empty and
    /// [`ReportError::NonFiniteValue`] when any value is `NaN` or infinite.
    pub fn new(
        test_id: impl Into<String>,
        message: impl Into<String>,
        values: Vec<f64>,
        result_type: ResultType,
        unit: ResultUnit,
    ) -> Result<Self, ReportError> {
        let test_id = test_id.into();
        let message = message.into();
        if values.is_empty() {
            return Err(ReportError::EmptyValues {
                test_id,
                message,
            });
        }
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ReportError::NonFiniteValue {
                test_id,
                message,
            });
        }
        Ok(Self {
            test_id,
            message,
            values,
            result_type,
            unit,
        })
    }

    /// Returns the test identifier.
    #[must_use]
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// Returns the metric label.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the recorded samples.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the result type.
    #[must_use]
    pub const fn result_type(&self) -> ResultType {
        self.result_type
    }

    /// Returns the result unit.
    #[must_use]
    pub const fn unit(&self) -> ResultUnit {
        self.unit
    }

    /// Returns true when this entry has the given identity.
    fn is_keyed(&self, test_id: &str, message: &str) -> bool {
        self.test_id == test_id && self.message == message
    }
}

// ============================================================================
// SECTION: Report Log
// ============================================================================

/// Metrics report for one test stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLog {
    /// Report name; also names the device-side stream file.
    name: String,
    /// Stream name inside the report file.
    stream_name: String,
    /// Single-valued headline metric.
    summary: Option<MetricEntry>,
    /// Detail metrics in insertion order.
    details: Vec<MetricEntry>,
}

impl Default for ReportLog {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_LOG_NAME, DEFAULT_STREAM_NAME)
    }
}

impl ReportLog {
    /// Creates an empty report.
    #[must_use]
    pub fn new(name: impl Into<String>, stream_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stream_name: stream_name.into(),
            summary: None,
            details: Vec::new(),
        }
    }

    /// Returns the report name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stream name.
    #[must_use]
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Returns the summary, if set.
    #[must_use]
    pub const fn summary(&self) -> Option<&MetricEntry> {
        self.summary.as_ref()
    }

    /// Returns the detail metrics in insertion order.
    #[must_use]
    pub fn details(&self) -> &[MetricEntry] {
        &self.details
    }

    /// Records a single-valued detail metric.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the value is not finite or the
    /// `(test_id, message)` pair was already recorded.
    pub fn add_value(
        &mut self,
        test_id: &str,
        message: &str,
        value: f64,
        result_type: ResultType,
        unit: ResultUnit,
    ) -> Result<(), ReportError> {
        self.add_values(test_id, message, &[value], result_type, unit)
    }

    /// Records a multi-valued detail metric; sample order is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when `values` is empty, contains a non-finite
    /// value, or the `(test_id, message)` pair was already recorded.
    pub fn add_values(
        &mut self,
        test_id: &str,
        message: &str,
        values: &[f64],
        result_type: ResultType,
        unit: ResultUnit,
    ) -> Result<(), ReportError> {
        let entry = MetricEntry::new(test_id, message, values.to_vec(), result_type, unit)?;
        self.add_entry(entry)
    }

    /// Appends a prebuilt detail entry.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::DuplicateMetric`] when the entry's identity is
    /// already present.
    pub fn add_entry(&mut self, entry: MetricEntry) -> Result<(), ReportError> {
        if self.details.iter().any(|existing| existing.is_keyed(&entry.test_id, &entry.message)) {
            return Err(ReportError::DuplicateMetric {
                test_id: entry.test_id,
                message: entry.message,
            });
        }
        self.details.push(entry);
        Ok(())
    }

    /// Sets the summary metric, replacing any earlier summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::NonFiniteValue`] when the value is not finite.
    pub fn set_summary(
        &mut self,
        test_id: &str,
        message: &str,
        value: f64,
        result_type: ResultType,
        unit: ResultUnit,
    ) -> Result<(), ReportError> {
        self.summary = Some(MetricEntry::new(test_id, message, vec![value], result_type, unit)?);
        Ok(())
    }

    /// Installs an already validated summary entry.
    pub(crate) fn replace_summary(&mut self, entry: MetricEntry) {
        self.summary = Some(entry);
    }

    /// Encodes the report as XML.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingSummary`] when no summary is set.
    pub fn serialize(&self) -> Result<String, ReportError> {
        codec::serialize(self)
    }

    /// Decodes a report from XML.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the document is malformed or incomplete.
    pub fn parse(xml: &str) -> Result<Self, ReportError> {
        codec::parse(xml)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report log construction and encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Malformed or incomplete XML input.
    #[error("report log parse error at {fragment}: {reason}")]
    Parse {
        /// Element, attribute, or text where parsing stopped.
        fragment: String,
        /// What was wrong with it.
        reason: String,
    },
    /// Serialization was attempted without a summary.
    #[error("report log has no summary")]
    MissingSummary,
    /// A metric with the same identity already exists.
    #[error("duplicate metric {test_id} / {message}")]
    DuplicateMetric {
        /// Test identifier of the duplicate.
        test_id: String,
        /// Metric label of the duplicate.
        message: String,
    },
    /// A metric was recorded without values.
    #[error("metric {test_id} / {message} has no values")]
    EmptyValues {
        /// Test identifier of the metric.
        test_id: String,
        /// Metric label of the metric.
        message: String,
    },
    /// A metric value was `NaN` or infinite.
    #[error("metric {test_id} / {message} has a non-finite value")]
    NonFiniteValue {
        /// Test identifier of the metric.
        test_id: String,
        /// Metric label of the metric.
        message: String,
    },
    /// Unknown result type or unit token.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// XML writer failure.
    #[error("report log encode error: {0}")]
    Encode(String),
}
