// compat-suite-core/src/device/channel.rs
// ============================================================================
// Module: Instrumentation Channel
// Description: Status channel between a device-side test and the host.
// Purpose: Define the status codes and bundle shape used to deliver reports.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A report is delivered as one status message: an integer code plus an
//! optional string bundle. [`ChannelInstrumentation`] forwards messages into a
//! `std::sync::mpsc` channel for in-process hosts and tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::mpsc::Sender;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bundle key carrying the serialized report.
pub const RESULT_KEY: &str = "COMPATIBILITY_TEST_RESULT";
/// Status code sent with a delivered report.
pub const INST_STATUS_IN_PROGRESS: i32 = 2;
/// Status code sent when a report could not be produced.
pub const INST_STATUS_ERROR: i32 = -1;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Key/value payload attached to a status message.
pub type StatusBundle = BTreeMap<String, String>;

/// Status message captured by [`ChannelInstrumentation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Status code.
    pub code: i32,
    /// Optional result bundle.
    pub bundle: Option<StatusBundle>,
}

/// Transport for instrumentation status messages.
pub trait InstrumentationChannel {
    /// Sends one status message.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the message cannot be delivered.
    fn send_status(&mut self, code: i32, bundle: Option<StatusBundle>) -> Result<(), ChannelError>;
}

/// Channel-backed instrumentation transport.
#[derive(Debug, Clone)]
pub struct ChannelInstrumentation {
    /// Sender used to forward status messages.
    sender: Sender<StatusMessage>,
}

impl ChannelInstrumentation {
    /// Creates a transport forwarding into `sender`.
    #[must_use]
    pub const fn new(sender: Sender<StatusMessage>) -> Self {
        Self {
            sender,
        }
    }
}

impl InstrumentationChannel for ChannelInstrumentation {
    fn send_status(&mut self, code: i32, bundle: Option<StatusBundle>) -> Result<(), ChannelError> {
        self.sender
            .send(StatusMessage {
                code,
                bundle,
            })
            .map_err(|err| ChannelError::Closed(err.to_string()))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Status delivery errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Receiving side is gone.
    #[error("instrumentation channel closed: {0}")]
    Closed(String),
}
