// compat-suite-core/src/metrics/taxonomy.rs
// ============================================================================
// Module: Result Taxonomy
// Description: Closed vocabularies for metric direction and unit.
// Purpose: Map result types and units to stable wire tokens.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every reported metric carries a [`ResultType`] (how to compare values) and
//! a [`ResultUnit`]. Both map to lowercase wire tokens through explicit static
//! tables, so renaming a variant never changes the wire format.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Result Type
// ============================================================================

/// Direction in which a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultType {
    /// Larger values are better.
    #[serde(rename = "higher_better")]
    HigherBetter,
    /// Smaller values are better.
    #[serde(rename = "lower_better")]
    LowerBetter,
    /// Values carry no ordering preference.
    #[serde(rename = "neutral")]
    Neutral,
}

/// Wire tokens for [`ResultType`].
const RESULT_TYPE_TOKENS: &[(ResultType, &str)] = &[
    (ResultType::HigherBetter, "higher_better"),
    (ResultType::LowerBetter, "lower_better"),
    (ResultType::Neutral, "neutral"),
];

impl ResultType {
    /// Parses a wire token into a result type.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the token is not a known result type.
    pub fn parse_report_string(token: &str) -> Result<Self, FormatError> {
        RESULT_TYPE_TOKENS
            .iter()
            .find(|(_, candidate)| *candidate == token)
            .map(|(value, _)| *value)
            .ok_or_else(|| FormatError::new("score_type", token))
    }

    /// Returns the wire token for this result type.
    #[must_use]
    pub fn as_report_str(self) -> &'static str {
        lookup_token(RESULT_TYPE_TOKENS, self)
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_report_str())
    }
}

// ============================================================================
// SECTION: Result Unit
// ============================================================================

/// Unit attached to a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultUnit {
    /// Dimensionless value.
    #[serde(rename = "none")]
    None,
    /// Milliseconds.
    #[serde(rename = "ms")]
    Ms,
    /// Frames per second.
    #[serde(rename = "fps")]
    Fps,
    /// Operations per second.
    #[serde(rename = "ops")]
    Ops,
    /// Kilobytes per second.
    #[serde(rename = "kbps")]
    Kbps,
    /// Megabytes per second.
    #[serde(rename = "mbps")]
    Mbps,
    /// Size in bytes.
    #[serde(rename = "byte")]
    Byte,
    /// Plain count.
    #[serde(rename = "count")]
    Count,
    /// Benchmark score.
    #[serde(rename = "score")]
    Score,
    /// Frequency in hertz.
    #[serde(rename = "hz")]
    Hz,
}

/// Wire tokens for [`ResultUnit`].
const RESULT_UNIT_TOKENS: &[(ResultUnit, &str)] = &[
    (ResultUnit::None, "none"),
    (ResultUnit::Ms, "ms"),
    (ResultUnit::Fps, "fps"),
    (ResultUnit::Ops, "ops"),
    (ResultUnit::Kbps, "kbps"),
    (ResultUnit::Mbps, "mbps"),
    (ResultUnit::Byte, "byte"),
    (ResultUnit::Count, "count"),
    (ResultUnit::Score, "score"),
    (ResultUnit::Hz, "hz"),
];

impl ResultUnit {
    /// Parses a wire token into a result unit.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the token is not a known unit.
    pub fn parse_report_string(token: &str) -> Result<Self, FormatError> {
        RESULT_UNIT_TOKENS
            .iter()
            .find(|(_, candidate)| *candidate == token)
            .map(|(value, _)| *value)
            .ok_or_else(|| FormatError::new("score_unit", token))
    }

    /// Returns the wire token for this unit.
    #[must_use]
    pub fn as_report_str(self) -> &'static str {
        lookup_token(RESULT_UNIT_TOKENS, self)
    }
}

impl fmt::Display for ResultUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_report_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Raised when a wire token does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} token: '{token}'")]
pub struct FormatError {
    /// Attribute the token was read from.
    pub kind: &'static str,
    /// Offending token.
    pub token: String,
}

impl FormatError {
    /// Creates a format error for the given attribute and token.
    #[must_use]
    pub fn new(kind: &'static str, token: &str) -> Self {
        Self {
            kind,
            token: token.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the token paired with `value`; tables cover every variant.
fn lookup_token<T: PartialEq + Copy>(table: &[(T, &'static str)], value: T) -> &'static str {
    table.iter().find(|(candidate, _)| *candidate == value).map_or("", |(_, token)| token)
}
