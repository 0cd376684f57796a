// compat-suite-core/src/metrics/stat.rs
// ============================================================================
// Module: Statistics Engine
// Description: Rate, summary statistics, and workload timing helpers.
// Purpose: Derive report values from raw measured samples.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Pure functions over `f64` samples. Rates never divide by zero: a zero
//! elapsed time is replaced by [`MIN_ELAPSED_MS`]. Summary statistics reject
//! empty and non-finite input instead of producing `NaN`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Elapsed time substituted for a zero-length measurement, in milliseconds.
pub const MIN_ELAPSED_MS: f64 = 0.001;

/// Milliseconds per second.
const MS_PER_SEC: f64 = 1000.0;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Summary statistics over a sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatResult {
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Arithmetic mean.
    pub average: f64,
    /// Population standard deviation.
    pub stddev: f64,
    /// Number of samples the statistics were computed over.
    pub data_count: usize,
}

/// Statistics after dropping outliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierRejection {
    /// Statistics over the retained samples.
    pub stat: StatResult,
    /// Number of samples dropped as outliers.
    pub rejected: usize,
}

/// Workload timed by [`measure`].
pub trait MeasureRun {
    /// Error raised by the workload.
    type Error;

    /// Untimed setup run before iteration `index`.
    ///
    /// # Errors
    ///
    /// Returns the workload error to abort the measurement.
    fn prepare(&mut self, _index: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Timed body for iteration `index`.
    ///
    /// # Errors
    ///
    /// Returns the workload error to abort the measurement.
    fn run(&mut self, index: usize) -> Result<(), Self::Error>;
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Statistics input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    /// No samples were provided.
    #[error("statistics require at least one sample")]
    Empty,
    /// A sample was `NaN` or infinite.
    #[error("sample {index} is not a finite number")]
    NonFiniteSample {
        /// Position of the offending sample.
        index: usize,
    },
    /// Outlier threshold was not a positive finite number.
    #[error("outlier threshold must be positive and finite")]
    InvalidThreshold,
    /// Outlier rejection left no samples.
    #[error("outlier threshold {threshold} rejected all {count} samples")]
    AllRejected {
        /// Threshold in standard deviations.
        threshold: String,
        /// Number of samples supplied.
        count: usize,
    },
}

// ============================================================================
// SECTION: Rates
// ============================================================================

/// Returns `change` per second over `time_ms` milliseconds.
///
/// A zero `time_ms` is replaced by [`MIN_ELAPSED_MS`]. Results that overflow
/// are clamped to `±f64::MAX`; `NaN` input yields `NaN`.
#[must_use]
pub fn calc_rate_per_sec(change: f64, time_ms: f64) -> f64 {
    let elapsed = if time_ms == 0.0 { MIN_ELAPSED_MS } else { time_ms };
    let rate = change / (elapsed / MS_PER_SEC);
    if rate.is_infinite() { f64::MAX.copysign(rate) } else { rate }
}

/// Applies [`calc_rate_per_sec`] to each elapsed time.
#[must_use]
pub fn calc_rate_per_sec_array(change: f64, times_ms: &[f64]) -> Vec<f64> {
    times_ms.iter().map(|time_ms| calc_rate_per_sec(change, *time_ms)).collect()
}

// ============================================================================
// SECTION: Summary Statistics
// ============================================================================

/// Computes min, max, average, and population standard deviation.
///
/// # Errors
///
/// Returns [`StatError::Empty`] for an empty slice and
/// [`StatError::NonFiniteSample`] when any sample is `NaN` or infinite.
pub fn get_stat(values: &[f64]) -> Result<StatResult, StatError> {
    if values.is_empty() {
        return Err(StatError::Empty);
    }
    if let Some(index) = values.iter().position(|value| !value.is_finite()) {
        return Err(StatError::NonFiniteSample {
            index,
        });
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for value in values {
        min = min.min(*value);
        max = max.max(*value);
        sum += value;
    }
    let count = sample_count(values.len());
    let average = sum / count;
    let variance =
        values.iter().map(|value| (value - average) * (value - average)).sum::<f64>() / count;
    Ok(StatResult {
        min,
        max,
        average,
        stddev: variance.sqrt(),
        data_count: values.len(),
    })
}

/// Drops samples more than `threshold` standard deviations from the mean and
/// recomputes the statistics over the rest.
///
/// # Errors
///
/// Returns [`StatError`] for invalid samples or a non-positive threshold,
/// and [`StatError::AllRejected`] when a threshold below one standard
/// deviation leaves no sample within range.
pub fn get_stat_with_outlier_rejection(
    values: &[f64],
    threshold: f64,
) -> Result<OutlierRejection, StatError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(StatError::InvalidThreshold);
    }
    let initial = get_stat(values)?;
    let limit = initial.stddev * threshold;
    let retained: Vec<f64> = values
        .iter()
        .copied()
        .filter(|value| (value - initial.average).abs() <= limit)
        .collect();
    if retained.is_empty() {
        return Err(StatError::AllRejected {
            threshold: threshold.to_string(),
            count: values.len(),
        });
    }
    let stat = get_stat(&retained)?;
    Ok(OutlierRejection {
        stat,
        rejected: values.len() - retained.len(),
    })
}

// ============================================================================
// SECTION: Timing
// ============================================================================

/// Runs `workload` `repeat` times and returns each timed run in milliseconds.
///
/// # Errors
///
/// Returns the first error raised by the workload.
pub fn measure<W: MeasureRun>(repeat: usize, workload: &mut W) -> Result<Vec<f64>, W::Error> {
    let mut samples = Vec::with_capacity(repeat);
    for index in 0 .. repeat {
        workload.prepare(index)?;
        let start = Instant::now();
        workload.run(index)?;
        samples.push(start.elapsed().as_secs_f64() * MS_PER_SEC);
    }
    Ok(samples)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a sample count to `f64` for averaging.
#[allow(clippy::cast_precision_loss, reason = "Sample counts are far below 2^52.")]
const fn sample_count(len: usize) -> f64 {
    len as f64
}
