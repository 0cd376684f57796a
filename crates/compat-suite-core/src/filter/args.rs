// compat-suite-core/src/filter/args.rs
// ============================================================================
// Module: Filter Arguments
// Description: Include/exclude filter arguments and filter files.
// Purpose: Collect suite filters passed to a device-side test runner.
// Dependencies: crate::filter::test_filter
// ============================================================================

//! ## Overview
//! Recognized arguments:
//! - `--abi=<abi>`
//! - `--include-filter=<a>,<b>` and `--exclude-filter=<a>,<b>`
//! - `--include-filter-file=<path>` and `--exclude-filter-file=<path>`, one
//!   filter per line with blank lines skipped
//!
//! Anything else is kept, in order, in [`FilterArgs::remaining`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::filter::suite::TestClass;
use crate::filter::suite::TestSuite;
use crate::filter::suite::create_suite;
use crate::filter::test_filter::FilterError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// ABI argument prefix.
const ABI_ARG: &str = "--abi=";
/// Inline include filter prefix.
const INCLUDE_ARG: &str = "--include-filter=";
/// Inline exclude filter prefix.
const EXCLUDE_ARG: &str = "--exclude-filter=";
/// Include filter file prefix.
const INCLUDE_FILE_ARG: &str = "--include-filter-file=";
/// Exclude filter file prefix.
const EXCLUDE_FILE_ARG: &str = "--exclude-filter-file=";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Parsed filter arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// ABI the run targets.
    pub abi: Option<String>,
    /// Include filters.
    pub includes: BTreeSet<String>,
    /// Exclude filters.
    pub excludes: BTreeSet<String>,
    /// Arguments that are not filter arguments.
    pub remaining: Vec<String>,
}

impl FilterArgs {
    /// Parses runner arguments, reading any referenced filter files.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::FilterFile`] when a filter file cannot be read.
    pub fn parse<I, S>(args: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if let Some(abi) = arg.strip_prefix(ABI_ARG) {
                parsed.abi = Some(abi.to_string());
            } else if let Some(list) = arg.strip_prefix(INCLUDE_ARG) {
                add_filter_list(&mut parsed.includes, list);
            } else if let Some(list) = arg.strip_prefix(EXCLUDE_ARG) {
                add_filter_list(&mut parsed.excludes, list);
            } else if let Some(path) = arg.strip_prefix(INCLUDE_FILE_ARG) {
                load_filter_file(&mut parsed.includes, Path::new(path))?;
            } else if let Some(path) = arg.strip_prefix(EXCLUDE_FILE_ARG) {
                load_filter_file(&mut parsed.excludes, Path::new(path))?;
            } else {
                parsed.remaining.push(arg.to_string());
            }
        }
        Ok(parsed)
    }

    /// Selects the methods of `classes` admitted by these filters.
    #[must_use]
    pub fn select(&self, classes: &[TestClass]) -> TestSuite {
        create_suite(classes, &self.includes, &self.excludes)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Adds each non-empty comma-separated filter.
fn add_filter_list(target: &mut BTreeSet<String>, list: &str) {
    target.extend(
        list.split(',').map(str::trim).filter(|filter| !filter.is_empty()).map(str::to_string),
    );
}

/// Adds each non-blank line of a filter file.
///
/// # Errors
///
/// Returns [`FilterError::FilterFile`] when the file cannot be read.
pub fn load_filter_file(target: &mut BTreeSet<String>, path: &Path) -> Result<(), FilterError> {
    let content = fs::read_to_string(path).map_err(|err| FilterError::FilterFile {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    target.extend(
        content.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string),
    );
    Ok(())
}
