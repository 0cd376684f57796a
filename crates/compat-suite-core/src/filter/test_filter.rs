// compat-suite-core/src/filter/test_filter.rs
// ============================================================================
// Module: Module Test Filter
// Description: `[!][abi] name [test]` filters and module identifiers.
// Purpose: Select modules by ABI and name, optionally narrowed to one test.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A filter has one to three space-separated parts. With two parts the first
//! is read as an ABI only when it names a supported ABI; otherwise the parts
//! are a module name and a test. A leading `!` marks an exclude filter.
//! [`TestFilter`]'s `Display` output parses back to the same filter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// ABIs recognized in filters and module ids.
pub const SUPPORTED_ABIS: &[&str] = &["armeabi-v7a", "arm64-v8a", "x86", "x86_64", "mips", "mips64"];

/// Prefix marking an exclude filter.
const EXCLUDE_PREFIX: char = '!';

// ============================================================================
// SECTION: Types
// ============================================================================

/// Module-level include or exclude filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestFilter {
    /// ABI the filter is restricted to.
    abi: Option<String>,
    /// Module name.
    name: String,
    /// Test within the module.
    test: Option<String>,
    /// False for `!`-prefixed filters.
    include: bool,
}

impl TestFilter {
    /// Builds an include filter.
    #[must_use]
    pub fn new(abi: Option<&str>, name: &str, test: Option<&str>) -> Self {
        Self {
            abi: abi.map(str::to_string),
            name: name.to_string(),
            test: test.map(str::to_string),
            include: true,
        }
    }

    /// Parses `[!][abi] name [test]`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Malformed`] for empty filters or more than three
    /// parts.
    pub fn parse(filter: &str) -> Result<Self, FilterError> {
        let malformed = |reason: &str| FilterError::Malformed {
            filter: filter.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = filter.trim();
        let (include, body) = trimmed
            .strip_prefix(EXCLUDE_PREFIX)
            .map_or((true, trimmed), |rest| (false, rest.trim_start()));
        let parts: Vec<&str> = body.split_whitespace().collect();
        let (abi, name, test) = match parts.as_slice() {
            [] => return Err(malformed("filter is empty")),
            [name] => (None, *name, None),
            [first, second] if is_supported_abi(first) => (Some(*first), *second, None),
            [name, test] => (None, *name, Some(*test)),
            [abi, name, test] => (Some(*abi), *name, Some(*test)),
            _ => return Err(malformed("expected at most three parts")),
        };
        let mut parsed = Self::new(abi, name, test);
        parsed.include = include;
        Ok(parsed)
    }

    /// Returns the ABI restriction.
    #[must_use]
    pub fn abi(&self) -> Option<&str> {
        self.abi.as_deref()
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the test restriction.
    #[must_use]
    pub fn test(&self) -> Option<&str> {
        self.test.as_deref()
    }

    /// Returns false for exclude filters.
    #[must_use]
    pub const fn is_include(&self) -> bool {
        self.include
    }

    /// Returns true when the filter covers the whole of module `abi name`.
    #[must_use]
    pub fn matches_module(&self, abi: &str, name: &str) -> bool {
        self.name == name && self.abi.as_deref().is_none_or(|filter_abi| filter_abi == abi)
    }
}

impl fmt::Display for TestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.include {
            write!(f, "{EXCLUDE_PREFIX}")?;
        }
        if let Some(abi) = &self.abi {
            write!(f, "{abi} ")?;
        }
        f.write_str(&self.name)?;
        if let Some(test) = &self.test {
            write!(f, " {test}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Filter parsing and loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A filter string could not be parsed.
    #[error("malformed filter '{filter}': {reason}")]
    Malformed {
        /// Offending filter.
        filter: String,
        /// What was wrong with it.
        reason: String,
    },
    /// A filter file could not be read.
    #[error("filter file {path}: {reason}")]
    FilterFile {
        /// File that failed to load.
        path: String,
        /// Underlying error.
        reason: String,
    },
}

// ============================================================================
// SECTION: Module Ids
// ============================================================================

/// Returns true when `abi` is a supported ABI name.
#[must_use]
pub fn is_supported_abi(abi: &str) -> bool {
    SUPPORTED_ABIS.contains(&abi)
}

/// Builds the module id `"<abi> <name>"`.
#[must_use]
pub fn create_module_id(abi: &str, name: &str) -> String {
    format!("{abi} {name}")
}

/// Splits a module id into `(abi, name)`.
#[must_use]
pub fn parse_module_id(id: &str) -> Option<(&str, &str)> {
    id.split_once(' ').filter(|(abi, name)| !abi.is_empty() && !name.is_empty())
}
