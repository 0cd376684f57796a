// compat-suite-core/src/filter/suite.rs
// ============================================================================
// Module: Suite Filter
// Description: Include/exclude selection of test methods.
// Purpose: Build the ordered list of test cases a run executes.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A filter names a package, a class, or a single method as `Class#method`.
//! An empty include set selects every discovered method. Excludes always win
//! over includes. Discovery order of classes and methods is preserved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between class and method in a filter.
const METHOD_SEPARATOR: char = '#';

// ============================================================================
// SECTION: Types
// ============================================================================

/// Discovered test class and its test methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestClass {
    /// Fully qualified class name.
    pub name: String,
    /// Test method names in discovery order.
    pub methods: Vec<String>,
}

impl TestClass {
    /// Creates a test class description.
    #[must_use]
    pub fn new(name: impl Into<String>, methods: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }
}

/// One selected test method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Fully qualified class name.
    pub class_name: String,
    /// Method name.
    pub method: String,
}

impl TestCase {
    /// Returns the `Class#method` identifier.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}{METHOD_SEPARATOR}{}", self.class_name, self.method)
    }
}

/// Ordered selection of test cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSuite {
    /// Selected cases in discovery order.
    cases: Vec<TestCase>,
}

impl TestSuite {
    /// Returns the selected cases.
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Returns the number of selected cases.
    #[must_use]
    pub fn count_test_cases(&self) -> usize {
        self.cases.len()
    }

    /// Returns true when nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Selects the methods of `classes` admitted by `includes` and not removed by
/// `excludes`.
#[must_use]
pub fn create_suite(
    classes: &[TestClass],
    includes: &BTreeSet<String>,
    excludes: &BTreeSet<String>,
) -> TestSuite {
    let cases = classes
        .iter()
        .flat_map(|class| {
            class.methods.iter().map(|method| TestCase {
                class_name: class.name.clone(),
                method: method.clone(),
            })
        })
        .filter(|case| {
            let included =
                includes.is_empty() || includes.iter().any(|filter| filter_matches(filter, case));
            included && !excludes.iter().any(|filter| filter_matches(filter, case))
        })
        .collect();
    TestSuite {
        cases,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when `filter` names the case, its class, or its package.
fn filter_matches(filter: &str, case: &TestCase) -> bool {
    if let Some((class_name, method)) = filter.split_once(METHOD_SEPARATOR) {
        return class_name == case.class_name && method == case.method;
    }
    filter == case.class_name
        || case
            .class_name
            .strip_prefix(filter)
            .is_some_and(|rest| rest.starts_with('.'))
}
