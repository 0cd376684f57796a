// compat-suite-core/src/results.rs
// ============================================================================
// Module: Result Aggregation
// Description: Host-side invocation, module, case, and test results.
// Purpose: Aggregate per-test outcomes and attached report logs.
// Dependencies: crate::{metrics, filter}, serde
// ============================================================================

//! ## Overview
//! Results form a tree: an [`InvocationResult`] holds [`ModuleResult`]s keyed
//! by module id, each holding [`CaseResult`]s keyed by class, each holding
//! [`TestResult`]s keyed by method. All levels iterate in key order and
//! serialize to JSON for the host aggregator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::filter::parse_module_id;
use crate::metrics::ReportLog;

// ============================================================================
// SECTION: Test Status
// ============================================================================

/// Outcome of one test method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Test passed.
    Pass,
    /// Test failed.
    Fail,
    /// Test has not run.
    NotExecuted,
}

// ============================================================================
// SECTION: Test Result
// ============================================================================

/// Result of one test method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    /// Method name.
    name: String,
    /// Current status.
    status: TestStatus,
    /// First line of the failure trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Full failure trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    stack_trace: Option<String>,
    /// Metrics reported by a passing test.
    #[serde(skip_serializing_if = "Option::is_none")]
    report_log: Option<ReportLog>,
}

impl TestResult {
    /// Creates a result that has not executed.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::NotExecuted,
            message: None,
            stack_trace: None,
            report_log: None,
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TestStatus {
        self.status
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the failure trace.
    #[must_use]
    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// Returns the attached report log.
    #[must_use]
    pub const fn report_log(&self) -> Option<&ReportLog> {
        self.report_log.as_ref()
    }

    /// Marks the test failed with `trace`; the message is its first line.
    pub fn failed(&mut self, trace: &str) {
        self.status = TestStatus::Fail;
        self.message = trace.lines().next().map(str::to_string);
        self.stack_trace = Some(trace.to_string());
    }

    /// Marks the test passed unless it already failed, attaching `report`.
    pub fn passed(&mut self, report: Option<ReportLog>) {
        if self.status == TestStatus::Fail {
            return;
        }
        self.status = TestStatus::Pass;
        if report.is_some() {
            self.report_log = report;
        }
    }

    /// Returns the result to the not-executed state.
    pub fn reset(&mut self) {
        let name = std::mem::take(&mut self.name);
        *self = Self::new(name);
    }
}

// ============================================================================
// SECTION: Case Result
// ============================================================================

/// Results of the methods of one test class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseResult {
    /// Class name.
    name: String,
    /// Results keyed by method.
    results: BTreeMap<String, TestResult>,
}

impl CaseResult {
    /// Creates an empty case result.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: BTreeMap::new(),
        }
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the result for `method`, creating it when absent.
    pub fn get_or_create_result(&mut self, method: &str) -> &mut TestResult {
        self.results.entry(method.to_string()).or_insert_with(|| TestResult::new(method))
    }

    /// Returns the result for `method`.
    #[must_use]
    pub fn get_result(&self, method: &str) -> Option<&TestResult> {
        self.results.get(method)
    }

    /// Returns all results ordered by method name.
    pub fn results(&self) -> impl Iterator<Item = &TestResult> {
        self.results.values()
    }

    /// Counts results with `status`.
    #[must_use]
    pub fn count_results(&self, status: TestStatus) -> usize {
        self.results.values().filter(|result| result.status == status).count()
    }
}

// ============================================================================
// SECTION: Module Result
// ============================================================================

/// Results of one test module on one ABI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleResult {
    /// Module id, `"<abi> <name>"`.
    id: String,
    /// Device the module ran on.
    #[serde(skip_serializing_if = "Option::is_none")]
    device_serial: Option<String>,
    /// Case results keyed by class.
    cases: BTreeMap<String, CaseResult>,
}

impl ModuleResult {
    /// Creates an empty module result.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            device_serial: None,
            cases: BTreeMap::new(),
        }
    }

    /// Returns the module id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the ABI part of the id.
    #[must_use]
    pub fn abi(&self) -> Option<&str> {
        parse_module_id(&self.id).map(|(abi, _)| abi)
    }

    /// Returns the name part of the id.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        parse_module_id(&self.id).map(|(_, name)| name)
    }

    /// Returns the device serial.
    #[must_use]
    pub fn device_serial(&self) -> Option<&str> {
        self.device_serial.as_deref()
    }

    /// Records the device serial.
    pub fn set_device_serial(&mut self, serial: impl Into<String>) {
        self.device_serial = Some(serial.into());
    }

    /// Returns the case result for `class_name`, creating it when absent.
    pub fn get_or_create_result(&mut self, class_name: &str) -> &mut CaseResult {
        self.cases.entry(class_name.to_string()).or_insert_with(|| CaseResult::new(class_name))
    }

    /// Returns the case result for `class_name`.
    #[must_use]
    pub fn get_result(&self, class_name: &str) -> Option<&CaseResult> {
        self.cases.get(class_name)
    }

    /// Returns all case results ordered by class name.
    pub fn results(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.values()
    }

    /// Counts test results with `status` across all cases.
    #[must_use]
    pub fn count_results(&self, status: TestStatus) -> usize {
        self.cases.values().map(|case| case.count_results(status)).sum()
    }
}

// ============================================================================
// SECTION: Invocation Result
// ============================================================================

/// Results of one harness invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvocationResult {
    /// Invocation start in milliseconds since the Unix epoch.
    start_time_ms: u128,
    /// Test plan that was run.
    #[serde(skip_serializing_if = "Option::is_none")]
    test_plan: Option<String>,
    /// Build properties of the device under test.
    build_info: BTreeMap<String, String>,
    /// Devices that took part.
    device_serials: BTreeSet<String>,
    /// Module results keyed by id.
    modules: BTreeMap<String, ModuleResult>,
}

impl InvocationResult {
    /// Creates an empty invocation result.
    #[must_use]
    pub fn new(start_time_ms: u128) -> Self {
        Self {
            start_time_ms,
            ..Self::default()
        }
    }

    /// Returns the start time.
    #[must_use]
    pub const fn start_time_ms(&self) -> u128 {
        self.start_time_ms
    }

    /// Returns the test plan.
    #[must_use]
    pub fn test_plan(&self) -> Option<&str> {
        self.test_plan.as_deref()
    }

    /// Records the test plan.
    pub fn set_test_plan(&mut self, plan: impl Into<String>) {
        self.test_plan = Some(plan.into());
    }

    /// Records one build property.
    pub fn add_build_info(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.build_info.insert(key.into(), value.into());
    }

    /// Returns the build properties.
    #[must_use]
    pub const fn build_info(&self) -> &BTreeMap<String, String> {
        &self.build_info
    }

    /// Records a participating device.
    pub fn add_device_serial(&mut self, serial: impl Into<String>) {
        self.device_serials.insert(serial.into());
    }

    /// Returns the participating devices.
    #[must_use]
    pub const fn device_serials(&self) -> &BTreeSet<String> {
        &self.device_serials
    }

    /// Returns the module result for `id`, creating it when absent.
    pub fn get_or_create_module(&mut self, id: &str) -> &mut ModuleResult {
        self.modules.entry(id.to_string()).or_insert_with(|| ModuleResult::new(id))
    }

    /// Returns the module result for `id`.
    #[must_use]
    pub fn get_module(&self, id: &str) -> Option<&ModuleResult> {
        self.modules.get(id)
    }

    /// Returns all module results ordered by id.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleResult> {
        self.modules.values()
    }

    /// Counts test results with `status` across all modules.
    #[must_use]
    pub fn count_results(&self, status: TestStatus) -> usize {
        self.modules.values().map(|module| module.count_results(status)).sum()
    }
}
