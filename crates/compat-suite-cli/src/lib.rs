// compat-suite-cli/src/lib.rs
// ============================================================================
// Module: Compat Suite CLI Library
// Description: Shared helpers for the compat-suite command-line interface.
// Purpose: Expose the run option declarations to the binary and tests.
// Dependencies: clap, compat-suite-core
// ============================================================================

//! ## Overview
//! This library houses the run option model used when a suite invocation is
//! retried. The binary entry point (`src/main.rs`) filters recorded command
//! lines against these declarations through the clap bridge in
//! [`run_options`].

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Run option declarations and the clap-backed option source.
pub mod run_options;
