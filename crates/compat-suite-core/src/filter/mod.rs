// compat-suite-core/src/filter/mod.rs
// ============================================================================
// Module: Compat Suite Filtering
// Description: Test filters, suite selection, and option argument filtering.
// Purpose: Decide which tests run and which arguments carry over to a rerun.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Filtering happens at two levels. Module filters ([`TestFilter`]) select
//! modules by ABI and name, optionally narrowed to one test. Suite filters
//! ([`create_suite`]) select individual test methods from discovered classes
//! using include/exclude sets parsed by [`FilterArgs`]. [`get_valid_cli_args`]
//! keeps only the command-line arguments a given option source understands.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod args;
pub mod options;
pub mod suite;
pub mod test_filter;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use args::FilterArgs;
pub use options::OptionRegistry;
pub use options::OptionSource;
pub use options::OptionSpec;
pub use options::get_option_names;
pub use options::get_option_short_names;
pub use options::get_valid_cli_args;
pub use suite::TestCase;
pub use suite::TestClass;
pub use suite::TestSuite;
pub use suite::create_suite;
pub use test_filter::FilterError;
pub use test_filter::SUPPORTED_ABIS;
pub use test_filter::TestFilter;
pub use test_filter::create_module_id;
pub use test_filter::parse_module_id;
