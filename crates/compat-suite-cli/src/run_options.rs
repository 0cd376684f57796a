// compat-suite-cli/src/run_options.rs
// ============================================================================
// Module: Run Options
// Description: Options accepted by a suite run and their clap introspection.
// Purpose: Decide which recorded arguments carry over into a retry.
// Dependencies: clap, compat-suite-core
// ============================================================================

//! ## Overview
//! [`RunOptions`] declares the options a suite run accepts. [`ClapOptions`]
//! adapts any [`clap::Command`] to [`OptionSource`] so the option filter in
//! `compat-suite-core` can keep only the arguments a run recognizes.
//! Positional arguments are not options and are never reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use clap::Command;
use clap::CommandFactory;
use clap::Parser;
use compat_suite_core::OptionSource;
use compat_suite_core::OptionSpec;

// ============================================================================
// SECTION: Run Options
// ============================================================================

/// Options accepted by a suite run.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "run", disable_help_flag = true, disable_version_flag = true)]
pub struct RunOptions {
    /// Test plan to execute.
    #[arg(value_name = "PLAN")]
    pub plan: Option<String>,
    /// Module to run.
    #[arg(long, short = 'm', value_name = "MODULE")]
    pub module: Option<String>,
    /// Test to run within the module.
    #[arg(long, short = 't', value_name = "TEST")]
    pub test: Option<String>,
    /// ABI to run against.
    #[arg(long, short = 'a', value_name = "ABI")]
    pub abi: Option<String>,
    /// Filters selecting tests to run.
    #[arg(long = "include-filter", value_name = "FILTER")]
    pub include_filters: Vec<String>,
    /// Filters selecting tests to skip.
    #[arg(long = "exclude-filter", value_name = "FILTER")]
    pub exclude_filters: Vec<String>,
    /// File of filters selecting tests to run.
    #[arg(long = "include-filter-file", value_name = "PATH")]
    pub include_filter_file: Option<PathBuf>,
    /// File of filters selecting tests to skip.
    #[arg(long = "exclude-filter-file", value_name = "PATH")]
    pub exclude_filter_file: Option<PathBuf>,
    /// Device serial to run on.
    #[arg(long, short = 's', value_name = "SERIAL")]
    pub serial: Option<String>,
    /// Number of shards to split the run into.
    #[arg(long = "shard-count", value_name = "COUNT")]
    pub shard_count: Option<u32>,
    /// Session whose failures are retried.
    #[arg(long, short = 'r', value_name = "SESSION")]
    pub retry: Option<u32>,
}

impl RunOptions {
    /// Returns the clap command describing the run options.
    #[must_use]
    pub fn declaration() -> Command {
        Self::command()
    }
}

// ============================================================================
// SECTION: Clap Bridge
// ============================================================================

/// [`OptionSource`] view of a clap command's named arguments.
#[derive(Debug, Clone, Copy)]
pub struct ClapOptions<'a>(pub &'a Command);

impl OptionSource for ClapOptions<'_> {
    fn option_specs(&self) -> Vec<OptionSpec> {
        self.0
            .get_arguments()
            .filter(|arg| !arg.is_positional())
            .map(|arg| OptionSpec {
                name: arg.get_long().map_or_else(|| arg.get_id().to_string(), str::to_string),
                short_name: arg.get_short(),
            })
            .collect()
    }
}
