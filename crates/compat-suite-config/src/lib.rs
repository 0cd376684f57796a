// compat-suite-config/src/lib.rs
// ============================================================================
// Module: Compat Suite Config Library
// Description: Harness configuration and dynamic test configuration.
// Purpose: Single source of truth for compat-suite.toml and merged configs.
// Dependencies: compat-suite-core, quick-xml, serde, sha2, toml
// ============================================================================

//! ## Overview
//! `compat-suite-config` loads the harness configuration with strict,
//! fail-closed validation, and resolves per-module dynamic configuration by
//! merging a local XML document with an optional JSON override.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod dynamic;
pub mod merge;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use dynamic::DynamicConfig;
pub use dynamic::DynamicConfigError;
pub use dynamic::DynamicConfigParams;
pub use dynamic::ValueKind;
pub use merge::DynamicConfigHandler;
pub use merge::MergedConfig;
pub use merge::merge_dynamic_config;
