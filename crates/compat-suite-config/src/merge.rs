// compat-suite-config/src/merge.rs
// ============================================================================
// Module: Dynamic Config Merge
// Description: Applies a JSON override to a local dynamic config file.
// Purpose: Produce the effective per-module config a test run uses.
// Dependencies: compat-suite-core, serde, serde_json, sha2, tempfile
// ============================================================================

//! ## Overview
//! The override document is JSON:
//!
//! ```json
//! {"config": [{"key": "k", "value": "v"}],
//!  "configList": [{"key": "l", "value": ["a", "b"]}]}
//! ```
//!
//! Scalar overrides replace scalars and list overrides replace whole lists.
//! Overriding a key with a different kind than the local file declares is a
//! [`DynamicConfigError::TypeMismatch`]. The merged document is written to
//! `<output_dir>/<module>.dynamic` by renaming a temporary file into place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use compat_suite_core::EventOutcome;
use compat_suite_core::EventSink;
use compat_suite_core::HarnessEvent;
use compat_suite_core::NoopEventSink;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use tempfile::NamedTempFile;

use crate::dynamic::DynamicConfigError;
use crate::dynamic::DynamicConfigParams;
use crate::dynamic::gen_params_from_file;
use crate::dynamic::module_file_name;
use crate::dynamic::params_to_xml;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Component name used in emitted events.
const COMPONENT: &str = "dynamic_config";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Override document.
#[derive(Debug, Deserialize)]
struct OverrideDocument {
    /// Scalar overrides.
    #[serde(default)]
    config: Vec<ScalarOverride>,
    /// List overrides.
    #[serde(default, rename = "configList")]
    config_list: Vec<ListOverride>,
}

/// One scalar override.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScalarOverride {
    /// Key to set.
    key: String,
    /// Replacement value.
    value: String,
}

/// One list override.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListOverride {
    /// Key to replace.
    key: String,
    /// Replacement items.
    value: Vec<String>,
}

/// Result of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedConfig {
    /// Written merged file.
    pub path: PathBuf,
    /// Effective entries.
    pub params: DynamicConfigParams,
    /// Lowercase hex SHA-256 of the written file.
    pub digest: String,
}

/// Merges dynamic configs into a fixed output folder, logging each merge.
pub struct DynamicConfigHandler {
    /// Folder receiving merged files.
    output_dir: PathBuf,
    /// Destination for operational events.
    events: Arc<dyn EventSink>,
}

impl DynamicConfigHandler {
    /// Creates a handler writing into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            events: Arc::new(NoopEventSink),
        }
    }

    /// Routes operational events to `events`.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the output folder.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Merges `local_file` with `override_json` for `module`.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicConfigError`] when any input is invalid or the merged
    /// file cannot be written.
    pub fn merge(
        &self,
        local_file: &Path,
        override_json: Option<&str>,
        module: &str,
    ) -> Result<MergedConfig, DynamicConfigError> {
        let result = merge_dynamic_config(local_file, override_json, module, &self.output_dir);
        let event = match &result {
            Ok(merged) => HarnessEvent::new("dynamic_config_merged", COMPONENT, EventOutcome::Success)
                .with_subject(module)
                .with_detail(merged.path.display().to_string()),
            Err(err) => HarnessEvent::new("dynamic_config_merge_failed", COMPONENT, EventOutcome::Error)
                .with_subject(module)
                .with_detail(err.to_string()),
        };
        self.events.record(&event);
        result
    }
}

// ============================================================================
// SECTION: Merge
// ============================================================================

/// Merges a local config file with an optional JSON override and writes the
/// result to `<output_dir>/<module>.dynamic`.
///
/// # Errors
///
/// Returns [`DynamicConfigError`] when any input is invalid or the merged
/// file cannot be written.
pub fn merge_dynamic_config(
    local_file: &Path,
    override_json: Option<&str>,
    module: &str,
    output_dir: &Path,
) -> Result<MergedConfig, DynamicConfigError> {
    let file_name = module_file_name(module)?;
    let mut params = gen_params_from_file(local_file)?;
    let overrides = params_from_override_json(override_json)?;
    apply_overrides(&mut params, overrides)?;
    let xml = params_to_xml(&params)?;
    let path = output_dir.join(file_name);
    fs::create_dir_all(output_dir).map_err(|err| DynamicConfigError::Io(err.to_string()))?;
    write_atomic(&path, xml.as_bytes())?;
    Ok(MergedConfig {
        path,
        params,
        digest: hex_encode(&Sha256::digest(xml.as_bytes())),
    })
}

/// Parses an override document; `None` or blank input means no overrides.
///
/// # Errors
///
/// Returns [`DynamicConfigError::Parse`] for invalid JSON or empty keys and
/// [`DynamicConfigError::TypeMismatch`] when a key is both scalar and list.
pub fn params_from_override_json(
    override_json: Option<&str>,
) -> Result<DynamicConfigParams, DynamicConfigError> {
    let mut params = DynamicConfigParams::default();
    let Some(json) = override_json.filter(|json| !json.trim().is_empty()) else {
        return Ok(params);
    };
    let document: OverrideDocument = serde_json::from_str(json)
        .map_err(|err| DynamicConfigError::Parse(format!("override json: {err}")))?;
    for entry in document.config {
        require_key(&entry.key)?;
        params.set_config(&entry.key, entry.value)?;
    }
    for entry in document.config_list {
        require_key(&entry.key)?;
        params.set_config_list(&entry.key, entry.value)?;
    }
    Ok(params)
}

/// Applies overrides on top of `params`, replacing values wholesale.
///
/// # Errors
///
/// Returns [`DynamicConfigError::TypeMismatch`] when an override changes the
/// kind of a key.
pub fn apply_overrides(
    params: &mut DynamicConfigParams,
    overrides: DynamicConfigParams,
) -> Result<(), DynamicConfigError> {
    for (key, value) in overrides.config {
        params.set_config(&key, value)?;
    }
    for (key, values) in overrides.config_lists {
        params.set_config_list(&key, values)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects empty override keys.
fn require_key(key: &str) -> Result<(), DynamicConfigError> {
    if key.is_empty() {
        return Err(DynamicConfigError::Parse("override entry has an empty key".to_string()));
    }
    Ok(())
}

/// Writes `bytes` to a sibling temporary file and renames it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DynamicConfigError> {
    let io_error = |err: std::io::Error| DynamicConfigError::Io(err.to_string());
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
    temp.write_all(bytes).map_err(io_error)?;
    temp.as_file().sync_all().map_err(io_error)?;
    temp.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

/// Encodes bytes as lowercase hex.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
