// compat-suite-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config and dynamic config tests.
// Purpose: Reduce duplication across integration tests for compat-suite-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Local dynamic config used across merge tests.
pub const LOCAL_CONFIG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DynamicConfig>
    <Config key="test-config-1">test config 1</Config>
    <Config key="test-config-2">testconfig2</Config>
    <ConfigList key="test-config-list">
        <Item>test config list item 1</Item>
        <Item>test config list item 2</Item>
    </ConfigList>
    <ConfigList key="test-config-list-2">
        <Item>testconfiglistitem1</Item>
        <Item>testconfiglistitem2</Item>
    </ConfigList>
</DynamicConfig>
"#;

/// Override document replacing one scalar and one list.
pub const OVERRIDE_JSON: &str = r#"{
  "config": [
    {"key": "test-config-1", "value": "override-val-1"},
    {"key": "new-config", "value": "new-val"}
  ],
  "configList": [
    {"key": "test-config-list", "value": ["override-config-list-val-1", "override-config-list-val-2"]}
  ]
}"#;

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf, String> {
    let path = dir.join(name);
    fs::write(&path, content).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Creates a scratch directory removed on drop.
pub fn scratch_dir() -> Result<tempfile::TempDir, String> {
    tempfile::tempdir().map_err(|err| err.to_string())
}
