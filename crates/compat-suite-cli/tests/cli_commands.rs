// compat-suite-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the compat-suite binary.
// Purpose: Ensure each subcommand reports results on stdout and fails closed.
// Dependencies: compat-suite-cli binary
// ============================================================================

//! ## Overview
//! Runs the CLI binary for config validation, dynamic config merging, report
//! inspection, and suite selection, checking stdout, stderr, and exit codes.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde_json::Value;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn compat_suite_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_compat-suite"))
}

fn temp_root(label: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("compat-suite-cli-{label}-{nanos}"));
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_dir_all(path);
}

/// Runs the binary in `root` with no inherited config override.
fn run_cli(root: &Path, args: &[&str]) -> Output {
    Command::new(compat_suite_bin())
        .current_dir(root)
        .env_remove("COMPAT_SUITE_CONFIG")
        .args(args)
        .output()
        .expect("run compat-suite")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

const LOCAL_CONFIG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DynamicConfig>
    <Config key="timeout">30</Config>
    <ConfigList key="devices">
        <Item>phone</Item>
        <Item>tablet</Item>
    </ConfigList>
</DynamicConfig>
"#;

const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<ReportLog name="FrameRate" stream="graphics">
  <Summary>
    <Metric source="android.graphics.cts.FrameTest#testFps" message="average fps" score_type="higher_better" score_unit="fps">
      <Value>60.0</Value>
    </Metric>
  </Summary>
  <Detail>
    <Metric source="android.graphics.cts.FrameTest#testFps" message="frame times" score_type="lower_better" score_unit="ms">
      <Value>10.0</Value>
      <Value>20.0</Value>
      <Value>30.0</Value>
    </Metric>
  </Detail>
</ReportLog>
"#;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Verifies validation succeeds when no config file exists.
#[test]
fn cli_config_validate_defaults_without_file() {
    let root = temp_root("config-default");
    let output = run_cli(&root, &["config", "validate"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("config ok"), "unexpected stdout: {stdout}");
    cleanup(&root);
}

/// Verifies validation fails closed on an invalid config file.
#[test]
fn cli_config_validate_rejects_invalid_config() {
    let root = temp_root("config-invalid");
    let config_path = root.join("compat-suite.toml");
    fs::write(&config_path, "[logging]\nsink = \"file\"\n").expect("write config");
    let output = run_cli(&root, &["config", "validate", "--config", config_path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("logging.path is required"), "unexpected stderr: {stderr}");
    cleanup(&root);
}

/// Verifies the file sink records command events.
#[test]
fn cli_records_events_to_file_sink() {
    let root = temp_root("config-events");
    fs::write(
        root.join("compat-suite.toml"),
        "[logging]\nsink = \"file\"\npath = \"events.log\"\n",
    )
    .expect("write config");
    let output = run_cli(&root, &["config", "validate"]);
    assert!(output.status.success());
    let log = fs::read_to_string(root.join("events.log")).expect("read events");
    let event: Value = serde_json::from_str(log.lines().next().expect("event line")).unwrap();
    assert_eq!(event["event"], "command_completed");
    assert_eq!(event["component"], "cli");
    assert_eq!(event["subject"], "config validate");
    cleanup(&root);
}

// ============================================================================
// SECTION: Dynamic Config
// ============================================================================

/// Verifies merge writes the merged file and prints its digest.
#[test]
fn cli_dynamic_config_merge_writes_output() {
    let root = temp_root("dynamic-merge");
    fs::write(root.join("local.dynamic"), LOCAL_CONFIG).expect("write local");
    fs::write(
        root.join("override.json"),
        r#"{"config": [{"key": "timeout", "value": "60"}]}"#,
    )
    .expect("write override");
    let output = run_cli(
        &root,
        &[
            "dynamic-config",
            "merge",
            "--local",
            "local.dynamic",
            "--module",
            "CtsSample",
            "--override",
            "override.json",
            "--output-dir",
            "merged",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let merged = stdout_json(&output);
    assert_eq!(merged["params"]["config"]["timeout"], "60");
    assert_eq!(merged["params"]["config_lists"]["devices"][1], "tablet");
    assert_eq!(merged["digest"].as_str().unwrap().len(), 64);
    assert!(root.join("merged").join("CtsSample.dynamic").is_file());

    let shown = run_cli(&root, &["dynamic-config", "show", "--module", "CtsSample", "--dir", "merged"]);
    assert!(shown.status.success());
    assert_eq!(stdout_json(&shown)["config"]["timeout"], "60");
    cleanup(&root);
}

/// Verifies show fails when no folder is configured.
#[test]
fn cli_dynamic_config_show_requires_folder() {
    let root = temp_root("dynamic-show");
    let output = run_cli(&root, &["dynamic-config", "show", "--module", "CtsSample"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dynamic config folder not set"), "unexpected stderr: {stderr}");
    cleanup(&root);
}

/// Verifies show reads the folder from the config file.
#[test]
fn cli_dynamic_config_show_uses_configured_folder() {
    let root = temp_root("dynamic-configured");
    fs::create_dir_all(root.join("dynamic")).expect("create dir");
    fs::write(root.join("dynamic").join("CtsSample.dynamic"), LOCAL_CONFIG).expect("write");
    fs::write(root.join("compat-suite.toml"), "[paths]\ndynamic_config_dir = \"dynamic\"\n")
        .expect("write config");
    let output = run_cli(&root, &["dynamic-config", "show", "--module", "CtsSample"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["config"]["timeout"], "30");
    cleanup(&root);
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Verifies inspect prints metrics with statistics.
#[test]
fn cli_report_inspect_prints_statistics() {
    let root = temp_root("report-inspect");
    fs::write(root.join("report.xml"), REPORT).expect("write report");
    let output = run_cli(&root, &["report", "inspect", "report.xml"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let view = stdout_json(&output);
    assert_eq!(view["name"], "FrameRate");
    assert_eq!(view["stream"], "graphics");
    assert_eq!(view["summary"]["message"], "average fps");
    assert_eq!(view["summary"]["result_type"], "higher_better");
    let detail = &view["details"][0];
    assert_eq!(detail["unit"], "ms");
    assert_eq!(detail["stat"]["average"].as_f64().unwrap(), 20.0);
    assert_eq!(detail["stat"]["min"].as_f64().unwrap(), 10.0);
    assert_eq!(detail["stat"]["data_count"], 3);
    cleanup(&root);
}

/// Verifies inspect fails closed on a report without a summary.
#[test]
fn cli_report_inspect_rejects_missing_summary() {
    let root = temp_root("report-invalid");
    fs::write(
        root.join("report.xml"),
        r#"<ReportLog name="n" stream="s"><Detail/></ReportLog>"#,
    )
    .expect("write report");
    let output = run_cli(&root, &["report", "inspect", "report.xml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid report"), "unexpected stderr: {stderr}");
    cleanup(&root);
}

/// Verifies inspect enforces the configured input limit.
#[test]
fn cli_report_inspect_enforces_input_limit() {
    let root = temp_root("report-limit");
    fs::write(root.join("report.xml"), REPORT).expect("write report");
    fs::write(root.join("compat-suite.toml"), "[limits]\nmax_input_bytes = 16\n")
        .expect("write config");
    let output = run_cli(&root, &["report", "inspect", "report.xml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("over the 16 byte limit"), "unexpected stderr: {stderr}");
    cleanup(&root);
}

/// Verifies streams reads the report file from the configured folder.
#[test]
fn cli_report_streams_uses_configured_folder() {
    let root = temp_root("report-streams");
    fs::create_dir_all(root.join("reports")).expect("create dir");
    fs::write(
        root.join("reports").join("FrameRate.reportlog.json"),
        r#"{"graphics":{"fps":[60,58]},"memory":{"peak_kb":512}}"#,
    )
    .expect("write report");
    fs::write(root.join("compat-suite.toml"), "[paths]\nreport_log_dir = \"reports\"\n")
        .expect("write config");
    let output = run_cli(&root, &["report", "streams", "--name", "FrameRate"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let streams = stdout_json(&output);
    assert_eq!(streams["graphics"]["fps"][1], 58);
    assert_eq!(streams["memory"]["peak_kb"], 512);
    cleanup(&root);
}

/// Verifies streams fails when no folder is configured.
#[test]
fn cli_report_streams_requires_folder() {
    let root = temp_root("report-streams-unset");
    let output = run_cli(&root, &["report", "streams", "--name", "FrameRate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("report log folder not set"), "unexpected stderr: {stderr}");
    cleanup(&root);
}

/// Verifies streams reports a missing report file.
#[test]
fn cli_report_streams_rejects_missing_report() {
    let root = temp_root("report-streams-missing");
    fs::create_dir_all(root.join("reports")).expect("create dir");
    let output = run_cli(&root, &["report", "streams", "--name", "Absent", "--dir", "reports"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("info store file not found"), "unexpected stderr: {stderr}");
    cleanup(&root);
}

// ============================================================================
// SECTION: Suites
// ============================================================================

/// Verifies select applies include and exclude filters.
#[test]
fn cli_suite_select_applies_filters() {
    let root = temp_root("suite-select");
    fs::write(
        root.join("classes.txt"),
        "android.app.cts.A#one\nandroid.app.cts.A#two\nandroid.app.cts.B#three\nandroid.view.C#four\n",
    )
    .expect("write classes");
    let output = run_cli(
        &root,
        &[
            "suite",
            "select",
            "--classes",
            "classes.txt",
            "--",
            "--include-filter=android.app.cts",
            "--exclude-filter=android.app.cts.A#two",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let ids: Vec<&str> = stdout.lines().collect();
    assert_eq!(ids, ["android.app.cts.A#one", "android.app.cts.B#three"]);
    cleanup(&root);
}

/// Verifies select rejects arguments that are not filters.
#[test]
fn cli_suite_select_rejects_unknown_arguments() {
    let root = temp_root("suite-unknown");
    fs::write(root.join("classes.txt"), "a.A#one\n").expect("write classes");
    let output =
        run_cli(&root, &["suite", "select", "--classes", "classes.txt", "--", "--shards=2"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported filter argument '--shards=2'"), "unexpected stderr: {stderr}");
    cleanup(&root);
}

/// Verifies retry-args keeps only declared run options.
#[test]
fn cli_suite_retry_args_filters_command_line() {
    let root = temp_root("suite-retry");
    let output = run_cli(
        &root,
        &[
            "suite",
            "retry-args",
            "--command-line",
            "cts -m CtsSample --bogus 1 --shard-count 3 --disable-reboot",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "-m CtsSample --shard-count 3");
    cleanup(&root);
}
