// compat-suite-cli/src/main.rs
// ============================================================================
// Module: Compat Suite CLI Entry Point
// Description: Command dispatcher for compatibility harness utilities.
// Purpose: Expose config, dynamic config, report, and suite tooling offline.
// Dependencies: clap, compat-suite-config, compat-suite-core, serde, thiserror.
// ============================================================================

//! ## Overview
//! The compat-suite CLI validates harness configuration, merges and shows
//! dynamic configs, inspects serialized report logs and stored device info
//! streams, selects test cases
//! through suite filters, and computes the arguments a retry should reuse.
//! Inputs are untrusted: every file read is bounded by
//! `limits.max_input_bytes` and failures exit non-zero with a message on
//! stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use compat_suite_cli::run_options::ClapOptions;
use compat_suite_cli::run_options::RunOptions;
use compat_suite_config::DynamicConfig;
use compat_suite_config::DynamicConfigHandler;
use compat_suite_config::HarnessConfig;
use compat_suite_core::DeviceInfoStore;
use compat_suite_core::EventOutcome;
use compat_suite_core::EventSink;
use compat_suite_core::FilterArgs;
use compat_suite_core::HarnessEvent;
use compat_suite_core::MetricEntry;
use compat_suite_core::ReportLog;
use compat_suite_core::StatResult;
use compat_suite_core::TestClass;
use compat_suite_core::get_valid_cli_args;
use compat_suite_core::metrics::stat::get_stat;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Component name used in emitted events.
const COMPONENT: &str = "cli";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "compat-suite", disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to compat-suite.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Dynamic config utilities.
    DynamicConfig {
        /// Selected dynamic config subcommand.
        #[command(subcommand)]
        command: DynamicConfigCommand,
    },
    /// Report log utilities.
    Report {
        /// Selected report subcommand.
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Test suite utilities.
    Suite {
        /// Selected suite subcommand.
        #[command(subcommand)]
        command: SuiteCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a compat-suite configuration file.
    Validate,
}

/// Dynamic config subcommands.
#[derive(Subcommand, Debug)]
enum DynamicConfigCommand {
    /// Merge a local dynamic config with an override document.
    Merge(DynamicConfigMergeCommand),
    /// Print the entries of a module's dynamic config as JSON.
    Show(DynamicConfigShowCommand),
}

/// Arguments for `dynamic-config merge`.
#[derive(Args, Debug)]
struct DynamicConfigMergeCommand {
    /// Local `.dynamic` file.
    #[arg(long, value_name = "PATH")]
    local: PathBuf,
    /// Module the merged file is written for.
    #[arg(long, value_name = "MODULE")]
    module: String,
    /// Override JSON document (omit for no override).
    #[arg(long = "override", value_name = "PATH")]
    override_file: Option<PathBuf>,
    /// Output folder (defaults to `paths.merged_config_dir`).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

/// Arguments for `dynamic-config show`.
#[derive(Args, Debug)]
struct DynamicConfigShowCommand {
    /// Module whose config is shown.
    #[arg(long, value_name = "MODULE")]
    module: String,
    /// Folder holding `.dynamic` files (defaults to `paths.dynamic_config_dir`).
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

/// Report subcommands.
#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Parse a serialized report log and print it with statistics.
    Inspect(ReportInspectCommand),
    /// Print the device info streams stored for a report.
    Streams(ReportStreamsCommand),
}

/// Arguments for `report inspect`.
#[derive(Args, Debug)]
struct ReportInspectCommand {
    /// Serialized report log file.
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

/// Arguments for `report streams`.
#[derive(Args, Debug)]
struct ReportStreamsCommand {
    /// Report whose `<name>.reportlog.json` file is read.
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Folder holding report log files (defaults to `paths.report_log_dir`).
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

/// Suite subcommands.
#[derive(Subcommand, Debug)]
enum SuiteCommand {
    /// Print the test cases selected by filter arguments.
    Select(SuiteSelectCommand),
    /// Print the recorded arguments a retry run reuses.
    RetryArgs(SuiteRetryArgsCommand),
}

/// Arguments for `suite select`.
#[derive(Args, Debug)]
struct SuiteSelectCommand {
    /// File listing one `Class#method` test per line.
    #[arg(long, value_name = "PATH")]
    classes: PathBuf,
    /// Runner filter arguments (`--include-filter=..`, `--exclude-filter=..`).
    #[arg(last = true, value_name = "ARGS")]
    filter_args: Vec<String>,
}

/// Arguments for `suite retry-args`.
#[derive(Args, Debug)]
struct SuiteRetryArgsCommand {
    /// Command line recorded for the previous run.
    #[arg(long = "command-line", value_name = "LINE", allow_hyphen_values = true)]
    command_line: String,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// JSON view of a parsed report log.
#[derive(Debug, Serialize)]
struct ReportView<'a> {
    /// Report name.
    name: &'a str,
    /// Stream name.
    stream: &'a str,
    /// Summary metric.
    summary: Option<MetricView<'a>>,
    /// Detail metrics in order.
    details: Vec<MetricView<'a>>,
}

/// JSON view of one metric with its statistics.
#[derive(Debug, Serialize)]
struct MetricView<'a> {
    /// Metric entry.
    #[serde(flatten)]
    entry: &'a MetricEntry,
    /// Statistics over the metric's samples.
    stat: StatResult,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = HarnessConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let events = config
        .logging
        .build_event_sink()
        .map_err(|err| CliError::new(format!("failed to open event log: {err}")))?;

    let name = command_name(&cli.command);
    let result = match cli.command {
        Commands::Config {
            command,
        } => command_config(&command),
        Commands::DynamicConfig {
            command,
        } => command_dynamic_config(command, &config, &events),
        Commands::Report {
            command,
        } => command_report(&command, &config),
        Commands::Suite {
            command,
        } => command_suite(&command, &config),
    };

    let event = match &result {
        Ok(_) => HarnessEvent::new("command_completed", COMPONENT, EventOutcome::Success)
            .with_subject(name),
        Err(err) => HarnessEvent::new("command_failed", COMPONENT, EventOutcome::Error)
            .with_subject(name)
            .with_detail(err.to_string()),
    };
    events.record(&event);
    result
}

/// Returns the space-separated subcommand path for event subjects.
const fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Config {
            command: ConfigCommand::Validate,
        } => "config validate",
        Commands::DynamicConfig {
            command: DynamicConfigCommand::Merge(_),
        } => "dynamic-config merge",
        Commands::DynamicConfig {
            command: DynamicConfigCommand::Show(_),
        } => "dynamic-config show",
        Commands::Report {
            command: ReportCommand::Inspect(_),
        } => "report inspect",
        Commands::Report {
            command: ReportCommand::Streams(_),
        } => "report streams",
        Commands::Suite {
            command: SuiteCommand::Select(_),
        } => "suite select",
        Commands::Suite {
            command: SuiteCommand::RetryArgs(_),
        } => "suite retry-args",
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            write_stdout_line("config ok")
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Dynamic Config Commands
// ============================================================================

/// Dispatches dynamic config subcommands.
fn command_dynamic_config(
    command: DynamicConfigCommand,
    config: &HarnessConfig,
    events: &Arc<dyn EventSink>,
) -> CliResult<ExitCode> {
    match command {
        DynamicConfigCommand::Merge(command) => command_dynamic_config_merge(command, config, events),
        DynamicConfigCommand::Show(command) => command_dynamic_config_show(&command, config),
    }
}

/// Merges a local dynamic config with an optional override file.
fn command_dynamic_config_merge(
    command: DynamicConfigMergeCommand,
    config: &HarnessConfig,
    events: &Arc<dyn EventSink>,
) -> CliResult<ExitCode> {
    let limit = config.limits.max_input_bytes;
    let override_json = command
        .override_file
        .as_deref()
        .map(|path| read_text_input(path, "override", limit))
        .transpose()?;
    let output_dir = command.output_dir.unwrap_or_else(|| config.paths.merged_config_dir());
    let handler = DynamicConfigHandler::new(output_dir).with_event_sink(Arc::clone(events));
    let merged = handler
        .merge(&command.local, override_json.as_deref(), &command.module)
        .map_err(|err| CliError::new(format!("dynamic config merge failed: {err}")))?;
    write_json(&merged)?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the entries of a module's dynamic config.
fn command_dynamic_config_show(
    command: &DynamicConfigShowCommand,
    config: &HarnessConfig,
) -> CliResult<ExitCode> {
    let folder = command
        .dir
        .as_deref()
        .or(config.paths.dynamic_config_dir.as_deref())
        .ok_or_else(|| {
            CliError::new(
                "dynamic config folder not set; pass --dir or set paths.dynamic_config_dir"
                    .to_string(),
            )
        })?;
    let dynamic = DynamicConfig::load(folder, &command.module)
        .map_err(|err| CliError::new(format!("dynamic config load failed: {err}")))?;
    write_json(dynamic.params())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Report Commands
// ============================================================================

/// Dispatches report subcommands.
fn command_report(command: &ReportCommand, config: &HarnessConfig) -> CliResult<ExitCode> {
    match command {
        ReportCommand::Inspect(command) => {
            let xml = read_text_input(&command.path, "report", config.limits.max_input_bytes)?;
            let report = ReportLog::parse(&xml).map_err(|err| {
                CliError::new(format!("invalid report {}: {err}", command.path.display()))
            })?;
            write_json(&report_view(&report)?)?;
            Ok(ExitCode::SUCCESS)
        }
        ReportCommand::Streams(command) => command_report_streams(command, config),
    }
}

/// Prints the device info streams stored for a report.
fn command_report_streams(
    command: &ReportStreamsCommand,
    config: &HarnessConfig,
) -> CliResult<ExitCode> {
    let folder = command
        .dir
        .as_deref()
        .or(config.paths.report_log_dir.as_deref())
        .ok_or_else(|| {
            CliError::new(
                "report log folder not set; pass --dir or set paths.report_log_dir".to_string(),
            )
        })?;
    let streams = DeviceInfoStore::read_report(folder, &command.name)
        .map_err(|err| CliError::new(format!("report streams failed: {err}")))?;
    write_json(&streams)?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the JSON view of a parsed report.
fn report_view(report: &ReportLog) -> CliResult<ReportView<'_>> {
    Ok(ReportView {
        name: report.name(),
        stream: report.stream_name(),
        summary: report.summary().map(metric_view).transpose()?,
        details: report.details().iter().map(metric_view).collect::<CliResult<_>>()?,
    })
}

/// Pairs a metric with its statistics.
fn metric_view(entry: &MetricEntry) -> CliResult<MetricView<'_>> {
    let stat = get_stat(entry.values()).map_err(|err| {
        CliError::new(format!("statistics failed for metric '{}': {err}", entry.message()))
    })?;
    Ok(MetricView {
        entry,
        stat,
    })
}

// ============================================================================
// SECTION: Suite Commands
// ============================================================================

/// Dispatches suite subcommands.
fn command_suite(command: &SuiteCommand, config: &HarnessConfig) -> CliResult<ExitCode> {
    match command {
        SuiteCommand::Select(command) => command_suite_select(command, config),
        SuiteCommand::RetryArgs(command) => {
            let declaration = RunOptions::declaration();
            let valid = get_valid_cli_args(&command.command_line, &ClapOptions(&declaration));
            write_stdout_line(&valid.join(" "))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Prints the ids of the test cases admitted by the filter arguments.
fn command_suite_select(command: &SuiteSelectCommand, config: &HarnessConfig) -> CliResult<ExitCode> {
    let listing = read_text_input(&command.classes, "classes", config.limits.max_input_bytes)?;
    let classes = parse_class_listing(&listing)?;
    let filters = FilterArgs::parse(&command.filter_args)
        .map_err(|err| CliError::new(format!("invalid filter arguments: {err}")))?;
    if let Some(extra) = filters.remaining.first() {
        return Err(CliError::new(format!("unsupported filter argument '{extra}'")));
    }
    let suite = filters.select(&classes);
    let mut output = String::new();
    for case in suite.cases() {
        output.push_str(&case.id());
        output.push('\n');
    }
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Groups `Class#method` lines into classes, in order of first appearance.
///
/// Blank lines are skipped.
fn parse_class_listing(listing: &str) -> CliResult<Vec<TestClass>> {
    let mut order = Vec::new();
    let mut methods: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (index, line) in listing.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((class, method)) =
            line.split_once('#').filter(|(class, method)| !class.is_empty() && !method.is_empty())
        else {
            return Err(CliError::new(format!(
                "line {}: expected Class#method, found '{line}'",
                index + 1
            )));
        };
        let entry = methods.entry(class).or_default();
        if entry.is_empty() {
            order.push(class);
        }
        entry.push(method);
    }
    Ok(order
        .into_iter()
        .map(|class| TestClass::new(class, methods.remove(class).unwrap_or_default()))
        .collect())
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads a UTF-8 input file within the configured size limit.
fn read_text_input(path: &Path, kind: &str, max_bytes: usize) -> CliResult<String> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {kind} {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "{kind} {} is {size} bytes, over the {limit} byte limit",
            path.display()
        )),
    })?;
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(format!("{kind} {} is not utf-8", path.display())))
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as pretty JSON to stdout.
fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
