// crates/contract-gate-cli/src/main.rs
// ============================================================================
// Module: Contract Gate CLI Entry Point
// Description: Command dispatcher for verification and manifest workflows.
// Purpose: Provide the contract-gate binary consumed by CI and local runs.
// Dependencies: clap, contract-gate-core, contract-gate-manifest, contract-gate-sqlite, serde
// ============================================================================

//! ## Overview
//! The Contract Gate CLI runs declarative check manifests against a checkout
//! and its `SQLite` database. The process exit status is the contract with
//! the caller: 0 when every check passed, 1 when any check failed, and 2
//! when the invocation itself (arguments, manifest) is invalid.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use contract_gate_core::CheckGroup;
use contract_gate_core::CheckResult;
use contract_gate_core::FsSourceProbe;
use contract_gate_core::Report;
use contract_gate_core::Verdict;
use contract_gate_core::Verifier;
use contract_gate_manifest::Manifest;
use contract_gate_manifest::ManifestDiff;
use contract_gate_manifest::diff_manifests;
use contract_gate_sqlite::SqliteProbeSource;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Exit status for an invocation or manifest error.
const INVOCATION_FAILURE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "contract-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a manifest's check groups against a checkout.
    Verify(VerifyCommand),
    /// Manifest utilities.
    Manifest {
        /// Selected manifest subcommand.
        #[command(subcommand)]
        command: ManifestCommand,
    },
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// One JSON document.
    Json,
}

/// Arguments for the `verify` command.
#[derive(Args, Debug)]
struct VerifyCommand {
    /// Path to the check manifest (.toml or .json).
    #[arg(long, value_name = "FILE")]
    manifest: PathBuf,
    /// Checkout root the file checks resolve under.
    #[arg(long, value_name = "DIR")]
    root: PathBuf,
    /// Database file overriding every group's declared database.
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Manifest utility subcommands.
#[derive(Subcommand, Debug)]
enum ManifestCommand {
    /// Load and validate a manifest.
    Validate(ManifestValidateCommand),
    /// List a manifest's groups and checks.
    List(ManifestListCommand),
    /// Report drift between two manifest versions.
    Diff(ManifestDiffCommand),
}

/// Arguments for `manifest validate`.
#[derive(Args, Debug)]
struct ManifestValidateCommand {
    /// Path to the check manifest.
    #[arg(long, value_name = "FILE")]
    manifest: PathBuf,
}

/// Arguments for `manifest list`.
#[derive(Args, Debug)]
struct ManifestListCommand {
    /// Path to the check manifest.
    #[arg(long, value_name = "FILE")]
    manifest: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `manifest diff`.
#[derive(Args, Debug)]
struct ManifestDiffCommand {
    /// Base manifest version.
    #[arg(long, value_name = "FILE")]
    base: PathBuf,
    /// Head manifest version.
    #[arg(long, value_name = "FILE")]
    head: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI-level error carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// User-facing error message.
    message: String,
}

impl CliError {
    /// Creates a CLI error from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("contract-gate {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        return Err(CliError::new("no command given; see --help"));
    };

    match command {
        Commands::Verify(command) => command_verify(&command),
        Commands::Manifest {
            command,
        } => match command {
            ManifestCommand::Validate(command) => command_manifest_validate(&command),
            ManifestCommand::List(command) => command_manifest_list(&command),
            ManifestCommand::Diff(command) => command_manifest_diff(&command),
        },
    }
}

// ============================================================================
// SECTION: Verify Command
// ============================================================================

/// Report document emitted by `verify --format json`.
#[derive(Debug, Serialize)]
struct VerifyOutput<'report> {
    /// Total number of evaluated checks.
    total: usize,
    /// Number of passing checks.
    passed: usize,
    /// Number of failing checks.
    failed: usize,
    /// Per-check results in declaration order.
    results: &'report [CheckResult],
}

/// Executes the `verify` command.
fn command_verify(command: &VerifyCommand) -> CliResult<ExitCode> {
    let manifest = Manifest::load(&command.manifest).map_err(|err| CliError::new(err.to_string()))?;
    let mut groups = manifest.to_check_groups();
    resolve_group_databases(&mut groups, &command.root, command.database.as_deref());

    let source = FsSourceProbe::new(&command.root);
    let schemas = SqliteProbeSource::new();
    let verifier = Verifier::new(&source, &schemas);
    let report = verifier.run(&groups);

    match command.format {
        OutputFormat::Text => {
            write_stdout_line(&render_text_report(&report))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        OutputFormat::Json => {
            let output = VerifyOutput {
                total: report.total(),
                passed: report.passed(),
                failed: report.failed(),
                results: report.results(),
            };
            write_json_line(&output)?;
        }
    }
    Ok(ExitCode::from(report.exit_code()))
}

/// Resolves each group's database path against the root, or applies the
/// command-line override to every group that declares one.
fn resolve_group_databases(groups: &mut [CheckGroup], root: &Path, over: Option<&Path>) {
    for group in groups {
        let Some(declared) = group.database.take() else {
            continue;
        };
        let resolved = match over {
            Some(path) => path.to_path_buf(),
            None if declared.is_relative() => root.join(declared),
            None => declared,
        };
        group.database = Some(resolved);
    }
}

/// Renders the report as one line per check plus the summary line.
fn render_text_report(report: &Report) -> String {
    let mut output = String::new();
    for result in report.results() {
        match result.verdict {
            Verdict::Pass => {
                output.push_str(&format!("pass {}: {}\n", result.check_id, result.description));
            }
            Verdict::Fail {
                failure,
            } => {
                let detail = result.message.as_deref().unwrap_or("unspecified failure");
                output.push_str(&format!(
                    "fail {}: {} ({}: {})\n",
                    result.check_id, result.description, failure, detail
                ));
            }
        }
    }
    output.push_str(&report.summary_line());
    output
}

// ============================================================================
// SECTION: Manifest Commands
// ============================================================================

/// Executes the `manifest validate` command.
fn command_manifest_validate(command: &ManifestValidateCommand) -> CliResult<ExitCode> {
    let manifest = Manifest::load(&command.manifest).map_err(|err| CliError::new(err.to_string()))?;
    let checks: usize = manifest.groups.iter().map(|group| group.checks.len()).sum();
    write_stdout_line(&format!(
        "manifest ok: {} groups, {} checks",
        manifest.groups.len(),
        checks
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `manifest list` command.
fn command_manifest_list(command: &ManifestListCommand) -> CliResult<ExitCode> {
    let manifest = Manifest::load(&command.manifest).map_err(|err| CliError::new(err.to_string()))?;
    match command.format {
        OutputFormat::Text => {
            write_stdout_line(render_manifest_listing(&manifest).trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        OutputFormat::Json => write_json_line(&manifest)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders a manifest's groups and checks as indented lines.
fn render_manifest_listing(manifest: &Manifest) -> String {
    let mut output = String::new();
    for group in &manifest.groups {
        output.push_str(&format!("{}: {}\n", group.id, group.description));
        for check in &group.checks {
            output.push_str(&format!("  {}: {}\n", check.id, check.description));
        }
    }
    output
}

/// Executes the `manifest diff` command.
///
/// Exit status is 0 when the head manifest only adds checks and 1 when any
/// check was removed or redefined, so CI can gate on non-additive drift.
fn command_manifest_diff(command: &ManifestDiffCommand) -> CliResult<ExitCode> {
    let base = Manifest::load(&command.base).map_err(|err| CliError::new(err.to_string()))?;
    let head = Manifest::load(&command.head).map_err(|err| CliError::new(err.to_string()))?;
    let diff = diff_manifests(&base, &head);
    match command.format {
        OutputFormat::Text => {
            write_stdout_line(render_diff(&diff).trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        OutputFormat::Json => write_json_line(&diff)?,
    }
    if diff.is_additive() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Renders a manifest diff as one line per drifted check plus a summary.
fn render_diff(diff: &ManifestDiff) -> String {
    let mut output = String::new();
    for id in &diff.added {
        output.push_str(&format!("added {id}\n"));
    }
    for id in &diff.removed {
        output.push_str(&format!("removed {id}\n"));
    }
    for id in &diff.redefined {
        output.push_str(&format!("redefined {id}\n"));
    }
    if diff.is_empty() {
        output.push_str("manifests declare identical checks\n");
    } else {
        output.push_str(&format!(
            "manifest drift: {} added, {} removed, {} redefined\n",
            diff.added.len(),
            diff.removed.len(),
            diff.redefined.len()
        ));
    }
    output
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a value as one JSON document line on stdout.
fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("json serialization failed: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns the invocation-failure exit
/// code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(INVOCATION_FAILURE)
}
