// crates/contract-gate-core/src/runtime/verifier.rs
// ============================================================================
// Module: Contract Gate Verifier
// Description: Sequential check evaluation and verdict classification.
// Purpose: Run check groups against probes and produce the run report.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The verifier executes check groups strictly in declaration order. A check
//! that cannot be evaluated records a failed result and never aborts the
//! run: one failing check must not prevent evaluation of the checks after
//! it, in the same group or later ones. Evaluation is read-only against the
//! system under test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::CheckGroup;
use crate::core::CheckKind;
use crate::core::CheckResult;
use crate::core::CheckSpec;
use crate::core::FailureKind;
use crate::core::GroupId;
use crate::core::PredicateTerm;
use crate::core::Report;
use crate::interfaces::SchemaError;
use crate::interfaces::SchemaProbe;
use crate::interfaces::SchemaProbeSource;
use crate::interfaces::SourceError;
use crate::interfaces::SourceProbe;

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Sequential contract verifier over a source probe and a schema probe
/// source.
///
/// # Invariants
/// - Evaluation order matches declaration order.
/// - One schema probe is opened per group and released when the group ends.
pub struct Verifier<'probes> {
    /// Probe over the checkout under verification.
    source: &'probes dyn SourceProbe,
    /// Factory for per-group database probes.
    schemas: &'probes dyn SchemaProbeSource,
}

impl<'probes> Verifier<'probes> {
    /// Creates a verifier over the given probes.
    #[must_use]
    pub const fn new(
        source: &'probes dyn SourceProbe,
        schemas: &'probes dyn SchemaProbeSource,
    ) -> Self {
        Self {
            source,
            schemas,
        }
    }

    /// Runs every group in order and returns the frozen report.
    #[must_use]
    pub fn run(&self, groups: &[CheckGroup]) -> Report {
        let mut report = Report::new();
        for group in groups {
            self.run_group(group, &mut report);
        }
        report
    }

    /// Evaluates one group, recording one result per check.
    fn run_group(&self, group: &CheckGroup, report: &mut Report) {
        let schema_probe = group.database.as_deref().map(|path| self.schemas.open(path));
        for check in &group.checks {
            let result = match &check.kind {
                CheckKind::FileExists {
                    path,
                } => evaluate_file_exists(self.source, check, path),
                CheckKind::FileContains {
                    path,
                    needle,
                } => evaluate_file_contains(self.source, check, path, needle),
                CheckKind::FileNotContains {
                    path,
                    needle,
                } => evaluate_file_not_contains(self.source, check, path, needle),
                CheckKind::HtmlElementId {
                    path,
                    element_id,
                } => evaluate_html_element_id(self.source, check, path, element_id),
                CheckKind::TableExists {
                    table,
                } => match group_probe(schema_probe.as_ref(), check, &group.group_id) {
                    Ok(probe) => evaluate_table_exists(probe, check, table),
                    Err(result) => result,
                },
                CheckKind::ColumnExists {
                    table,
                    column,
                } => match group_probe(schema_probe.as_ref(), check, &group.group_id) {
                    Ok(probe) => evaluate_column_exists(probe, check, table, column),
                    Err(result) => result,
                },
                CheckKind::RowExists {
                    table,
                    predicate,
                } => match group_probe(schema_probe.as_ref(), check, &group.group_id) {
                    Ok(probe) => evaluate_row_exists(probe, check, table, predicate),
                    Err(result) => result,
                },
            };
            report.record(result);
        }
        // The group's probe drops here, releasing the connection on every
        // exit path.
    }
}

/// Resolves the group's schema probe or records why it is unusable.
fn group_probe<'a>(
    schema_probe: Option<&'a Result<Box<dyn SchemaProbe>, SchemaError>>,
    check: &CheckSpec,
    group_id: &GroupId,
) -> Result<&'a dyn SchemaProbe, CheckResult> {
    match schema_probe {
        None => Err(CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::ResourceUnavailable,
            format!("group '{group_id}' declares no database"),
        )),
        Some(Err(err)) => Err(CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::ResourceUnavailable,
            err.to_string(),
        )),
        Some(Ok(probe)) => Ok(probe.as_ref()),
    }
}

// ============================================================================
// SECTION: File Check Evaluation
// ============================================================================

/// Evaluates a file-existence check.
fn evaluate_file_exists(source: &dyn SourceProbe, check: &CheckSpec, path: &str) -> CheckResult {
    match source.file_exists(path) {
        Ok(true) => CheckResult::pass(check.check_id.clone(), check.description.clone()),
        Ok(false) => CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::MissingArtifact,
            format!("file not found: {path}"),
        ),
        Err(err) => source_failure(check, &err),
    }
}

/// Evaluates a substring-presence check.
fn evaluate_file_contains(
    source: &dyn SourceProbe,
    check: &CheckSpec,
    path: &str,
    needle: &str,
) -> CheckResult {
    match source.read_to_string(path) {
        Ok(contents) if contents.contains(needle) => {
            CheckResult::pass(check.check_id.clone(), check.description.clone())
        }
        Ok(_) => CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::ContentMismatch,
            format!("substring not found in {path}: \"{needle}\""),
        ),
        Err(err) => source_failure(check, &err),
    }
}

/// Evaluates a substring-absence check.
fn evaluate_file_not_contains(
    source: &dyn SourceProbe,
    check: &CheckSpec,
    path: &str,
    needle: &str,
) -> CheckResult {
    match source.read_to_string(path) {
        Ok(contents) if contents.contains(needle) => CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::ContentMismatch,
            format!("forbidden substring present in {path}: \"{needle}\""),
        ),
        Ok(_) => CheckResult::pass(check.check_id.clone(), check.description.clone()),
        Err(err) => source_failure(check, &err),
    }
}

/// Evaluates an HTML element-id presence check.
fn evaluate_html_element_id(
    source: &dyn SourceProbe,
    check: &CheckSpec,
    path: &str,
    element_id: &str,
) -> CheckResult {
    match source.read_to_string(path) {
        Ok(contents) if document_declares_id(&contents, element_id) => {
            CheckResult::pass(check.check_id.clone(), check.description.clone())
        }
        Ok(_) => CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::MissingArtifact,
            format!("element id \"{element_id}\" not declared in {path}"),
        ),
        Err(err) => source_failure(check, &err),
    }
}

/// Returns true when the document declares an element with the given id.
fn document_declares_id(document: &str, element_id: &str) -> bool {
    let double_quoted = format!("id=\"{element_id}\"");
    let single_quoted = format!("id='{element_id}'");
    document.contains(&double_quoted) || document.contains(&single_quoted)
}

/// Classifies a source probe error into a failed result.
fn source_failure(check: &CheckSpec, err: &SourceError) -> CheckResult {
    let failure = match err {
        SourceError::NotFound {
            ..
        } => FailureKind::MissingArtifact,
        SourceError::PathRejected {
            ..
        }
        | SourceError::Io {
            ..
        } => FailureKind::ResourceUnavailable,
    };
    CheckResult::fail(check.check_id.clone(), check.description.clone(), failure, err.to_string())
}

// ============================================================================
// SECTION: Schema Check Evaluation
// ============================================================================

/// Evaluates a table-existence check.
fn evaluate_table_exists(probe: &dyn SchemaProbe, check: &CheckSpec, table: &str) -> CheckResult {
    match probe.table_exists(table) {
        Ok(true) => CheckResult::pass(check.check_id.clone(), check.description.clone()),
        Ok(false) => CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::MissingArtifact,
            format!("table not found: {table}"),
        ),
        Err(err) => schema_failure(check, &err),
    }
}

/// Evaluates a column-existence check.
fn evaluate_column_exists(
    probe: &dyn SchemaProbe,
    check: &CheckSpec,
    table: &str,
    column: &str,
) -> CheckResult {
    match probe.column_exists(table, column) {
        Ok(true) => CheckResult::pass(check.check_id.clone(), check.description.clone()),
        Ok(false) => CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::MissingArtifact,
            format!("column not found: {table}.{column}"),
        ),
        Err(err) => schema_failure(check, &err),
    }
}

/// Evaluates a row-presence check.
fn evaluate_row_exists(
    probe: &dyn SchemaProbe,
    check: &CheckSpec,
    table: &str,
    predicate: &[PredicateTerm],
) -> CheckResult {
    match probe.row_exists(table, predicate) {
        Ok(true) => CheckResult::pass(check.check_id.clone(), check.description.clone()),
        Ok(false) => CheckResult::fail(
            check.check_id.clone(),
            check.description.clone(),
            FailureKind::ContentMismatch,
            format!("no row in {table} matches the predicate"),
        ),
        Err(err) => schema_failure(check, &err),
    }
}

/// Classifies a schema probe error into a failed result.
fn schema_failure(check: &CheckSpec, err: &SchemaError) -> CheckResult {
    let failure = match err {
        SchemaError::MissingTable {
            ..
        } => FailureKind::MissingArtifact,
        SchemaError::InvalidIdentifier {
            ..
        }
        | SchemaError::Db(_)
        | SchemaError::Unavailable(_) => FailureKind::ResourceUnavailable,
    };
    CheckResult::fail(check.check_id.clone(), check.description.clone(), failure, err.to_string())
}
