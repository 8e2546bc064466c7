// crates/contract-gate-core/src/core/report.rs
// ============================================================================
// Module: Contract Gate Report
// Description: Verdict taxonomy and the append-only run report.
// Purpose: Accumulate one result per check and expose the aggregate outcome.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A report collects one result per check in declaration order. It is
//! append-only while a run executes and read-only afterwards; the exit code
//! it derives is the sole signal consumed by a calling process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CheckId;

// ============================================================================
// SECTION: Failure Taxonomy
// ============================================================================

/// Classification of a failed check.
///
/// # Invariants
/// - Variants are stable for serialization and programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A file, table, column, or element the contract requires is absent.
    MissingArtifact,
    /// The artifact exists but violates a content expectation.
    ContentMismatch,
    /// The artifact could not be inspected (environment problem, not a
    /// contract violation).
    ResourceUnavailable,
}

impl FailureKind {
    /// Returns the stable label used in human-readable output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MissingArtifact => "missing artifact",
            Self::ContentMismatch => "content mismatch",
            Self::ResourceUnavailable => "resource unavailable",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Outcome of evaluating one check.
///
/// # Invariants
/// - A failed verdict always carries its failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// The expectation held.
    Pass,
    /// The expectation was violated or could not be evaluated.
    Fail {
        /// Failure classification.
        failure: FailureKind,
    },
}

impl Verdict {
    /// Returns true when the check passed.
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ============================================================================
// SECTION: Check Result
// ============================================================================

/// Result recorded for one check.
///
/// # Invariants
/// - `message` is present iff the verdict is a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Identifier of the evaluated check.
    pub check_id: CheckId,
    /// Human-readable label copied from the check spec.
    pub description: String,
    /// Evaluation outcome.
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Failure detail naming the violated expectation.
    pub message: Option<String>,
}

impl CheckResult {
    /// Records a passing result for a check.
    #[must_use]
    pub fn pass(check_id: CheckId, description: impl Into<String>) -> Self {
        Self {
            check_id,
            description: description.into(),
            verdict: Verdict::Pass,
            message: None,
        }
    }

    /// Records a failing result with its classification and detail.
    #[must_use]
    pub fn fail(
        check_id: CheckId,
        description: impl Into<String>,
        failure: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_id,
            description: description.into(),
            verdict: Verdict::Fail {
                failure,
            },
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Append-only record of one verification run.
///
/// # Invariants
/// - Result order matches check declaration order.
/// - Results are never removed or rewritten once recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Results in declaration order.
    results: Vec<CheckResult>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    /// Appends one result to the report.
    pub fn record(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    /// Returns the recorded results in declaration order.
    #[must_use]
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Returns the total number of recorded results.
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Returns the number of passing results.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|result| result.verdict.is_pass()).count()
    }

    /// Returns the number of failing results.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Returns true when every recorded check passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Returns the process exit code for the run: 0 iff every check passed.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.all_passed())
    }

    /// Returns the one-line summary for the end of a run.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!("{}/{} checks passed", self.passed(), self.total())
    }
}
