// crates/contract-gate-core/tests/report_unit.rs
// ============================================================================
// Module: Report Unit Tests
// Description: Invariant coverage for the append-only run report.
// Purpose: Validate ordering, counting, and exit-code derivation.
// ============================================================================

//! ## Overview
//! Unit-level tests for report invariants:
//! - Result order matches record order
//! - Counts partition into passed and failed
//! - Exit code is 0 iff no check failed, for any verdict sequence

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
    reason = "Test-only assertions and helpers are permitted."
)]

use contract_gate_core::CheckId;
use contract_gate_core::CheckResult;
use contract_gate_core::FailureKind;
use contract_gate_core::Report;
use contract_gate_core::Verdict;
use proptest::prelude::*;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn pass_result(id: &str) -> CheckResult {
    CheckResult::pass(CheckId::new(id), format!("check {id}"))
}

fn fail_result(id: &str, failure: FailureKind) -> CheckResult {
    CheckResult::fail(CheckId::new(id), format!("check {id}"), failure, "detail")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn report_preserves_record_order() {
    let mut report = Report::new();
    report.record(fail_result("c-2", FailureKind::MissingArtifact));
    report.record(pass_result("c-1"));
    report.record(pass_result("c-3"));

    let ids: Vec<&str> = report.results().iter().map(|result| result.check_id.as_str()).collect();
    assert_eq!(ids, vec!["c-2", "c-1", "c-3"]);
}

#[test]
fn report_counts_partition_results() {
    let mut report = Report::new();
    report.record(pass_result("c-1"));
    report.record(fail_result("c-2", FailureKind::ContentMismatch));
    report.record(fail_result("c-3", FailureKind::ResourceUnavailable));

    assert_eq!(report.total(), 3);
    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 2);
    assert!(!report.all_passed());
    assert_eq!(report.summary_line(), "1/3 checks passed");
}

#[test]
fn empty_report_passes() {
    let report = Report::new();
    assert_eq!(report.total(), 0);
    assert!(report.all_passed());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn failed_result_carries_taxonomy_and_message() {
    let result = fail_result("c-1", FailureKind::MissingArtifact);
    assert!(matches!(
        result.verdict,
        Verdict::Fail {
            failure: FailureKind::MissingArtifact
        }
    ));
    assert_eq!(result.message.as_deref(), Some("detail"));
}

#[test]
fn passing_result_carries_no_message() {
    let result = pass_result("c-1");
    assert!(result.verdict.is_pass());
    assert!(result.message.is_none());
}

#[test]
fn report_serializes_verdict_tags() {
    let mut report = Report::new();
    report.record(pass_result("c-1"));
    report.record(fail_result("c-2", FailureKind::ContentMismatch));

    let rendered = serde_json::to_value(&report).expect("report json");
    let results = rendered.get("results").and_then(|value| value.as_array()).expect("results");
    assert_eq!(results[0].get("status"), Some(&serde_json::json!("pass")));
    assert_eq!(results[1].get("status"), Some(&serde_json::json!("fail")));
    assert_eq!(results[1].get("failure"), Some(&serde_json::json!("content_mismatch")));
}

proptest! {
    #[test]
    fn exit_code_zero_iff_no_failures(verdicts in proptest::collection::vec(any::<bool>(), 0..64)) {
        let mut report = Report::new();
        for (index, passed) in verdicts.iter().enumerate() {
            let id = format!("c-{index}");
            if *passed {
                report.record(pass_result(&id));
            } else {
                report.record(fail_result(&id, FailureKind::ContentMismatch));
            }
        }
        let expected_failed = verdicts.iter().filter(|passed| !**passed).count();
        prop_assert_eq!(report.failed(), expected_failed);
        prop_assert_eq!(report.exit_code() == 0, expected_failed == 0);
    }
}
