// crates/contract-gate-manifest/tests/manifest_diff.rs
// ============================================================================
// Module: Manifest Diff Tests
// Description: Drift computation between manifest versions.
// Purpose: Ensure contract evolution surfaces as a reviewable diff.
// ============================================================================

//! ## Overview
//! Unit-level tests for manifest drift:
//! - Added, removed, and redefined checks are classified by id
//! - Additive drift is distinguished from breaking drift
//! - Moving a check between groups without changing it is not drift

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

use contract_gate_core::CheckKind;
use contract_gate_manifest::Manifest;
use contract_gate_manifest::ManifestCheck;
use contract_gate_manifest::ManifestGroup;
use contract_gate_manifest::diff_manifests;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn file_check(id: &str, path: &str) -> ManifestCheck {
    ManifestCheck {
        id: id.to_owned(),
        description: format!("{path} exists"),
        kind: CheckKind::FileExists {
            path: path.to_owned(),
        },
    }
}

fn manifest_with(groups: Vec<(&str, Vec<ManifestCheck>)>) -> Manifest {
    Manifest {
        version: "1".to_owned(),
        groups: groups
            .into_iter()
            .map(|(id, checks)| ManifestGroup {
                id: id.to_owned(),
                description: format!("group {id}"),
                database: None,
                checks,
            })
            .collect(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn identical_manifests_have_no_drift() {
    let base = manifest_with(vec![("files", vec![file_check("main", "src/main.js")])]);
    let diff = diff_manifests(&base, &base.clone());
    assert!(diff.is_empty());
    assert!(diff.is_additive());
}

#[test]
fn added_checks_are_additive_drift() {
    let base = manifest_with(vec![("files", vec![file_check("main", "src/main.js")])]);
    let head = manifest_with(vec![(
        "files",
        vec![file_check("main", "src/main.js"), file_check("preload", "src/preload.js")],
    )]);

    let diff = diff_manifests(&base, &head);
    assert_eq!(diff.added, vec!["preload".to_owned()]);
    assert!(diff.removed.is_empty());
    assert!(diff.is_additive());
}

#[test]
fn removed_and_redefined_checks_break_additivity() {
    let base = manifest_with(vec![(
        "files",
        vec![file_check("main", "src/main.js"), file_check("preload", "src/preload.js")],
    )]);
    let head = manifest_with(vec![("files", vec![file_check("main", "src/modern-app.js")])]);

    let diff = diff_manifests(&base, &head);
    assert_eq!(diff.removed, vec!["preload".to_owned()]);
    assert_eq!(diff.redefined, vec!["main".to_owned()]);
    assert!(!diff.is_additive());
}

#[test]
fn moving_a_check_between_groups_is_not_drift() {
    let base = manifest_with(vec![("files", vec![file_check("main", "src/main.js")])]);
    let head = manifest_with(vec![
        ("files", Vec::new()),
        ("entry-points", vec![file_check("main", "src/main.js")]),
    ]);

    // Diffing compares declared checks by id, not group placement; the empty
    // group would be rejected by validation but is fine for diffing.
    let diff = diff_manifests(&base, &head);
    assert!(diff.is_empty());
}
