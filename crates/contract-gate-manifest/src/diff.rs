// crates/contract-gate-manifest/src/diff.rs
// ============================================================================
// Module: Contract Gate Manifest Diff
// Description: Additive-drift computation between two manifest versions.
// Purpose: Track contract evolution as a diff instead of copied suites.
// Dependencies: crate::manifest, serde
// ============================================================================

//! ## Overview
//! A contract evolves by amending one canonical manifest. The diff between
//! two versions names the checks added, removed, and redefined, so drift is
//! reviewable instead of being buried in near-identical copies of a suite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::manifest::Manifest;
use crate::manifest::ManifestCheck;

// ============================================================================
// SECTION: Diff Types
// ============================================================================

/// Drift between a base manifest and a head manifest.
///
/// # Invariants
/// - Identifier lists are sorted and duplicate-free.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDiff {
    /// Check ids present only in the head manifest.
    pub added: Vec<String>,
    /// Check ids present only in the base manifest.
    pub removed: Vec<String>,
    /// Check ids present in both but with a different kind or description.
    pub redefined: Vec<String>,
}

impl ManifestDiff {
    /// Returns true when the head manifest only adds checks.
    #[must_use]
    pub fn is_additive(&self) -> bool {
        self.removed.is_empty() && self.redefined.is_empty()
    }

    /// Returns true when the two manifests declare identical checks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.redefined.is_empty()
    }
}

// ============================================================================
// SECTION: Diff Computation
// ============================================================================

/// Computes the drift between two manifests, keyed by check id.
#[must_use]
pub fn diff_manifests(base: &Manifest, head: &Manifest) -> ManifestDiff {
    let base_checks = index_checks(base);
    let head_checks = index_checks(head);
    let mut diff = ManifestDiff::default();
    for (id, check) in &head_checks {
        match base_checks.get(id) {
            None => diff.added.push((*id).to_owned()),
            Some(previous) if previous.kind != check.kind
                || previous.description != check.description =>
            {
                diff.redefined.push((*id).to_owned());
            }
            Some(_) => {}
        }
    }
    for id in base_checks.keys() {
        if !head_checks.contains_key(id) {
            diff.removed.push((*id).to_owned());
        }
    }
    diff
}

/// Indexes a manifest's checks by id.
fn index_checks(manifest: &Manifest) -> BTreeMap<&str, &ManifestCheck> {
    manifest
        .groups
        .iter()
        .flat_map(|group| group.checks.iter())
        .map(|check| (check.id.as_str(), check))
        .collect()
}
