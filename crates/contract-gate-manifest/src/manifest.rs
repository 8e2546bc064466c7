// crates/contract-gate-manifest/src/manifest.rs
// ============================================================================
// Module: Contract Gate Manifest
// Description: Declarative check manifest loading and validation.
// Purpose: Provide strict, fail-closed manifest parsing with hard limits.
// Dependencies: contract-gate-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! A manifest is the canonical, versioned declaration of a contract: check
//! groups and their checks, in declaration order. Manifests are untrusted
//! input; loading enforces size and charset limits and validation fails
//! closed before any check reaches the runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use contract_gate_core::CheckGroup;
use contract_gate_core::CheckId;
use contract_gate_core::CheckKind;
use contract_gate_core::CheckSpec;
use contract_gate_core::GroupId;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Manifest version this crate understands.
pub const SUPPORTED_MANIFEST_VERSION: &str = "1";
/// Maximum manifest file size in bytes.
pub const MAX_MANIFEST_BYTES: usize = 1024 * 1024;
/// Maximum number of groups in a manifest.
pub const MAX_GROUPS: usize = 256;
/// Maximum total number of checks in a manifest.
pub const MAX_TOTAL_CHECKS: usize = 4096;
/// Maximum number of terms in a row predicate.
pub const MAX_PREDICATE_TERMS: usize = 16;
/// Maximum length of a group or check identifier in bytes.
const MAX_ID_LENGTH: usize = 128;
/// Maximum length of a description in bytes.
const MAX_DESCRIPTION_LENGTH: usize = 512;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Manifest loading and validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// I/O failure while reading the manifest.
    #[error("manifest io error: {0}")]
    Io(String),
    /// TOML or JSON parsing error.
    #[error("manifest parse error: {0}")]
    Parse(String),
    /// The file extension does not name a supported format.
    #[error("unsupported manifest format: {0}")]
    UnsupportedFormat(String),
    /// Invalid manifest data.
    #[error("invalid manifest: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Format
// ============================================================================

/// Wire format of a manifest file.
///
/// # Invariants
/// - Formats map 1:1 to file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// TOML manifest (`.toml`).
    Toml,
    /// JSON manifest (`.json`).
    Json,
}

impl ManifestFormat {
    /// Selects the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnsupportedFormat`] for any extension other
    /// than `toml` or `json`.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(ManifestError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

// ============================================================================
// SECTION: Manifest Types
// ============================================================================

/// One check declaration inside a group.
///
/// # Invariants
/// - `id` is unique across the whole manifest after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestCheck {
    /// Check identifier.
    pub id: String,
    /// Human-readable label for report output.
    pub description: String,
    /// Verification operation to perform.
    #[serde(flatten)]
    pub kind: CheckKind,
}

/// One check group declaration.
///
/// # Invariants
/// - Declaration order of `checks` is evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestGroup {
    /// Group identifier.
    pub id: String,
    /// Human-readable label for report output.
    pub description: String,
    /// Database file the group's schema checks inspect, relative to the
    /// checkout root unless absolute.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Checks in declaration order.
    #[serde(default, rename = "check")]
    pub checks: Vec<ManifestCheck>,
}

/// Canonical, versioned contract declaration.
///
/// # Invariants
/// - `version` must match [`SUPPORTED_MANIFEST_VERSION`] after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest schema version.
    pub version: String,
    /// Groups in declaration order.
    #[serde(default, rename = "group")]
    pub groups: Vec<ManifestGroup>,
}

impl Manifest {
    /// Loads and validates a manifest from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the file cannot be read, exceeds the
    /// size limit, fails to parse, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let format = ManifestFormat::from_path(path)?;
        let bytes = fs::read(path)
            .map_err(|err| ManifestError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_MANIFEST_BYTES {
            return Err(ManifestError::Invalid("manifest exceeds size limit".to_owned()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ManifestError::Invalid("manifest must be utf-8".to_owned()))?;
        let manifest: Self = match format {
            ManifestFormat::Toml => {
                toml::from_str(content).map_err(|err| ManifestError::Parse(err.to_string()))?
            }
            ManifestFormat::Json => {
                serde_json::from_str(content).map_err(|err| ManifestError::Parse(err.to_string()))?
            }
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validates the manifest for internal consistency, fail closed.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Invalid`] naming the first violation found.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.version != SUPPORTED_MANIFEST_VERSION {
            return Err(ManifestError::Invalid(format!(
                "unsupported manifest version: {}",
                self.version
            )));
        }
        if self.groups.is_empty() {
            return Err(ManifestError::Invalid("manifest declares no groups".to_owned()));
        }
        if self.groups.len() > MAX_GROUPS {
            return Err(ManifestError::Invalid(format!(
                "manifest exceeds {MAX_GROUPS} groups"
            )));
        }
        let total_checks: usize = self.groups.iter().map(|group| group.checks.len()).sum();
        if total_checks > MAX_TOTAL_CHECKS {
            return Err(ManifestError::Invalid(format!(
                "manifest exceeds {MAX_TOTAL_CHECKS} checks"
            )));
        }
        let mut group_ids = BTreeSet::new();
        let mut check_ids = BTreeSet::new();
        for group in &self.groups {
            validate_identifier_field("group id", &group.id)?;
            validate_description_field(&group.id, &group.description)?;
            if !group_ids.insert(group.id.as_str()) {
                return Err(ManifestError::Invalid(format!("duplicate group id: {}", group.id)));
            }
            if group.checks.is_empty() {
                return Err(ManifestError::Invalid(format!(
                    "group '{}' declares no checks",
                    group.id
                )));
            }
            let needs_database =
                group.checks.iter().any(|check| check.kind.is_schema_check());
            if needs_database && group.database.is_none() {
                return Err(ManifestError::Invalid(format!(
                    "group '{}' carries schema checks but declares no database",
                    group.id
                )));
            }
            for check in &group.checks {
                validate_identifier_field("check id", &check.id)?;
                validate_description_field(&check.id, &check.description)?;
                if !check_ids.insert(check.id.as_str()) {
                    return Err(ManifestError::Invalid(format!(
                        "duplicate check id: {}",
                        check.id
                    )));
                }
                validate_check_kind(&check.id, &check.kind)?;
            }
        }
        Ok(())
    }

    /// Converts the manifest into core check groups, in declaration order.
    #[must_use]
    pub fn to_check_groups(&self) -> Vec<CheckGroup> {
        self.groups
            .iter()
            .map(|group| CheckGroup {
                group_id: GroupId::new(group.id.as_str()),
                description: group.description.clone(),
                database: group.database.clone(),
                checks: group
                    .checks
                    .iter()
                    .map(|check| CheckSpec {
                        check_id: CheckId::new(check.id.as_str()),
                        description: check.description.clone(),
                        kind: check.kind.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Returns every check id in declaration order.
    #[must_use]
    pub fn check_ids(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|group| group.checks.iter().map(|check| check.id.as_str()))
            .collect()
    }
}

// ============================================================================
// SECTION: Field Validation
// ============================================================================

/// Validates an identifier field's charset and length.
fn validate_identifier_field(label: &str, id: &str) -> Result<(), ManifestError> {
    if id.is_empty() {
        return Err(ManifestError::Invalid(format!("empty {label}")));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(ManifestError::Invalid(format!(
            "{label} '{id}' exceeds {MAX_ID_LENGTH} bytes"
        )));
    }
    let valid = id.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
    if !valid {
        return Err(ManifestError::Invalid(format!(
            "{label} '{id}' must be lowercase ascii, digits, and dashes"
        )));
    }
    Ok(())
}

/// Validates a description field's length.
fn validate_description_field(id: &str, description: &str) -> Result<(), ManifestError> {
    if description.is_empty() {
        return Err(ManifestError::Invalid(format!("'{id}' carries an empty description")));
    }
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(ManifestError::Invalid(format!(
            "'{id}' description exceeds {MAX_DESCRIPTION_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Validates per-kind payload fields.
fn validate_check_kind(id: &str, kind: &CheckKind) -> Result<(), ManifestError> {
    match kind {
        CheckKind::FileExists {
            path,
        } => validate_nonempty(id, "path", path),
        CheckKind::FileContains {
            path,
            needle,
        }
        | CheckKind::FileNotContains {
            path,
            needle,
        } => {
            validate_nonempty(id, "path", path)?;
            validate_nonempty(id, "needle", needle)
        }
        CheckKind::HtmlElementId {
            path,
            element_id,
        } => {
            validate_nonempty(id, "path", path)?;
            validate_nonempty(id, "element_id", element_id)
        }
        CheckKind::TableExists {
            table,
        } => validate_nonempty(id, "table", table),
        CheckKind::ColumnExists {
            table,
            column,
        } => {
            validate_nonempty(id, "table", table)?;
            validate_nonempty(id, "column", column)
        }
        CheckKind::RowExists {
            table,
            predicate,
        } => {
            validate_nonempty(id, "table", table)?;
            if predicate.is_empty() || predicate.len() > MAX_PREDICATE_TERMS {
                return Err(ManifestError::Invalid(format!(
                    "check '{id}' predicate must carry between 1 and {MAX_PREDICATE_TERMS} terms"
                )));
            }
            for term in predicate {
                validate_nonempty(id, "predicate column", &term.column)?;
            }
            Ok(())
        }
    }
}

/// Rejects an empty payload field.
fn validate_nonempty(id: &str, field: &str, value: &str) -> Result<(), ManifestError> {
    if value.is_empty() {
        return Err(ManifestError::Invalid(format!("check '{id}' carries an empty {field}")));
    }
    Ok(())
}
