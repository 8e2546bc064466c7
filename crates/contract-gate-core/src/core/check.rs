// crates/contract-gate-core/src/core/check.rs
// ============================================================================
// Module: Contract Gate Check Model
// Description: Declarative check kinds, check specs, and check groups.
// Purpose: Capture structural expectations about a checkout as immutable data.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Checks are declarative expectations about artifacts of the system under
//! test: files in a checkout and tables/columns/rows in a `SQLite` database.
//! A check is immutable once constructed; evaluation lives in the runtime,
//! not on these types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CheckId;
use crate::core::identifiers::GroupId;

// ============================================================================
// SECTION: Row Predicates
// ============================================================================

/// Scalar value bound into a row predicate.
///
/// # Invariants
/// - Values are compared by the database engine, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateValue {
    /// Boolean value (stored as an integer by `SQLite`).
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text value.
    Text(String),
    /// SQL NULL.
    Null,
}

impl fmt::Display for PredicateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => value.fmt(f),
            Self::Integer(value) => value.fmt(f),
            Self::Real(value) => value.fmt(f),
            Self::Text(value) => value.fmt(f),
            Self::Null => f.write_str("null"),
        }
    }
}

/// One `column = value` equality term of a row predicate.
///
/// # Invariants
/// - `column` must pass identifier validation before reaching a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateTerm {
    /// Column name the term constrains.
    pub column: String,
    /// Value the column must equal.
    pub equals: PredicateValue,
}

// ============================================================================
// SECTION: Check Kinds
// ============================================================================

/// Verification operation a check performs.
///
/// # Invariants
/// - Variants are stable for serialization and manifest matching.
/// - File paths are relative to the checkout root; absolute paths are
///   rejected at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckKind {
    /// The path resolves under the root to a regular file.
    FileExists {
        /// Relative path of the file.
        path: String,
    },
    /// The file contains `needle` verbatim (byte-exact, no normalization).
    FileContains {
        /// Relative path of the file.
        path: String,
        /// Substring that must occur in the file.
        needle: String,
    },
    /// The file does not contain `needle` verbatim.
    FileNotContains {
        /// Relative path of the file.
        path: String,
        /// Substring that must not occur in the file.
        needle: String,
    },
    /// An HTML document declares an element with the given id attribute.
    HtmlElementId {
        /// Relative path of the document.
        path: String,
        /// Element id that must be declared.
        element_id: String,
    },
    /// The database schema catalog contains the table (case-sensitive exact).
    TableExists {
        /// Table name.
        table: String,
    },
    /// The table's column list contains the column.
    ColumnExists {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// At least one row of the table matches every predicate term.
    RowExists {
        /// Table name.
        table: String,
        /// Equality terms; all must hold on the same row.
        predicate: Vec<PredicateTerm>,
    },
}

impl CheckKind {
    /// Returns true when the check inspects the database rather than files.
    #[must_use]
    pub const fn is_schema_check(&self) -> bool {
        matches!(
            self,
            Self::TableExists {
                ..
            } | Self::ColumnExists {
                ..
            } | Self::RowExists {
                ..
            }
        )
    }
}

// ============================================================================
// SECTION: Check Spec
// ============================================================================

/// One declarative verification unit.
///
/// # Invariants
/// - Immutable once defined; evaluation never mutates the spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Check identifier, unique within a manifest.
    pub check_id: CheckId,
    /// Human-readable label for report output.
    pub description: String,
    /// Verification operation to perform.
    #[serde(flatten)]
    pub kind: CheckKind,
}

// ============================================================================
// SECTION: Check Group
// ============================================================================

/// Ordered batch of checks sharing one resource scope.
///
/// # Invariants
/// - Checks evaluate strictly in declaration order.
/// - Groups are independent of each other and share no mutable state.
/// - A group containing schema checks must declare `database`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckGroup {
    /// Group identifier, unique within a manifest.
    pub group_id: GroupId,
    /// Human-readable label for report output.
    pub description: String,
    /// Database file the group's schema checks inspect, if any.
    pub database: Option<PathBuf>,
    /// Checks in declaration order.
    pub checks: Vec<CheckSpec>,
}

impl CheckGroup {
    /// Returns true when any check in the group inspects the database.
    #[must_use]
    pub fn has_schema_checks(&self) -> bool {
        self.checks.iter().any(|check| check.kind.is_schema_check())
    }
}
