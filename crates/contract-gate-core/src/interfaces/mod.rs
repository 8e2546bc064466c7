// crates/contract-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Contract Gate Interfaces
// Description: Backend-agnostic probes for source trees and database schemas.
// Purpose: Define the read-only contract surfaces used by the verifier runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Probes define how the verifier inspects the system under test without
//! embedding backend details. Implementations must be read-only and fail
//! closed: an inspection that cannot be performed is an error, never a
//! silent pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use thiserror::Error;

use crate::core::PredicateTerm;

// ============================================================================
// SECTION: Source Probe
// ============================================================================

/// Source tree probe errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file does not exist under the checkout root.
    #[error("file not found: {path}")]
    NotFound {
        /// Relative path of the missing file.
        path: String,
    },
    /// The path was rejected before any filesystem access.
    #[error("path rejected: {path}: {reason}")]
    PathRejected {
        /// Offending path as declared by the check.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },
    /// The file exists but could not be read.
    #[error("source read error: {path}: {message}")]
    Io {
        /// Relative path of the unreadable file.
        path: String,
        /// Underlying error detail.
        message: String,
    },
}

/// Read-only probe over the checkout under verification.
///
/// Paths are relative to the checkout root; implementations must reject
/// paths that escape it.
pub trait SourceProbe {
    /// Returns true when the path resolves to a regular file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the path is rejected or the filesystem
    /// cannot be queried. A missing file is `Ok(false)`, not an error.
    fn file_exists(&self, path: &str) -> Result<bool, SourceError>;

    /// Reads the file's contents as UTF-8 text, byte-exact.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] for a missing file and
    /// [`SourceError::Io`] when the file cannot be read as text.
    fn read_to_string(&self, path: &str) -> Result<String, SourceError>;
}

// ============================================================================
// SECTION: Schema Probe
// ============================================================================

/// Database schema probe errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A table or column name failed identifier validation.
    #[error("invalid identifier: {name}")]
    InvalidIdentifier {
        /// Offending identifier.
        name: String,
    },
    /// The queried table is absent from the schema catalog.
    #[error("table not found: {table}")]
    MissingTable {
        /// Name of the missing table.
        table: String,
    },
    /// The database reported an error while executing a query.
    #[error("database error: {0}")]
    Db(String),
    /// The database could not be opened.
    #[error("database unavailable: {0}")]
    Unavailable(String),
}

/// Read-only probe over one open database.
///
/// A probe is the group-scoped resource of the run: the runtime opens one
/// per check group and releases it when the group ends.
pub trait SchemaProbe {
    /// Returns true when the schema catalog contains the table
    /// (case-sensitive exact match).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the identifier is invalid or the
    /// catalog cannot be queried.
    fn table_exists(&self, table: &str) -> Result<bool, SchemaError>;

    /// Returns true when the table's column list contains the column.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingTable`] when the table is absent and
    /// [`SchemaError`] when the column list cannot be queried.
    fn column_exists(&self, table: &str, column: &str) -> Result<bool, SchemaError>;

    /// Returns true when at least one row matches every predicate term.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingTable`] when the table is absent and
    /// [`SchemaError`] when the query cannot be executed.
    fn row_exists(&self, table: &str, predicate: &[PredicateTerm]) -> Result<bool, SchemaError>;
}

/// Factory opening one schema probe per check group.
pub trait SchemaProbeSource {
    /// Opens a read-only probe for the database file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unavailable`] when the database cannot be
    /// opened.
    fn open(&self, database: &Path) -> Result<Box<dyn SchemaProbe>, SchemaError>;
}
