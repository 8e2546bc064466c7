// crates/contract-gate-sqlite/src/probe.rs
// ============================================================================
// Module: SQLite Schema Probe
// Description: Read-only SchemaProbe implementation over rusqlite.
// Purpose: Answer table/column/row checks without mutating the database.
// Dependencies: contract-gate-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`SchemaProbe`] over a read-only `SQLite`
//! connection. Table and column names arrive from untrusted manifests, so
//! every identifier passes strict validation before it can reach a query;
//! predicate values always bind as parameters, never as SQL text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::time::Duration;

use contract_gate_core::PredicateTerm;
use contract_gate_core::PredicateValue;
use contract_gate_core::SchemaError;
use contract_gate_core::SchemaProbe;
use contract_gate_core::SchemaProbeSource;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::types::Value;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a table or column identifier.
const MAX_IDENTIFIER_LENGTH: usize = 128;
/// Maximum number of terms in a row predicate.
pub const MAX_PREDICATE_TERMS: usize = 16;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for `SQLite` probe connections.
///
/// # Invariants
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SqliteProbeConfig {
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for SqliteProbeConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Returns the default busy timeout for probe connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` probe errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteProbeError {
    /// The database file could not be opened read-only.
    #[error("sqlite probe open error: {0}")]
    Open(String),
    /// A query failed against an open connection.
    #[error("sqlite probe db error: {0}")]
    Db(String),
}

impl From<SqliteProbeError> for SchemaError {
    fn from(err: SqliteProbeError) -> Self {
        match err {
            SqliteProbeError::Open(message) => Self::Unavailable(message),
            SqliteProbeError::Db(message) => Self::Db(message),
        }
    }
}

// ============================================================================
// SECTION: Identifier Validation
// ============================================================================

/// Validates a table or column identifier from an untrusted manifest.
///
/// Accepts ASCII letters, digits, and underscores; the first character must
/// not be a digit. Anything else is rejected before query construction, so
/// manifest identifiers can never splice SQL.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidIdentifier`] when the name is rejected.
pub fn validate_identifier(name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(SchemaError::InvalidIdentifier {
            name: name.to_owned(),
        });
    };
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(SchemaError::InvalidIdentifier {
            name: name.to_owned(),
        });
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(SchemaError::InvalidIdentifier {
            name: name.to_owned(),
        });
    }
    if chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            name: name.to_owned(),
        })
    }
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Read-only schema probe over one `SQLite` database file.
///
/// # Invariants
/// - The connection is opened read-only; the probe never mutates the
///   database.
#[derive(Debug)]
pub struct SqliteSchemaProbe {
    /// Open read-only connection.
    connection: Connection,
}

impl SqliteSchemaProbe {
    /// Opens a read-only probe with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteProbeError::Open`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SqliteProbeError> {
        Self::open_with_config(path, SqliteProbeConfig::default())
    }

    /// Opens a read-only probe with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteProbeError::Open`] when the file cannot be opened.
    pub fn open_with_config(
        path: &Path,
        config: SqliteProbeConfig,
    ) -> Result<Self, SqliteProbeError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(path, flags)
            .map_err(|err| SqliteProbeError::Open(format!("{}: {err}", path.display())))?;
        connection
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|err| SqliteProbeError::Open(err.to_string()))?;
        Ok(Self {
            connection,
        })
    }

    /// Queries the schema catalog for an exact table name.
    fn catalog_table(&self, table: &str) -> Result<bool, SqliteProbeError> {
        let name: Option<String> = self
            .connection
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteProbeError::Db(err.to_string()))?;
        // Compare byte-exactly so the contract stays case-sensitive
        // regardless of catalog collation.
        Ok(name.as_deref() == Some(table))
    }
}

impl SchemaProbe for SqliteSchemaProbe {
    fn table_exists(&self, table: &str) -> Result<bool, SchemaError> {
        validate_identifier(table)?;
        Ok(self.catalog_table(table)?)
    }

    fn column_exists(&self, table: &str, column: &str) -> Result<bool, SchemaError> {
        validate_identifier(table)?;
        validate_identifier(column)?;
        if !self.catalog_table(table).map_err(SchemaError::from)? {
            return Err(SchemaError::MissingTable {
                table: table.to_owned(),
            });
        }
        let name: Option<String> = self
            .connection
            .query_row(
                "SELECT name FROM pragma_table_info(?1) WHERE name = ?2",
                params![table, column],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SchemaError::Db(err.to_string()))?;
        Ok(name.as_deref() == Some(column))
    }

    fn row_exists(&self, table: &str, predicate: &[PredicateTerm]) -> Result<bool, SchemaError> {
        validate_identifier(table)?;
        for term in predicate {
            validate_identifier(&term.column)?;
        }
        if predicate.is_empty() || predicate.len() > MAX_PREDICATE_TERMS {
            return Err(SchemaError::Db(format!(
                "predicate must carry between 1 and {MAX_PREDICATE_TERMS} terms"
            )));
        }
        if !self.catalog_table(table).map_err(SchemaError::from)? {
            return Err(SchemaError::MissingTable {
                table: table.to_owned(),
            });
        }
        // IS instead of = so null terms match stored NULLs.
        let clauses = predicate
            .iter()
            .enumerate()
            .map(|(index, term)| format!("\"{}\" IS ?{}", term.column, index + 1))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!("SELECT EXISTS(SELECT 1 FROM \"{table}\" WHERE {clauses})");
        let values = predicate.iter().map(|term| bind_value(&term.equals));
        let exists: i64 = self
            .connection
            .query_row(&sql, rusqlite::params_from_iter(values), |row| row.get(0))
            .map_err(|err| SchemaError::Db(err.to_string()))?;
        Ok(exists != 0)
    }
}

/// Converts a predicate value into an owned `SQLite` parameter value.
fn bind_value(value: &PredicateValue) -> Value {
    match value {
        PredicateValue::Boolean(flag) => Value::Integer(i64::from(*flag)),
        PredicateValue::Integer(number) => Value::Integer(*number),
        PredicateValue::Real(number) => Value::Real(*number),
        PredicateValue::Text(text) => Value::Text(text.clone()),
        PredicateValue::Null => Value::Null,
    }
}

// ============================================================================
// SECTION: Probe Source
// ============================================================================

/// Factory opening one read-only probe per check group.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteProbeSource {
    /// Connection configuration shared by every opened probe.
    config: SqliteProbeConfig,
}

impl SqliteProbeSource {
    /// Creates a probe source with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a probe source with the given configuration.
    #[must_use]
    pub const fn with_config(config: SqliteProbeConfig) -> Self {
        Self {
            config,
        }
    }
}

impl SchemaProbeSource for SqliteProbeSource {
    fn open(&self, database: &Path) -> Result<Box<dyn SchemaProbe>, SchemaError> {
        let probe = SqliteSchemaProbe::open_with_config(database, self.config)
            .map_err(SchemaError::from)?;
        Ok(Box::new(probe))
    }
}
