// crates/contract-gate-sqlite/src/lib.rs
// ============================================================================
// Module: Contract Gate SQLite Probe Library
// Description: Public API surface for the SQLite schema probe.
// Purpose: Expose the read-only probe, its source, and its configuration.
// Dependencies: crate::probe
// ============================================================================

//! ## Overview
//! `SQLite`-backed implementation of the Contract Gate [`SchemaProbe`]
//! interface. Connections are read-only; the database under verification is
//! never mutated.
//!
//! [`SchemaProbe`]: contract_gate_core::SchemaProbe

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod probe;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use probe::MAX_PREDICATE_TERMS;
pub use probe::SqliteProbeConfig;
pub use probe::SqliteProbeError;
pub use probe::SqliteProbeSource;
pub use probe::SqliteSchemaProbe;
pub use probe::validate_identifier;
