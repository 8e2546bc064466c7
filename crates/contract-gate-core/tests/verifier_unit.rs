// crates/contract-gate-core/tests/verifier_unit.rs
// ============================================================================
// Module: Verifier Unit Tests
// Description: Evaluation and classification coverage for the verifier.
// Purpose: Validate verdict taxonomy, ordering, and group independence.
// ============================================================================

//! ## Overview
//! Unit-level tests for verifier behavior:
//! - File check taxonomy (missing vs mismatching vs unreadable)
//! - Substring presence/absence mutual exclusivity
//! - Path rejection fails closed without touching the filesystem
//! - Schema check classification through stub probes
//! - Group independence when a database cannot be opened

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

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use contract_gate_core::CheckGroup;
use contract_gate_core::CheckId;
use contract_gate_core::CheckKind;
use contract_gate_core::CheckResult;
use contract_gate_core::CheckSpec;
use contract_gate_core::FailureKind;
use contract_gate_core::GroupId;
use contract_gate_core::InMemorySourceProbe;
use contract_gate_core::PredicateTerm;
use contract_gate_core::Report;
use contract_gate_core::SchemaError;
use contract_gate_core::SchemaProbe;
use contract_gate_core::SchemaProbeSource;
use contract_gate_core::Verdict;
use contract_gate_core::Verifier;

// ============================================================================
// SECTION: Stub Schema Probes
// ============================================================================

/// Schema probe over a static table/column map.
#[derive(Debug, Default, Clone)]
struct StubSchemaProbe {
    tables: BTreeMap<String, Vec<String>>,
}

impl StubSchemaProbe {
    fn with_table(mut self, table: &str, columns: &[&str]) -> Self {
        self.tables.insert(table.to_owned(), columns.iter().map(ToString::to_string).collect());
        self
    }
}

impl SchemaProbe for StubSchemaProbe {
    fn table_exists(&self, table: &str) -> Result<bool, SchemaError> {
        Ok(self.tables.contains_key(table))
    }

    fn column_exists(&self, table: &str, column: &str) -> Result<bool, SchemaError> {
        let Some(columns) = self.tables.get(table) else {
            return Err(SchemaError::MissingTable {
                table: table.to_owned(),
            });
        };
        Ok(columns.iter().any(|candidate| candidate == column))
    }

    fn row_exists(&self, table: &str, _predicate: &[PredicateTerm]) -> Result<bool, SchemaError> {
        if self.tables.contains_key(table) {
            Ok(false)
        } else {
            Err(SchemaError::MissingTable {
                table: table.to_owned(),
            })
        }
    }
}

/// Probe source handing out clones of one stub probe.
#[derive(Debug, Clone)]
struct StubProbeSource {
    probe: StubSchemaProbe,
}

impl SchemaProbeSource for StubProbeSource {
    fn open(&self, _database: &Path) -> Result<Box<dyn SchemaProbe>, SchemaError> {
        Ok(Box::new(self.probe.clone()))
    }
}

/// Probe source that always fails to open, as a broken database would.
#[derive(Debug, Clone, Copy)]
struct FailingProbeSource;

impl SchemaProbeSource for FailingProbeSource {
    fn open(&self, database: &Path) -> Result<Box<dyn SchemaProbe>, SchemaError> {
        Err(SchemaError::Unavailable(format!("cannot open {}", database.display())))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn check(id: &str, kind: CheckKind) -> CheckSpec {
    CheckSpec {
        check_id: CheckId::new(id),
        description: format!("check {id}"),
        kind,
    }
}

fn file_group(checks: Vec<CheckSpec>) -> CheckGroup {
    CheckGroup {
        group_id: GroupId::new("files"),
        description: "file checks".to_owned(),
        database: None,
        checks,
    }
}

fn db_group(id: &str, checks: Vec<CheckSpec>) -> CheckGroup {
    CheckGroup {
        group_id: GroupId::new(id),
        description: format!("group {id}"),
        database: Some(PathBuf::from("data/app.db")),
        checks,
    }
}

fn run_files(probe: &InMemorySourceProbe, checks: Vec<CheckSpec>) -> Report {
    let schemas = StubProbeSource {
        probe: StubSchemaProbe::default(),
    };
    Verifier::new(probe, &schemas).run(&[file_group(checks)])
}

fn failure_of(result: &CheckResult) -> FailureKind {
    match result.verdict {
        Verdict::Fail {
            failure,
        } => failure,
        Verdict::Pass => panic!("expected {} to fail", result.check_id),
    }
}

// ============================================================================
// SECTION: File Checks
// ============================================================================

#[test]
fn file_exists_passes_and_missing_file_is_a_missing_artifact() {
    let probe = InMemorySourceProbe::new().with_file("src/database.js", "module.exports = {}");
    let report = run_files(
        &probe,
        vec![
            check("present", CheckKind::FileExists {
                path: "src/database.js".to_owned(),
            }),
            check("absent", CheckKind::FileExists {
                path: "src/missing.js".to_owned(),
            }),
        ],
    );

    assert!(report.results()[0].verdict.is_pass());
    assert_eq!(failure_of(&report.results()[1]), FailureKind::MissingArtifact);
}

#[test]
fn file_contains_finds_verbatim_substring() {
    let probe = InMemorySourceProbe::new()
        .with_file("src/database.js", "db.exec(`CREATE TABLE IF NOT EXISTS users (id INTEGER)`);");
    let report = run_files(
        &probe,
        vec![check("users-table", CheckKind::FileContains {
            path: "src/database.js".to_owned(),
            needle: "CREATE TABLE IF NOT EXISTS users".to_owned(),
        })],
    );

    assert!(report.all_passed());
}

#[test]
fn file_contains_mismatch_names_the_missing_needle() {
    let probe = InMemorySourceProbe::new()
        .with_file("src/database.js", "CREATE TABLE IF NOT EXISTS users");
    let report = run_files(
        &probe,
        vec![check("admins-table", CheckKind::FileContains {
            path: "src/database.js".to_owned(),
            needle: "CREATE TABLE IF NOT EXISTS admins".to_owned(),
        })],
    );

    let result = &report.results()[0];
    assert_eq!(failure_of(result), FailureKind::ContentMismatch);
    let message = result.message.as_deref().unwrap();
    assert!(message.contains("admins"), "message must name the needle: {message}");
}

#[test]
fn file_contains_on_missing_file_is_a_missing_artifact() {
    let probe = InMemorySourceProbe::new();
    let report = run_files(
        &probe,
        vec![check("gone", CheckKind::FileContains {
            path: "src/gone.js".to_owned(),
            needle: "anything".to_owned(),
        })],
    );

    assert_eq!(failure_of(&report.results()[0]), FailureKind::MissingArtifact);
}

#[test]
fn contains_and_not_contains_are_mutually_exclusive_on_existing_files() {
    let probe = InMemorySourceProbe::new().with_file("src/renderer.js", "alert('nope')");
    for needle in ["alert(", "showErrorWithAnimation"] {
        let report = run_files(
            &probe,
            vec![
                check("present", CheckKind::FileContains {
                    path: "src/renderer.js".to_owned(),
                    needle: needle.to_owned(),
                }),
                check("absent", CheckKind::FileNotContains {
                    path: "src/renderer.js".to_owned(),
                    needle: needle.to_owned(),
                }),
            ],
        );
        let outcomes: Vec<bool> =
            report.results().iter().map(|result| result.verdict.is_pass()).collect();
        assert_eq!(outcomes.iter().filter(|passed| **passed).count(), 1, "needle: {needle}");
    }
}

#[test]
fn escaping_paths_are_rejected_without_filesystem_access() {
    let probe = InMemorySourceProbe::new();
    let report = run_files(
        &probe,
        vec![
            check("dotdot", CheckKind::FileExists {
                path: "../etc/passwd".to_owned(),
            }),
            check("absolute", CheckKind::FileContains {
                path: "/etc/passwd".to_owned(),
                needle: "root".to_owned(),
            }),
        ],
    );

    for result in report.results() {
        assert_eq!(failure_of(result), FailureKind::ResourceUnavailable);
    }
}

#[test]
fn html_element_id_accepts_both_quote_styles() {
    let probe = InMemorySourceProbe::new()
        .with_file("views/index.html", "<div id=\"loginScreen\"></div><div id='mainApp'></div>");
    let report = run_files(
        &probe,
        vec![
            check("login", CheckKind::HtmlElementId {
                path: "views/index.html".to_owned(),
                element_id: "loginScreen".to_owned(),
            }),
            check("main", CheckKind::HtmlElementId {
                path: "views/index.html".to_owned(),
                element_id: "mainApp".to_owned(),
            }),
            check("missing", CheckKind::HtmlElementId {
                path: "views/index.html".to_owned(),
                element_id: "modalContainer".to_owned(),
            }),
        ],
    );

    assert!(report.results()[0].verdict.is_pass());
    assert!(report.results()[1].verdict.is_pass());
    assert_eq!(failure_of(&report.results()[2]), FailureKind::MissingArtifact);
}

// ============================================================================
// SECTION: Schema Checks
// ============================================================================

#[test]
fn schema_checks_classify_missing_tables_and_columns() {
    let probe = InMemorySourceProbe::new();
    let schemas = StubProbeSource {
        probe: StubSchemaProbe::default().with_table("sessions", &["id", "user_id", "token"]),
    };
    let verifier = Verifier::new(&probe, &schemas);
    let report = verifier.run(&[db_group("db", vec![
        check("sessions", CheckKind::TableExists {
            table: "sessions".to_owned(),
        }),
        check("audits", CheckKind::TableExists {
            table: "audits".to_owned(),
        }),
        check("token", CheckKind::ColumnExists {
            table: "sessions".to_owned(),
            column: "token".to_owned(),
        }),
        check("revoked", CheckKind::ColumnExists {
            table: "sessions".to_owned(),
            column: "revoked".to_owned(),
        }),
        check("orphan-column", CheckKind::ColumnExists {
            table: "audits".to_owned(),
            column: "id".to_owned(),
        }),
    ])]);

    assert!(report.results()[0].verdict.is_pass());
    assert_eq!(failure_of(&report.results()[1]), FailureKind::MissingArtifact);
    assert!(report.results()[2].verdict.is_pass());
    assert_eq!(failure_of(&report.results()[3]), FailureKind::MissingArtifact);
    assert_eq!(failure_of(&report.results()[4]), FailureKind::MissingArtifact);
}

#[test]
fn schema_check_without_database_is_unavailable() {
    let probe = InMemorySourceProbe::new();
    let schemas = StubProbeSource {
        probe: StubSchemaProbe::default(),
    };
    let verifier = Verifier::new(&probe, &schemas);
    let report = verifier.run(&[file_group(vec![check("stray", CheckKind::TableExists {
        table: "users".to_owned(),
    })])]);

    assert_eq!(failure_of(&report.results()[0]), FailureKind::ResourceUnavailable);
}

// ============================================================================
// SECTION: Group Independence
// ============================================================================

#[test]
fn broken_database_fails_its_group_and_spares_the_rest() {
    let probe = InMemorySourceProbe::new().with_file("src/main.js", "app.whenReady()");
    let schemas = FailingProbeSource;
    let verifier = Verifier::new(&probe, &schemas);
    let report = verifier.run(&[
        db_group("broken", vec![
            check("t-1", CheckKind::TableExists {
                table: "users".to_owned(),
            }),
            check("f-1", CheckKind::FileExists {
                path: "src/main.js".to_owned(),
            }),
            check("t-2", CheckKind::ColumnExists {
                table: "users".to_owned(),
                column: "id".to_owned(),
            }),
        ]),
        file_group(vec![check("f-2", CheckKind::FileContains {
            path: "src/main.js".to_owned(),
            needle: "whenReady".to_owned(),
        })]),
    ]);

    assert_eq!(failure_of(&report.results()[0]), FailureKind::ResourceUnavailable);
    assert!(report.results()[1].verdict.is_pass(), "file checks evaluate despite the broken db");
    assert_eq!(failure_of(&report.results()[2]), FailureKind::ResourceUnavailable);
    assert!(report.results()[3].verdict.is_pass(), "later groups run normally");
    assert_eq!(report.summary_line(), "2/4 checks passed");
}

#[test]
fn report_order_matches_declaration_order_across_groups() {
    let probe = InMemorySourceProbe::new().with_file("a.txt", "a");
    let schemas = StubProbeSource {
        probe: StubSchemaProbe::default().with_table("users", &["id"]),
    };
    let verifier = Verifier::new(&probe, &schemas);
    let report = verifier.run(&[
        file_group(vec![
            check("first", CheckKind::FileExists {
                path: "a.txt".to_owned(),
            }),
            check("second", CheckKind::FileExists {
                path: "b.txt".to_owned(),
            }),
        ]),
        db_group("db", vec![check("third", CheckKind::TableExists {
            table: "users".to_owned(),
        })]),
    ]);

    let ids: Vec<&str> = report.results().iter().map(|result| result.check_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn evaluating_twice_yields_the_same_results() {
    let probe = InMemorySourceProbe::new().with_file("src/app.js", "function navigateTo()");
    let schemas = StubProbeSource {
        probe: StubSchemaProbe::default(),
    };
    let verifier = Verifier::new(&probe, &schemas);
    let groups = vec![file_group(vec![
        check("nav", CheckKind::FileContains {
            path: "src/app.js".to_owned(),
            needle: "function navigateTo".to_owned(),
        }),
        check("gone", CheckKind::FileExists {
            path: "src/gone.js".to_owned(),
        }),
    ])];

    let first = verifier.run(&groups);
    let second = verifier.run(&groups);
    assert_eq!(first, second);
}
