// crates/contract-gate-core/src/runtime/source.rs
// ============================================================================
// Module: Contract Gate Source Probes
// Description: Filesystem and in-memory implementations of SourceProbe.
// Purpose: Provide root-scoped, read-only file access with path safety limits.
// Dependencies: crate::interfaces, std
// ============================================================================

//! ## Overview
//! `FsSourceProbe` resolves check paths strictly under a checkout root and
//! fails closed on anything that could escape it. `InMemorySourceProbe`
//! provides the same contract over a static map for tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::interfaces::SourceError;
use crate::interfaces::SourceProbe;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total resolved path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Filesystem Probe
// ============================================================================

/// Read-only filesystem probe rooted at a checkout directory.
///
/// # Invariants
/// - Every access stays under the root; rejected paths never touch the
///   filesystem.
#[derive(Debug, Clone)]
pub struct FsSourceProbe {
    /// Checkout root all check paths resolve under.
    root: PathBuf,
}

impl FsSourceProbe {
    /// Creates a probe rooted at the given checkout directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the checkout root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a relative check path under the root, fail closed.
    fn resolve(&self, path: &str) -> Result<PathBuf, SourceError> {
        validate_relative_path(path)?;
        let resolved = self.root.join(path);
        if resolved.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
            return Err(SourceError::PathRejected {
                path: path.to_owned(),
                reason: format!("resolved path exceeds {MAX_TOTAL_PATH_LENGTH} bytes"),
            });
        }
        Ok(resolved)
    }
}

/// Validates that a check path is relative and cannot escape the root.
fn validate_relative_path(path: &str) -> Result<(), SourceError> {
    if path.is_empty() {
        return Err(SourceError::PathRejected {
            path: path.to_owned(),
            reason: "empty path".to_owned(),
        });
    }
    let candidate = Path::new(path);
    for component in candidate.components() {
        match component {
            Component::Normal(part) => {
                if part.len() > MAX_PATH_COMPONENT_LENGTH {
                    return Err(SourceError::PathRejected {
                        path: path.to_owned(),
                        reason: format!("component exceeds {MAX_PATH_COMPONENT_LENGTH} bytes"),
                    });
                }
            }
            Component::CurDir | Component::ParentDir => {
                return Err(SourceError::PathRejected {
                    path: path.to_owned(),
                    reason: "dot components are not allowed".to_owned(),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(SourceError::PathRejected {
                    path: path.to_owned(),
                    reason: "absolute paths are not allowed".to_owned(),
                });
            }
        }
    }
    Ok(())
}

impl SourceProbe for FsSourceProbe {
    fn file_exists(&self, path: &str) -> Result<bool, SourceError> {
        let resolved = self.resolve(path)?;
        match fs::metadata(&resolved) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(SourceError::Io {
                path: path.to_owned(),
                message: err.to_string(),
            }),
        }
    }

    fn read_to_string(&self, path: &str) -> Result<String, SourceError> {
        let resolved = self.resolve(path)?;
        match fs::read_to_string(&resolved) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(SourceError::NotFound {
                path: path.to_owned(),
            }),
            Err(err) => Err(SourceError::Io {
                path: path.to_owned(),
                message: err.to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: In-Memory Probe
// ============================================================================

/// In-memory source probe for tests and local demos.
///
/// # Invariants
/// - Applies the same path validation as the filesystem probe so tests
///   exercise identical rejection behavior.
#[derive(Debug, Default, Clone)]
pub struct InMemorySourceProbe {
    /// File contents keyed by relative path.
    files: BTreeMap<String, String>,
}

impl InMemorySourceProbe {
    /// Creates an empty in-memory probe.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    /// Adds a file to the probe, replacing any previous contents.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Adds a file and returns the probe, for fluent test setup.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl SourceProbe for InMemorySourceProbe {
    fn file_exists(&self, path: &str) -> Result<bool, SourceError> {
        validate_relative_path(path)?;
        Ok(self.files.contains_key(path))
    }

    fn read_to_string(&self, path: &str) -> Result<String, SourceError> {
        validate_relative_path(path)?;
        self.files.get(path).cloned().ok_or_else(|| SourceError::NotFound {
            path: path.to_owned(),
        })
    }
}
