// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Test case definitions and discovery.
//!
//! A test case is a TOML file named `<id>.toml` in the case directory:
//!
//! ```toml
//! obj = "rlp/encode_disas.o"
//! syms = ["length_length_disas", "encode_length_disas"]
//! ```
//!
//! `obj` is a glob-style pattern resolved under the search root, `syms` the
//! ordered list of symbols to disassemble. Files whose name starts with `_`
//! are shared helpers and are never treated as cases.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use tracing::{debug, warn};

use crate::error::{HarnessError, Result};

/// Extension of case definition files.
pub const CASE_EXTENSION: &str = "toml";

/// Files whose name starts with this marker are skipped during discovery.
pub const EXCLUDE_MARKER: char = '_';

/// On-disk shape of a case file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseFile {
    obj: String,
    syms: Vec<String>,
}

/// A validated test case.
///
/// Built fresh from the case directory on every scan; never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseDescriptor {
    id: String,
    artifact_pattern: String,
    symbols: Vec<String>,
}

impl TestCaseDescriptor {
    /// Creates a descriptor, validating that the pattern and every symbol
    /// are non-blank and that at least one symbol is given. Whitespace-only
    /// values are rejected since they can never match.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MalformedCase`] if validation fails.
    pub fn new(
        id: impl Into<String>,
        artifact_pattern: impl Into<String>,
        symbols: Vec<String>,
    ) -> Result<Self> {
        let id = id.into();
        let artifact_pattern = artifact_pattern.into();
        let malformed = |reason: &str| HarnessError::MalformedCase {
            id: id.clone(),
            reason: reason.to_string(),
        };

        if artifact_pattern.trim().is_empty() {
            return Err(malformed("`obj` must be a non-empty pattern"));
        }
        if symbols.is_empty() {
            return Err(malformed("`syms` must list at least one symbol"));
        }
        if let Some(index) = symbols.iter().position(|s| s.trim().is_empty()) {
            return Err(malformed(&format!("`syms[{index}]` is empty")));
        }

        Ok(Self {
            id,
            artifact_pattern,
            symbols,
        })
    }

    /// Case id, derived from the case file stem.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Glob-style artifact pattern (`obj`).
    #[must_use]
    pub fn artifact_pattern(&self) -> &str {
        &self.artifact_pattern
    }

    /// Symbols to disassemble, in the order given (`syms`).
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

/// Parses case file contents for the case `id`.
///
/// # Errors
///
/// Returns [`HarnessError::MalformedCase`] if the contents are not valid
/// TOML, if `obj` or `syms` is missing or has the wrong type, if an unknown
/// key is present, or if validation fails.
pub fn parse_case(id: &str, content: &str) -> Result<TestCaseDescriptor> {
    let file: CaseFile = toml::from_str(content).map_err(|e| HarnessError::MalformedCase {
        id: id.to_string(),
        reason: e.message().trim().to_string(),
    })?;

    TestCaseDescriptor::new(id, file.obj, file.syms)
}

/// Loads the case file at `path`. The id is the file stem.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] if the file cannot be read and
/// [`HarnessError::MalformedCase`] if its contents are invalid.
pub fn load_case(path: &Utf8Path) -> Result<TestCaseDescriptor> {
    let id = path.file_stem().ok_or_else(|| HarnessError::MalformedCase {
        id: path.to_string(),
        reason: "case file has no name".to_string(),
    })?;

    let content = fs::read_to_string(path).map_err(|source| HarnessError::Io {
        path: path.to_owned(),
        source,
    })?;

    parse_case(id, &content)
}

/// A discovered, not yet loaded, case file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseEntry {
    /// Case id (file stem).
    pub id: String,
    /// Path to the case file.
    pub path: Utf8PathBuf,
}

/// Enumerates the case files directly inside `dir`, sorted by id.
///
/// Case files are not parsed here, so one malformed case never hides the
/// others.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] if the directory cannot be read.
pub fn discover_cases(dir: &Utf8Path) -> Result<Vec<CaseEntry>> {
    let io_err = |source| HarnessError::Io {
        path: dir.to_owned(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            warn!(path = ?entry.path(), "Skipping non-UTF-8 path in case directory");
            continue;
        };

        if !path.is_file() || path.extension() != Some(CASE_EXTENSION) {
            continue;
        }
        let (Some(name), Some(stem)) = (path.file_name(), path.file_stem()) else {
            continue;
        };
        if name.starts_with(EXCLUDE_MARKER) {
            debug!("Skipping helper file '{path}'");
            continue;
        }

        entries.push(CaseEntry {
            id: stem.to_string(),
            path,
        });
    }

    entries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(entries)
}

/// Discovers and loads every case in `dir`.
///
/// Returns one result per discovered case, in id order.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] if the directory cannot be read. Per-case
/// load failures are returned inside the vector.
pub fn load_cases(dir: &Utf8Path) -> Result<Vec<Result<TestCaseDescriptor>>> {
    Ok(discover_cases(dir)?
        .iter()
        .map(|entry| load_case(&entry.path))
        .collect())
}
