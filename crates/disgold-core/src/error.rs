// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for the disassembly harness.
//!
//! Every variant is fatal for the case that raised it and never for the
//! whole run. A golden mismatch is not an error: it is reported through
//! [`crate::harness::Outcome::Mismatch`].

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while loading, rendering or storing a test case.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// The case definition has the wrong shape.
    #[error("malformed case '{id}': {reason}")]
    #[diagnostic(
        code(disgold::malformed_case),
        help("a case file defines `obj = \"<pattern>\"` and `syms = [\"<symbol>\", ...]`")
    )]
    MalformedCase {
        /// Case id (file stem).
        id: String,
        /// What is wrong with the definition.
        reason: String,
    },

    /// The artifact pattern is not a valid glob.
    #[error("invalid artifact pattern '{pattern}': {reason}")]
    #[diagnostic(code(disgold::invalid_pattern))]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// No file under the search root matches the pattern.
    #[error("no artifact matching '{pattern}' under '{root}'")]
    #[diagnostic(
        code(disgold::artifact_not_found),
        help("build the artifact first, or point --root at the build directory")
    )]
    ArtifactNotFound {
        /// Artifact pattern from the case file.
        pattern: String,
        /// Search root.
        root: Utf8PathBuf,
    },

    /// More than one file matches the pattern.
    #[error(
        "artifact pattern '{pattern}' is ambiguous under '{root}': {}",
        join_paths(.candidates)
    )]
    #[diagnostic(
        code(disgold::artifact_ambiguous),
        help("add leading directories to the `obj` pattern until it matches a single file")
    )]
    ArtifactAmbiguous {
        /// Artifact pattern from the case file.
        pattern: String,
        /// Search root.
        root: Utf8PathBuf,
        /// Every matching path, in traversal order.
        candidates: Vec<Utf8PathBuf>,
    },

    /// The disassembler executable could not be run at all.
    #[error("{tool} is not available: {reason}")]
    #[diagnostic(code(disgold::tool_unavailable))]
    ToolUnavailable {
        /// Program name or path.
        tool: String,
        /// Why the probe failed.
        reason: String,
        /// Installation instructions.
        #[help]
        hint: String,
    },

    /// The disassembler ran but did not produce usable output.
    #[error("{tool} failed on '{artifact}': {reason}")]
    #[diagnostic(code(disgold::disassembly_invocation))]
    DisassemblyInvocation {
        /// Program name or path.
        tool: String,
        /// Artifact being disassembled.
        artifact: Utf8PathBuf,
        /// What went wrong.
        reason: InvocationFailure,
    },

    /// Batch extraction found no region for some requested symbols.
    #[error("no disassembly found for {} in '{artifact}'", .missing.join(", "))]
    #[diagnostic(
        code(disgold::symbols_not_found),
        help("symbols are matched against the demangled `<name>:` labels printed by the disassembler")
    )]
    SymbolsNotFound {
        /// Artifact being disassembled.
        artifact: Utf8PathBuf,
        /// Requested symbols without a region.
        missing: Vec<String>,
    },

    /// An address-column line did not carry a symbol-offset annotation.
    #[error("unexpected disassembly layout, expected `<` after the address column: {line:?}")]
    #[diagnostic(code(disgold::unexpected_layout))]
    UnexpectedLayout {
        /// The offending line (tabs expanded).
        line: String,
    },

    /// Comparison requested for a case without a stored snapshot.
    #[error("no golden snapshot for case '{id}' at '{path}'")]
    #[diagnostic(
        code(disgold::golden_missing),
        help("run `disgold generate` to create it")
    )]
    GoldenMissing {
        /// Case id.
        id: String,
        /// Expected snapshot location.
        path: Utf8PathBuf,
    },

    /// The snapshot could not be written.
    #[error("failed to write golden snapshot for case '{id}' to '{path}'")]
    #[diagnostic(code(disgold::golden_write))]
    GoldenWrite {
        /// Case id.
        id: String,
        /// Snapshot location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A selected case id was not discovered.
    #[error("unknown case '{id}'")]
    #[diagnostic(code(disgold::unknown_case))]
    UnknownCase {
        /// The selected id.
        id: String,
    },

    /// Any other filesystem failure.
    #[error("I/O error at '{path}'")]
    #[diagnostic(code(disgold::io))]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Why a disassembler invocation failed.
#[derive(Debug, Error)]
pub enum InvocationFailure {
    /// The executable is not on `PATH`.
    #[error("executable not found")]
    NotFound,

    /// Spawning or talking to the process failed.
    #[error("{0}")]
    Io(io::Error),

    /// The process exited unsuccessfully.
    #[error("{status}: {stderr}")]
    Exit {
        /// Exit status.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The process did not finish within the configured timeout.
    #[error("timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    /// Standard output was not valid UTF-8.
    #[error("output is not valid UTF-8")]
    NonUtf8,
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
