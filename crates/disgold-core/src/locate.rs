// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Artifact resolution.
//!
//! A case names its object file with a glob-style pattern relative to the
//! search root. The pattern is anchored at any depth (`**/<pattern>`) and
//! must match exactly one file. Ambiguity is reported, never resolved.

use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::error::{HarnessError, Result};

/// `*` and `?` stay within one path component and skip dot-files, as in a
/// shell glob.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Resolves `pattern` to the single file under `root` that matches it.
///
/// Every regular file below `root` is matched by its root-relative path
/// (`/`-separated) against `**/<pattern>`.
///
/// # Errors
///
/// - [`HarnessError::InvalidPattern`] if the pattern is not a valid glob
/// - [`HarnessError::ArtifactNotFound`] if nothing matches
/// - [`HarnessError::ArtifactAmbiguous`] if more than one file matches
/// - [`HarnessError::Io`] if the tree cannot be walked
#[instrument(skip_all, fields(pattern = %pattern, root = %root))]
pub fn locate_artifact(pattern: &str, root: &Utf8Path) -> Result<Utf8PathBuf> {
    let candidates = find_matches(pattern, root)?;

    match <[Utf8PathBuf; 1]>::try_from(candidates) {
        Ok([artifact]) => {
            debug!("Resolved artifact '{artifact}'");
            Ok(artifact)
        }
        Err(candidates) if candidates.is_empty() => Err(HarnessError::ArtifactNotFound {
            pattern: pattern.to_string(),
            root: root.to_owned(),
        }),
        Err(candidates) => Err(HarnessError::ArtifactAmbiguous {
            pattern: pattern.to_string(),
            root: root.to_owned(),
            candidates,
        }),
    }
}

/// Returns every file under `root` matching `**/<pattern>`, in traversal
/// order (sorted by file name at each level).
///
/// # Errors
///
/// Returns [`HarnessError::InvalidPattern`] for a bad pattern and
/// [`HarnessError::Io`] if the tree cannot be walked.
pub fn find_matches(pattern: &str, root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let anchored = format!("**/{}", pattern.trim_start_matches("./"));
    let matcher = Pattern::new(&anchored).map_err(|e| HarnessError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.msg.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| HarnessError::Io {
            path: e
                .path()
                .and_then(Utf8Path::from_path)
                .map_or_else(|| root.to_owned(), Utf8Path::to_path_buf),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        // Non-UTF-8 paths cannot match a UTF-8 pattern.
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };

        let relative = relative
            .components()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/");
        if matcher.matches_with(&relative, MATCH_OPTIONS) {
            matches.push(path.to_path_buf());
        }
    }

    Ok(matches)
}
