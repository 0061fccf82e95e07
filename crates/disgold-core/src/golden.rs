// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Golden snapshot storage.
//!
//! One plain-text `<id>.dis` file per case. Snapshots are read during
//! comparison and overwritten wholesale during regeneration.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::{HarnessError, Result};

/// Extension of golden snapshot files.
pub const GOLDEN_EXTENSION: &str = "dis";

/// Directory of golden snapshots.
#[derive(Debug, Clone)]
pub struct GoldenStore {
    dir: Utf8PathBuf,
}

impl GoldenStore {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Path of the snapshot for `id`: `<dir>/<id>.dis`.
    #[must_use]
    pub fn path(&self, id: &str) -> Utf8PathBuf {
        self.dir.join(format!("{id}.{GOLDEN_EXTENSION}"))
    }

    /// Reads the stored snapshot for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::GoldenMissing`] if there is no snapshot and
    /// [`HarnessError::Io`] if it cannot be read.
    pub fn load(&self, id: &str) -> Result<String> {
        let path = self.path(id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(HarnessError::GoldenMissing {
                id: id.to_string(),
                path,
            }),
            Err(source) => Err(HarnessError::Io { path, source }),
        }
    }

    /// Writes `text` as the snapshot for `id`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::GoldenWrite`] if the directory or file cannot
    /// be written.
    pub fn save(&self, id: &str, text: &str) -> Result<()> {
        let path = self.path(id);
        let write_error = |source| HarnessError::GoldenWrite {
            id: id.to_string(),
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_error)?;
        fs::write(&path, text).map_err(write_error)?;
        debug!(%path, bytes = text.len(), "Wrote golden snapshot");
        Ok(())
    }
}
