// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Explicit registry of discovered cases.
//!
//! The registry is built once from the case directory and maps each id to
//! its case file. Running it executes every selected case independently and
//! in id order: one failing case never stops the others.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, instrument, warn};

use crate::case::{CaseEntry, TestCaseDescriptor, discover_cases, load_case};
use crate::error::{HarnessError, Result};
use crate::harness::{Harness, Outcome};

/// What a run does with each case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compare current output against the golden snapshots.
    Compare,
    /// Overwrite the golden snapshots with current output.
    Regenerate,
}

/// A case file known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCase {
    entry: CaseEntry,
}

impl RegisteredCase {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.entry.path
    }

    /// Loads the descriptor, or the reason it cannot be loaded.
    ///
    /// # Errors
    ///
    /// See [`load_case`].
    pub fn load(&self) -> Result<TestCaseDescriptor> {
        load_case(&self.entry.path)
    }
}

/// Final state of one case in a run.
#[derive(Debug)]
pub enum CaseStatus {
    Passed,
    Regenerated,
    Mismatch { expected: String, actual: String },
    Failed(HarnessError),
}

impl CaseStatus {
    /// `true` for [`CaseStatus::Passed`] and [`CaseStatus::Regenerated`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed | Self::Regenerated)
    }
}

#[derive(Debug)]
pub struct CaseReport {
    pub id: String,
    pub status: CaseStatus,
}

/// One [`CaseReport`] per executed case, in execution order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Passed))
    }

    #[must_use]
    pub fn regenerated(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Regenerated))
    }

    #[must_use]
    pub fn mismatched(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Mismatch { .. }))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Failed(_)))
    }

    /// `true` if no case mismatched or failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.cases.iter().all(|c| c.status.is_success())
    }

    fn count(&self, predicate: impl Fn(&CaseStatus) -> bool) -> usize {
        self.cases.iter().filter(|c| predicate(&c.status)).count()
    }
}

/// Ordered map from case id to case file.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    dir: Utf8PathBuf,
    cases: BTreeMap<String, RegisteredCase>,
}

impl Registry {
    /// Builds the registry from the case files in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] if the directory cannot be read.
    #[instrument]
    pub fn discover(dir: &Utf8Path) -> Result<Self> {
        let cases = discover_cases(dir)?
            .into_iter()
            .map(|entry| (entry.id.clone(), RegisteredCase { entry }))
            .collect::<BTreeMap<_, _>>();
        if cases.is_empty() {
            warn!("No case files found in '{dir}'");
        }
        Ok(Self {
            dir: dir.to_owned(),
            cases,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RegisteredCase> {
        self.cases.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Runs the selected cases (all cases if `selection` is empty).
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnknownCase`] before running anything if a
    /// selected id is not registered. Per-case failures end up in the report.
    pub fn run(&self, harness: &Harness, mode: Mode, selection: &[String]) -> Result<RunReport> {
        self.run_with(harness, mode, selection, |_| {})
    }

    /// Like [`Registry::run`], calling `on_case` as each case finishes.
    ///
    /// # Errors
    ///
    /// See [`Registry::run`].
    #[instrument(skip_all, fields(mode = ?mode, selected = selection.len()))]
    pub fn run_with(
        &self,
        harness: &Harness,
        mode: Mode,
        selection: &[String],
        mut on_case: impl FnMut(&CaseReport),
    ) -> Result<RunReport> {
        let selected = self.select(selection)?;

        let mut report = RunReport::default();
        for case in selected {
            let case_report = CaseReport {
                id: case.id().to_string(),
                status: run_case(harness, mode, case),
            };
            on_case(&case_report);
            report.cases.push(case_report);
        }

        info!(
            total = report.cases.len(),
            passed = report.passed(),
            regenerated = report.regenerated(),
            mismatched = report.mismatched(),
            failed = report.failed(),
            "Run finished"
        );
        Ok(report)
    }

    fn select(&self, selection: &[String]) -> Result<Vec<&RegisteredCase>> {
        if selection.is_empty() {
            return Ok(self.cases.values().collect());
        }

        if let Some(unknown) = selection.iter().find(|id| !self.cases.contains_key(*id)) {
            return Err(HarnessError::UnknownCase {
                id: unknown.clone(),
            });
        }
        Ok(self
            .cases
            .values()
            .filter(|case| selection.iter().any(|id| id == case.id()))
            .collect())
    }
}

fn run_case(harness: &Harness, mode: Mode, case: &RegisteredCase) -> CaseStatus {
    let result = case.load().and_then(|descriptor| match mode {
        Mode::Compare => harness.compare(&descriptor).map(|outcome| match outcome {
            Outcome::Pass => CaseStatus::Passed,
            Outcome::Mismatch { expected, actual } => CaseStatus::Mismatch { expected, actual },
        }),
        Mode::Regenerate => harness
            .regenerate(&descriptor)
            .map(|()| CaseStatus::Regenerated),
    });
    result.unwrap_or_else(CaseStatus::Failed)
}
