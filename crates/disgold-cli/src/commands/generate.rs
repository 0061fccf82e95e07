// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `disgold generate [IDS...]`: overwrite golden snapshots with the current
//! disassembly.
//!
//! A failing case keeps its previous snapshot and does not stop the others.

use std::time::Instant;

use disgold_core::registry::{CaseReport, CaseStatus, Mode};
use miette::{Report, Result};
use tracing::instrument;

use super::prepare;
use crate::config::Settings;

#[instrument(skip_all, fields(selected = ids.len()))]
pub fn run(settings: &Settings, ids: &[String]) -> Result<()> {
    let start_time = Instant::now();
    let (registry, harness) = prepare(settings)?;

    println!(
        "Regenerating goldens in '{}' ({})",
        settings.goldens_dir, settings.strategy
    );
    let report = registry.run_with(&harness, Mode::Regenerate, ids, print_case_line)?;
    let elapsed_secs = start_time.elapsed().as_secs_f64();

    let total = report.cases.len();
    let regenerated = report.regenerated();
    let failed = report.failed();

    for case in report.cases {
        if let CaseStatus::Failed(error) = case.status {
            eprintln!();
            eprintln!("{:?}", Report::new(error).wrap_err(format!("Case '{}' failed", case.id)));
        }
    }

    println!();
    let summary = format!("{total} case(s), {regenerated} regenerated, {failed} failed ({elapsed_secs:.1}s)");
    if failed == 0 {
        println!("{summary}");
        Ok(())
    } else {
        eprintln!("{summary}");
        miette::bail!("{failed} case(s) could not be regenerated");
    }
}

fn print_case_line(case: &CaseReport) {
    let verdict = if case.status.is_success() {
        "regenerated ✓"
    } else {
        "FAILED ✗"
    };
    println!("  {}: {verdict}", case.id);
}
