// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `disgold [IDS...]`: compare current disassembly with the golden snapshots.
//!
//! Prints one line per case as it finishes, then a unified diff for every
//! mismatch and the diagnostic for every failure, then a summary. Exits
//! non-zero if any case mismatched or failed.

use std::time::Instant;

use disgold_core::harness::render_diff;
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
        "Comparing against goldens in '{}' ({})",
        settings.goldens_dir, settings.strategy
    );
    let report = registry.run_with(&harness, Mode::Compare, ids, print_case_line)?;
    let elapsed_secs = start_time.elapsed().as_secs_f64();

    let total = report.cases.len();
    let passed = report.passed();
    let mismatched = report.mismatched();
    let failed = report.failed();

    for case in report.cases {
        match case.status {
            CaseStatus::Mismatch { expected, actual } => {
                println!();
                print!("{}", render_diff(&case.id, &expected, &actual));
            }
            CaseStatus::Failed(error) => {
                eprintln!();
                eprintln!("{:?}", Report::new(error).wrap_err(format!("Case '{}' failed", case.id)));
            }
            CaseStatus::Passed | CaseStatus::Regenerated => {}
        }
    }

    println!();
    let summary = format!(
        "{total} case(s), {passed} passed, {mismatched} mismatched, {failed} failed ({elapsed_secs:.1}s)"
    );
    if mismatched + failed == 0 {
        println!("{summary}");
        Ok(())
    } else {
        eprintln!("{summary}");
        if mismatched > 0 {
            eprintln!("Run `disgold generate` to accept intended changes.");
        }
        miette::bail!("{} case(s) did not match their golden snapshot", mismatched + failed);
    }
}

fn print_case_line(case: &CaseReport) {
    let verdict = match &case.status {
        CaseStatus::Passed => "ok ✓",
        CaseStatus::Regenerated => "regenerated ✓",
        CaseStatus::Mismatch { .. } => "MISMATCH ✗",
        CaseStatus::Failed(_) => "FAILED ✗",
    };
    println!("  {}: {verdict}", case.id);
}
