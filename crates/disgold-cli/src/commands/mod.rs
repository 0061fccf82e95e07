// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CLI command implementations.

pub mod check;
pub mod generate;

use disgold_core::golden::GoldenStore;
use disgold_core::harness::Harness;
use disgold_core::process::check_tool_available;
use disgold_core::registry::Registry;
use miette::{Context, Result};
use tracing::debug;

use crate::config::Settings;

/// Discovers the cases and builds the harness for `settings`.
///
/// The disassembler is probed first so a missing tool fails once, up front,
/// instead of once per case.
fn prepare(settings: &Settings) -> Result<(Registry, Harness)> {
    let program = settings.program();
    check_tool_available(program, settings.strategy.install_hint(), settings.timeout)?;

    let registry = Registry::discover(&settings.cases_dir)
        .wrap_err_with(|| format!("Failed to read case directory '{}'", settings.cases_dir))?;
    debug!(
        cases = registry.len(),
        root = %settings.root,
        strategy = %settings.strategy,
        program,
        "Prepared run"
    );

    let harness = Harness::new(
        settings.root.clone(),
        settings.strategy.build(program, settings.timeout),
        GoldenStore::new(settings.goldens_dir.clone()),
    );
    Ok((registry, harness))
}
