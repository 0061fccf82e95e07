// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Batch strategy: disassemble the whole artifact with `objdump`, then cut
//! out the requested symbol regions.

use std::process::Command;
use std::time::Duration;

use camino::Utf8Path;
use tracing::{debug, instrument};

use super::{Disassembler, OutputShape, RawDisassembly};
use crate::error::{HarnessError, Result};
use crate::process::run_tool;

/// Relocations keep call targets symbolic in unlinked objects; a fixed
/// instruction width keeps long encodings on one line.
pub const OBJDUMP_ARGS: [&str; 4] = ["--demangle", "--disassemble", "--reloc", "--insn-width=8"];

/// `objdump --disassemble` over the whole artifact.
#[derive(Debug, Clone)]
pub struct ObjdumpBatch {
    program: String,
    timeout: Duration,
}

impl ObjdumpBatch {
    /// Creates the strategy for the given executable and timeout.
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Disassembler for ObjdumpBatch {
    fn name(&self) -> &str {
        &self.program
    }

    fn shape(&self) -> OutputShape {
        OutputShape::Linear
    }

    #[instrument(skip_all, fields(artifact = %artifact))]
    fn disassemble(&self, artifact: &Utf8Path, symbols: &[String]) -> Result<RawDisassembly> {
        let mut command = Command::new(&self.program);
        command.args(OBJDUMP_ARGS).arg(artifact.as_str());

        let listing = run_tool(command, &self.program, artifact, self.timeout)?;
        let extraction = extract_regions(&listing, symbols);
        if !extraction.missing.is_empty() {
            return Err(HarnessError::SymbolsNotFound {
                artifact: artifact.to_owned(),
                missing: extraction.missing,
            });
        }

        debug!(
            listing_lines = listing.lines().count(),
            kept_lines = extraction.text.lines().count(),
            "Extracted symbol regions"
        );
        Ok(RawDisassembly {
            text: extraction.text,
            shape: OutputShape::Linear,
        })
    }
}

/// Symbol regions cut out of a linear listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Kept lines joined with `\n`, in listing order.
    pub text: String,
    /// Requested symbols that never opened a region.
    pub missing: Vec<String>,
}

/// Keeps only the regions of `listing` that belong to `symbols`.
///
/// A line containing `<symbol>:` opens a region when none is open, and
/// counts as found for every request naming that symbol. Every
/// line of an open region is kept, and a blank line is kept and closes it.
/// Regions come out in listing order, not in the order of `symbols`.
#[must_use]
pub fn extract_regions(listing: &str, symbols: &[String]) -> Extraction {
    let labels: Vec<String> = symbols.iter().map(|s| format!("<{s}>:")).collect();
    let mut found = vec![false; symbols.len()];
    let mut kept = Vec::new();
    let mut open = false;

    for line in listing.lines() {
        if !open {
            for (index, label) in labels.iter().enumerate() {
                if line.contains(label.as_str()) {
                    found[index] = true;
                    open = true;
                }
            }
        }
        if open {
            kept.push(line);
            if line.trim().is_empty() {
                open = false;
            }
        }
    }

    let missing = symbols
        .iter()
        .zip(&found)
        .filter(|(_, found)| !**found)
        .map(|(symbol, _)| symbol.clone())
        .collect();

    Extraction {
        text: kept.join("\n"),
        missing,
    }
}
