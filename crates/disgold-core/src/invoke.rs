// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! External disassembler invocation.
//!
//! Two strategies target the same `(artifact, symbols)` pair but differ in
//! tool and output shape:
//!
//! - [`ObjdumpBatch`]: one `objdump --disassemble` run over the whole
//!   artifact, with the requested symbol regions cut out afterwards. This is
//!   the default and the one goldens are recorded with.
//! - [`GdbSession`]: one `gdb -batch` session issuing a `disas` command per
//!   symbol, in the order given.
//!
//! The normalizer only needs to know the [`OutputShape`] of the text, not
//! which tool produced it.

mod gdb;
mod objdump;

pub use gdb::GdbSession;
pub use objdump::{Extraction, ObjdumpBatch, extract_regions};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use camino::Utf8Path;
use serde::Deserialize;

use crate::error::Result;

/// Layout of a strategy's raw output, as far as normalization cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// Every instruction line starts with a fixed-width absolute address
    /// column (`   0x0000000000001139 <+0>:`), as printed by gdb.
    AddressColumns,
    /// Linear disassembly with section-relative offsets, as printed by
    /// objdump.
    Linear,
}

/// Unmodified text emitted by a disassembler for one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDisassembly {
    /// Raw text, in tool order.
    pub text: String,
    /// Layout of `text`.
    pub shape: OutputShape,
}

/// A way of disassembling selected symbols of an artifact.
pub trait Disassembler {
    /// Tool name used in logs and reports.
    fn name(&self) -> &str;

    /// Layout of the text returned by [`Disassembler::disassemble`].
    fn shape(&self) -> OutputShape;

    /// Disassembles `symbols` from `artifact` with a single tool invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be run, fails, times out, writes
    /// undecodable output, or (for strategies that extract regions) does not
    /// print one of the requested symbols.
    fn disassemble(&self, artifact: &Utf8Path, symbols: &[String]) -> Result<RawDisassembly>;
}

/// Selectable invocation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Batch `objdump` over the whole artifact.
    #[default]
    Objdump,
    /// Interactive `gdb` session, one command per symbol.
    Gdb,
}

impl Strategy {
    /// Default executable for this strategy.
    #[must_use]
    pub fn default_program(self) -> &'static str {
        match self {
            Self::Objdump => "objdump",
            Self::Gdb => "gdb",
        }
    }

    /// Installation hint shown when the executable is missing.
    #[must_use]
    pub fn install_hint(self) -> &'static str {
        match self {
            Self::Objdump => {
                "objdump ships with GNU binutils.\n\
                 - Ubuntu/Debian: sudo apt-get install binutils\n\
                 - macOS: brew install binutils (or use llvm-objdump)"
            }
            Self::Gdb => {
                "- Ubuntu/Debian: sudo apt-get install gdb\n\
                 - macOS: brew install gdb"
            }
        }
    }

    /// Builds the disassembler for this strategy.
    #[must_use]
    pub fn build(self, program: impl Into<String>, timeout: Duration) -> Box<dyn Disassembler> {
        match self {
            Self::Objdump => Box::new(ObjdumpBatch::new(program, timeout)),
            Self::Gdb => Box::new(GdbSession::new(program, timeout)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Objdump => "objdump",
            Self::Gdb => "gdb",
        })
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "objdump" => Ok(Self::Objdump),
            "gdb" => Ok(Self::Gdb),
            other => Err(format!(
                "unknown strategy '{other}' (expected 'objdump' or 'gdb')"
            )),
        }
    }
}
