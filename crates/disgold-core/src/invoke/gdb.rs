// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Interactive-session strategy: one `gdb -batch` run issuing a `disas`
//! command per symbol.

use std::process::Command;
use std::time::Duration;

use camino::Utf8Path;
use tracing::instrument;

use super::{Disassembler, OutputShape, RawDisassembly};
use crate::error::Result;
use crate::process::run_tool;

/// `gdb -batch` session over the artifact.
#[derive(Debug, Clone)]
pub struct GdbSession {
    program: String,
    timeout: Duration,
}

impl GdbSession {
    /// Creates the strategy for the given executable and timeout.
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Arguments for a session that loads `artifact` and disassembles each
    /// symbol in order. `-nx` keeps user `.gdbinit` settings out of the
    /// output.
    #[must_use]
    pub fn session_args(artifact: &Utf8Path, symbols: &[String]) -> Vec<String> {
        let mut args = vec![
            "-nx".to_string(),
            "-batch".to_string(),
            "-ex".to_string(),
            format!("file {artifact}"),
        ];
        for symbol in symbols {
            args.push("-ex".to_string());
            args.push(format!("disas '{symbol}'"));
        }
        args
    }
}

impl Disassembler for GdbSession {
    fn name(&self) -> &str {
        &self.program
    }

    fn shape(&self) -> OutputShape {
        OutputShape::AddressColumns
    }

    #[instrument(skip_all, fields(artifact = %artifact))]
    fn disassemble(&self, artifact: &Utf8Path, symbols: &[String]) -> Result<RawDisassembly> {
        let mut command = Command::new(&self.program);
        command.args(Self::session_args(artifact, symbols));

        let text = run_tool(command, &self.program, artifact, self.timeout)?;
        Ok(RawDisassembly {
            text,
            shape: OutputShape::AddressColumns,
        })
    }
}
