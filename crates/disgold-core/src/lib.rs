// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Golden disassembly harness core.
//!
//! This crate verifies the exact machine code a toolchain produces for
//! selected functions:
//! - Case discovery and loading (`<id>.toml` definitions)
//! - Artifact resolution by recursive pattern search
//! - External disassembler invocation (`objdump` batch or `gdb` session)
//! - Output normalization (address elision, cross-version spelling fixes)
//! - Golden snapshot storage and comparison
//!
//! The pipeline for one case is: loader → locator → invoker → normalizer →
//! (compare against the golden store | write to the golden store).

pub mod case;
pub mod error;
pub mod golden;
pub mod harness;
pub mod invoke;
pub mod locate;
pub mod normalize;
pub mod process;
pub mod registry;

#[cfg(test)]
mod normalize_property_tests;

pub use error::{HarnessError, InvocationFailure, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::case::TestCaseDescriptor;
    pub use crate::golden::GoldenStore;
    pub use crate::harness::{Harness, Outcome};
    pub use crate::invoke::{Disassembler, OutputShape, RawDisassembly, Strategy};
    pub use crate::registry::{CaseStatus, Mode, Registry, RunReport};
}
