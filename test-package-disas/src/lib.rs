// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Golden disassembly tests for the harness itself.
//!
//! Cases live in `cases/` as `<id>.toml` with their `<id>.dis` goldens next
//! to them. Artifacts under `artifacts/` are canned disassembler output
//! (`.lst` for objdump listings, `.gdb` for gdb session transcripts), so the
//! tests run without binutils. The build script generates one test function
//! per case file.

pub mod test_names;
