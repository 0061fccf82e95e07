// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for disassembly normalization.
//!
//! These tests use `proptest` to check normalizer invariants over generated
//! listings:
//!
//! 1. **Normalizer never panics** on arbitrary text, in either shape
//! 2. **Linear normalization never fails** since only column stripping can
//! 3. **Line structure is preserved** (one output line per input line)
//! 4. **Normalization is idempotent** on realistic gdb and objdump listings
//! 5. **Targets are elided** from every generated control-flow instruction
//! 6. **Address columns are gone** from normalized gdb dumps

use proptest::prelude::*;

use crate::invoke::OutputShape;
use crate::normalize::{elide_target_address, normalize_text};

// ============================================================================
// Generators
// ============================================================================

const MNEMONICS: &[&str] = &[
    "call", "callq", "jmp", "jmpq", "ja", "jae", "jb", "jbe", "je", "jne", "js", "jns", "jg",
    "jge", "jl", "jle", "jz", "jnz", "jo", "jp",
];

const PADDING: &[&str] = &[" ", "  ", "   ", "    ", "\t"];

const PLAIN_INSTRUCTIONS: &[&str] = &[
    "push   %rbp",
    "mov    %rsp,%rbp",
    "xor    %eax,%eax",
    "lea    0x1(%rdi),%rax",
    "cmp    $0x37,%rdi",
    "ret",
    "nopl   0x0(%rax)",
    "nopw   %cs:0x0(%rax,%rax,1)",
    "jmp    *%rax",
    "jmpq   *0x2fe2(%rip)        # 0x4018 <foo@got>",
    "movzbl (%rsi),%eax",
];

const SYMBOLS: &[&str] = &[
    "bar",
    "memcpy@plt",
    "monad::rlp::impl::length_length(unsigned long)",
    "_ZN5monad3rlp13string_lengthE",
];

fn symbol() -> impl Strategy<Value = String> {
    prop::sample::select(SYMBOLS).prop_map(ToString::to_string)
}

/// `<symbol>` or `<symbol+offset>`.
fn annotation() -> impl Strategy<Value = String> {
    (symbol(), prop::option::of(1u32..0x400)).prop_map(|(sym, offset)| match offset {
        Some(offset) => format!("<{sym}+{offset}>"),
        None => format!("<{sym}>"),
    })
}

/// `(mnemonic, padding, annotation)` of a control-flow instruction.
fn control_flow_parts() -> impl Strategy<Value = (String, String, String)> {
    (
        prop::sample::select(MNEMONICS).prop_map(ToString::to_string),
        prop::sample::select(PADDING).prop_map(ToString::to_string),
        annotation(),
    )
}

fn instruction() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(PLAIN_INSTRUCTIONS).prop_map(ToString::to_string),
        (control_flow_parts(), any::<u32>(), any::<bool>()).prop_map(
            |((mnemonic, pad, annotation), target, prefixed)| {
                let prefix = if prefixed { "0x" } else { "" };
                format!("{mnemonic}{pad}{prefix}{target:x} {annotation}")
            }
        ),
    ]
}

/// One gdb `disas` dump.
fn gdb_dump() -> impl Strategy<Value = String> {
    (any::<u32>(), prop::collection::vec(instruction(), 1..20)).prop_map(|(base, insns)| {
        let mut out = String::from("Dump of assembler code for function foo:\n");
        for (offset, insn) in insns.iter().enumerate() {
            let address = u64::from(base) + offset as u64;
            out.push_str(&format!("   0x{address:016x} <+{offset}>:\t{insn}\n"));
        }
        out.push_str("End of assembler dump.\n");
        out
    })
}

/// One objdump symbol region.
fn objdump_region() -> impl Strategy<Value = String> {
    (symbol(), prop::collection::vec(instruction(), 1..20)).prop_map(|(sym, insns)| {
        let mut out = format!("0000000000000000 <{sym}>:\n");
        for (offset, insn) in insns.iter().enumerate() {
            out.push_str(&format!("{offset:>4x}:\tc3                   \t{insn}\n"));
        }
        out
    })
}

// ============================================================================
// Property tests
// ============================================================================

/// Default is 512 cases; override via `PROPTEST_CASES` env var for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Normalizer never panics on arbitrary input.
    #[test]
    fn normalizer_never_panics(input in "\\PC{0,500}") {
        let _ = normalize_text(&input, OutputShape::AddressColumns);
        let _ = normalize_text(&input, OutputShape::Linear);
    }

    /// Property 2: Linear text always normalizes.
    #[test]
    fn linear_normalization_never_fails(input in "(\\PC|\n|\t){0,500}") {
        prop_assert!(normalize_text(&input, OutputShape::Linear).is_ok());
    }

    /// Property 3: Line count is preserved, trailing newline included.
    #[test]
    fn line_structure_is_preserved(dump in gdb_dump(), region in objdump_region()) {
        let gdb = normalize_text(&dump, OutputShape::AddressColumns).unwrap();
        prop_assert_eq!(gdb.split('\n').count(), dump.split('\n').count());
        prop_assert!(gdb.ends_with('\n'));

        let objdump = normalize_text(&region, OutputShape::Linear).unwrap();
        prop_assert_eq!(objdump.split('\n').count(), region.split('\n').count());
    }

    /// Property 4a: Normalizing a gdb dump twice changes nothing.
    #[test]
    fn gdb_normalization_is_idempotent(dump in gdb_dump()) {
        let once = normalize_text(&dump, OutputShape::AddressColumns).unwrap();
        let twice = normalize_text(&once, OutputShape::AddressColumns).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property 4b: Normalizing an objdump region twice changes nothing.
    #[test]
    fn objdump_normalization_is_idempotent(region in objdump_region()) {
        let once = normalize_text(&region, OutputShape::Linear).unwrap();
        let twice = normalize_text(&once, OutputShape::Linear).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property 4c: Normalization is deterministic.
    #[test]
    fn normalization_is_deterministic(region in objdump_region()) {
        prop_assert_eq!(
            normalize_text(&region, OutputShape::Linear).unwrap(),
            normalize_text(&region, OutputShape::Linear).unwrap()
        );
    }

    /// Property 5: The hex target disappears, mnemonic and annotation stay.
    #[test]
    fn control_flow_targets_are_elided(
        (mnemonic, pad, annotation) in control_flow_parts(),
        target in any::<u32>(),
        prefixed in any::<bool>(),
        indent in "[ ]{0,4}",
    ) {
        let prefix = if prefixed { "0x" } else { "" };
        let line = format!("{indent}{mnemonic}{pad}{prefix}{target:x} {annotation}");
        let expected = format!("{indent}{mnemonic}{pad}{annotation}");
        prop_assert_eq!(elide_target_address(&line).into_owned(), expected);
    }

    /// Property 6: No address column survives gdb normalization.
    #[test]
    fn gdb_address_columns_are_stripped(dump in gdb_dump()) {
        let normalized = normalize_text(&dump, OutputShape::AddressColumns).unwrap();
        for line in normalized.lines() {
            prop_assert!(!line.starts_with("   0x"), "column survived: {:?}", line);
        }
    }
}
