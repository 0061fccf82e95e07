// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Disassembly normalization.
//!
//! Raw disassembler text carries two kinds of noise that must not take part
//! in golden comparison: absolute addresses, which change from build to
//! build, and spelling differences between disassembler releases. The
//! pipeline applied to every line, in order:
//!
//! 1. **Column stripping** (address-column output only): tabs are expanded
//!    to 8-column stops, then the fixed-width address column of
//!    `   0x0000000000001139 <+0>:` lines is dropped, leaving the `<+0>:`
//!    offset annotation at the start of the line.
//! 2. **Target-address elision**: in `call 0x401000 <foo>` and every jump
//!    variant, the hex target is deleted while the mnemonic and the symbolic
//!    `<foo>` annotation stay.
//! 3. **Spelling fixes**: [`KNOWN_SPELLING_FIXES`] rewrites known
//!    cross-version formatting differences.
//!
//! The pipeline is deterministic and idempotent.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{HarnessError, Result};
use crate::invoke::{OutputShape, RawDisassembly};

/// Start of a gdb instruction line with an absolute address column.
const ADDRESS_COLUMN_MARKER: &str = "   0x";

/// Width of `   0x` + 16 hex digits + one space.
const ADDRESS_COLUMN_WIDTH: usize = 22;

const TAB_STOP: usize = 8;

/// Textual substitutions compensating for formatting changes between
/// disassembler releases, applied to every line in order.
///
/// Extend this table when a new benign difference shows up; never work
/// around it in a golden file.
pub const KNOWN_SPELLING_FIXES: &[(&str, &str)] = &[
    // gdb 10 prints the segment override as an operand, gdb 12 as a prefix.
    ("nopw   %cs:0", "cs nopw 0"),
];

/// A control-flow mnemonic and the padding after it: `call`, `jmp` and every
/// conditional jump, with the optional AT&T `q` suffix.
static CONTROL_FLOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:call|jmp|j(?:a|ae|b|be|c|e|g|ge|l|le|na|nae|nb|nbe|nc|ne|ng|nge|nl|nle|no|np|ns|nz|o|p|pe|po|s|z|cxz|ecxz|rcxz))q?[ \t]+",
    )
    .expect("static regex must compile")
});

/// A hex target address followed by the opening of its symbolic annotation.
static TARGET_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:0x)?[0-9a-f]+[ \t]+<").expect("static regex must compile")
});

/// Normalizes raw disassembly into its comparable form.
///
/// Lines are split on `\n` and rejoined with `\n`, so a trailing newline
/// survives.
///
/// # Errors
///
/// Returns [`HarnessError::UnexpectedLayout`] if an address-column line is
/// not followed by a `<` offset annotation.
pub fn normalize(raw: &RawDisassembly) -> Result<String> {
    normalize_text(&raw.text, raw.shape)
}

/// [`normalize`] over borrowed text.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_text(text: &str, shape: OutputShape) -> Result<String> {
    let lines = text
        .split('\n')
        .map(|line| normalize_line(line, shape))
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

fn normalize_line(line: &str, shape: OutputShape) -> Result<String> {
    let line = match shape {
        OutputShape::AddressColumns => strip_address_column(&expand_tabs(line))?,
        OutputShape::Linear => line.to_string(),
    };
    let line = elide_target_address(&line);
    Ok(apply_spelling_fixes(&line).into_owned())
}

/// Expands tabs to [`TAB_STOP`]-column stops.
#[must_use]
pub fn expand_tabs(line: &str) -> Cow<'_, str> {
    if !line.contains('\t') {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len() + TAB_STOP);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_STOP - column % TAB_STOP;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    Cow::Owned(out)
}

/// Drops the fixed-width address column of a gdb instruction line.
///
/// Lines not starting with the column marker pass through unchanged.
///
/// # Errors
///
/// Returns [`HarnessError::UnexpectedLayout`] if the text after the column
/// does not start with `<`.
pub fn strip_address_column(line: &str) -> Result<String> {
    if !line.starts_with(ADDRESS_COLUMN_MARKER) {
        return Ok(line.to_string());
    }

    match line.get(ADDRESS_COLUMN_WIDTH..) {
        Some(rest) if rest.starts_with('<') => Ok(rest.to_string()),
        _ => Err(HarnessError::UnexpectedLayout {
            line: line.to_string(),
        }),
    }
}

/// Deletes the hex target of the first control-flow instruction on the line,
/// keeping the mnemonic, its padding and the `<symbol>` annotation.
///
/// Only the first control-flow mnemonic is considered; a line whose first
/// mnemonic has no `<hex> <annotation>` target is left alone.
#[must_use]
pub fn elide_target_address(line: &str) -> Cow<'_, str> {
    let Some(mnemonic) = CONTROL_FLOW.find(line) else {
        return Cow::Borrowed(line);
    };
    let rest = &line[mnemonic.end()..];
    let Some(target) = TARGET_ADDRESS.find(rest) else {
        return Cow::Borrowed(line);
    };

    // `target` ends just past the `<`, which stays.
    let annotation = &rest[target.end() - 1..];
    Cow::Owned(format!("{}{annotation}", &line[..mnemonic.end()]))
}

/// Applies [`KNOWN_SPELLING_FIXES`].
#[must_use]
pub fn apply_spelling_fixes(line: &str) -> Cow<'_, str> {
    let mut line = Cow::Borrowed(line);
    for (from, to) in KNOWN_SPELLING_FIXES {
        if line.contains(from) {
            line = Cow::Owned(line.replace(from, to));
        }
    }
    line
}
