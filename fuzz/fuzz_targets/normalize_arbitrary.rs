// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for normalizer crash safety and idempotence.
//!
//! Arbitrary text is normalized in both output shapes. Normalization must
//! never panic, and whenever it succeeds a second pass must leave the result
//! unchanged.
//!
//! # Corpus Seeding
//!
//! The corpus in `fuzz/corpus/normalize_arbitrary/` can be seeded with the
//! artifacts and goldens from `test-package-disas/`.

#![no_main]

use disgold_core::invoke::OutputShape;
use disgold_core::normalize::{elide_target_address, normalize_text};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Tool output that is not UTF-8 is rejected before normalization.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for shape in [OutputShape::Linear, OutputShape::AddressColumns] {
        if let Ok(once) = normalize_text(text, shape) {
            let twice = normalize_text(&once, shape).ok();
            assert_eq!(twice.as_deref(), Some(once.as_str()));
        }
    }

    // Elision alone is idempotent for every line.
    for line in text.split('\n') {
        let once = elide_target_address(line);
        assert_eq!(elide_target_address(&once), once);
    }
});
