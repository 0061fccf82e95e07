// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

// Shared with `build.rs` through `include!`, so no inner attributes here.

/// Test function name for case `id`: lowercased, with everything but ASCII
/// alphanumerics replaced by `_`.
#[must_use]
pub fn test_fn_name(id: &str) -> String {
    let suffix: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("disas_{suffix}")
}

/// First pair of case ids that map to the same test function name, with
/// that name, as `(earlier_id, later_id, fn_name)`.
#[must_use]
pub fn find_name_collision<'a>(ids: &[&'a str]) -> Option<(&'a str, &'a str, String)> {
    let mut seen: std::collections::BTreeMap<String, &'a str> = std::collections::BTreeMap::new();
    for &id in ids {
        let name = test_fn_name(id);
        if let Some(other) = seen.insert(name.clone(), id) {
            return Some((other, id, name));
        }
    }
    None
}
