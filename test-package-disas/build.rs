// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Build script to generate one test function per `cases/<id>.toml`.
//!
//! Files starting with `_` are helpers, not cases.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let cases_dir = Path::new(&manifest_dir).join("cases");

    // Rerun when cases/ changes (files added/removed)
    println!("cargo:rerun-if-changed={}", cases_dir.display());
    println!("cargo:rerun-if-changed=src/test_names.rs");

    let mut case_ids: Vec<String> = Vec::new();
    for entry in fs::read_dir(&cases_dir).expect("Failed to read cases/ directory") {
        let path = entry.expect("Failed to read directory entry").path();
        if !path.extension().is_some_and(|ext| ext == "toml") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        if !stem.starts_with('_') {
            case_ids.push(stem);
        }
    }
    case_ids.sort();

    let mut code = String::from("// Auto-generated from `cases/*.toml`, do not edit manually.\n");
    let ids: Vec<&str> = case_ids.iter().map(String::as_str).collect();
    if let Some((first, second, fn_name)) = find_name_collision(&ids) {
        panic!("cases '{first}' and '{second}' both map to test function `{fn_name}`; rename one of them");
    }
    for id in &case_ids {
        let fn_name = test_fn_name(id);
        write!(
            code,
            "\n#[test]\nfn {fn_name}() {{\n    check_case({id:?});\n}}\n"
        )
        .expect("writing to a String cannot fail");
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    fs::write(Path::new(&out_dir).join("generated_tests.rs"), code)
        .expect("Failed to write generated_tests.rs");
}

include!("src/test_names.rs");
