// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Per-case pipeline: locate → disassemble → normalize, then compare against
//! or overwrite the golden snapshot.

use camino::{Utf8Path, Utf8PathBuf};
use similar::TextDiff;
use tracing::{debug, info, instrument};

use crate::case::TestCaseDescriptor;
use crate::error::Result;
use crate::golden::GoldenStore;
use crate::invoke::Disassembler;
use crate::locate::locate_artifact;
use crate::normalize::normalize;

/// Result of comparing one case against its golden snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Current output equals the snapshot byte for byte.
    Pass,
    /// Current output differs from the snapshot.
    Mismatch { expected: String, actual: String },
}

impl Outcome {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Runs cases against one artifact root, one disassembler and one golden
/// store.
pub struct Harness {
    root: Utf8PathBuf,
    disassembler: Box<dyn Disassembler>,
    goldens: GoldenStore,
}

impl Harness {
    pub fn new(
        root: impl Into<Utf8PathBuf>,
        disassembler: Box<dyn Disassembler>,
        goldens: GoldenStore,
    ) -> Self {
        Self {
            root: root.into(),
            disassembler,
            goldens,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn goldens(&self) -> &GoldenStore {
        &self.goldens
    }

    #[must_use]
    pub fn disassembler(&self) -> &dyn Disassembler {
        self.disassembler.as_ref()
    }

    /// Produces the normalized disassembly of `case` from the current
    /// artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be resolved, the disassembler
    /// fails, or its output has an unexpected layout.
    #[instrument(skip_all, fields(case = case.id()))]
    pub fn render(&self, case: &TestCaseDescriptor) -> Result<String> {
        let artifact = locate_artifact(case.artifact_pattern(), &self.root)?;
        debug!(
            %artifact,
            tool = self.disassembler.name(),
            symbols = case.symbols().len(),
            "Disassembling"
        );
        let raw = self.disassembler.disassemble(&artifact, case.symbols())?;
        normalize(&raw)
    }

    /// Compares the current output of `case` with its golden snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is missing or unreadable, or if
    /// [`Harness::render`] fails. A mismatch is an [`Outcome`], not an error.
    #[instrument(skip_all, fields(case = case.id()))]
    pub fn compare(&self, case: &TestCaseDescriptor) -> Result<Outcome> {
        let expected = self.goldens.load(case.id())?;
        let actual = self.render(case)?;
        if expected == actual {
            Ok(Outcome::Pass)
        } else {
            debug!("Output differs from golden snapshot");
            Ok(Outcome::Mismatch { expected, actual })
        }
    }

    /// Renders `case` and stores the result as its golden snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Harness::render`] fails or the snapshot cannot
    /// be written. On error the previous snapshot is left untouched.
    #[instrument(skip_all, fields(case = case.id()))]
    pub fn regenerate(&self, case: &TestCaseDescriptor) -> Result<()> {
        let text = self.render(case)?;
        self.goldens.save(case.id(), &text)?;
        info!(path = %self.goldens.path(case.id()), "Regenerated golden snapshot");
        Ok(())
    }
}

/// Unified diff from the golden snapshot of `id` to the current output.
#[must_use]
pub fn render_diff(id: &str, expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    diff.unified_diff()
        .header(&format!("a/{id}.dis"), &format!("b/{id}.dis"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::invoke::{OutputShape, RawDisassembly};
    use std::fs;
    use tempfile::TempDir;

    /// Treats the artifact itself as the disassembly listing.
    struct CatDisassembler;

    impl Disassembler for CatDisassembler {
        fn name(&self) -> &str {
            "cat"
        }

        fn shape(&self) -> OutputShape {
            OutputShape::Linear
        }

        fn disassemble(&self, artifact: &Utf8Path, symbols: &[String]) -> Result<RawDisassembly> {
            let listing = fs::read_to_string(artifact).unwrap();
            let text = listing
                .lines()
                .filter(|line| symbols.iter().any(|s| line.contains(s.as_str())))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(RawDisassembly {
                text,
                shape: OutputShape::Linear,
            })
        }
    }

    struct Fixture {
        _temp: TempDir,
        root: Utf8PathBuf,
        harness: Harness,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("build/obj")).unwrap();
        fs::write(
            root.join("build/obj/foo.o"),
            "bar: call   1f <bar+0x4>\nbaz: ret\nqux: nop\n",
        )
        .unwrap();
        let harness = Harness::new(
            root.clone(),
            Box::new(CatDisassembler),
            GoldenStore::new(root.join("goldens")),
        );
        Fixture {
            _temp: temp,
            root,
            harness,
        }
    }

    fn case() -> TestCaseDescriptor {
        TestCaseDescriptor::new(
            "foo",
            "obj/foo.o",
            vec!["bar".to_string(), "baz".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn render_locates_disassembles_and_normalizes() {
        let f = fixture();
        assert_eq!(
            f.harness.render(&case()).unwrap(),
            "bar: call   <bar+0x4>\nbaz: ret"
        );
    }

    #[test]
    fn regenerate_then_compare_passes() {
        let f = fixture();
        f.harness.regenerate(&case()).unwrap();
        assert_eq!(f.harness.compare(&case()).unwrap(), Outcome::Pass);
    }

    #[test]
    fn changed_encoding_is_a_mismatch() {
        let f = fixture();
        f.harness.regenerate(&case()).unwrap();
        fs::write(
            f.root.join("build/obj/foo.o"),
            "bar: call   1f <bar+0x8>\nbaz: ret\n",
        )
        .unwrap();

        let outcome = f.harness.compare(&case()).unwrap();
        let Outcome::Mismatch { expected, actual } = outcome else {
            panic!("expected mismatch, got {outcome:?}");
        };
        assert_eq!(expected, "bar: call   <bar+0x4>\nbaz: ret");
        assert_eq!(actual, "bar: call   <bar+0x8>\nbaz: ret");

        f.harness.regenerate(&case()).unwrap();
        assert_eq!(f.harness.goldens().load("foo").unwrap(), actual);
    }

    #[test]
    fn compare_without_golden_is_golden_missing() {
        let f = fixture();
        let err = f.harness.compare(&case()).unwrap_err();
        assert!(matches!(err, HarnessError::GoldenMissing { .. }));
    }

    #[test]
    fn missing_artifact_fails_and_keeps_golden() {
        let f = fixture();
        f.harness.regenerate(&case()).unwrap();
        fs::remove_file(f.root.join("build/obj/foo.o")).unwrap();

        let err = f.harness.regenerate(&case()).unwrap_err();
        assert!(matches!(err, HarnessError::ArtifactNotFound { .. }));
        assert_eq!(
            f.harness.goldens().load("foo").unwrap(),
            "bar: call   <bar+0x4>\nbaz: ret"
        );
    }

    #[test]
    fn diff_has_golden_headers_and_changed_lines() {
        let diff = render_diff("foo", "a\nb\n", "a\nc\n");
        assert!(diff.contains("--- a/foo.dis"));
        assert!(diff.contains("+++ b/foo.dis"));
        assert!(diff.contains("-b\n"));
        assert!(diff.contains("+c\n"));
    }

    #[test]
    fn outcome_pass_predicate() {
        assert!(Outcome::Pass.is_pass());
        assert!(
            !Outcome::Mismatch {
                expected: String::new(),
                actual: "x".to_string(),
            }
            .is_pass()
        );
    }
}
