// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Run configuration.
//!
//! Every setting is resolved from, highest priority first:
//! 1. command-line flags
//! 2. `DISGOLD_*` environment variables (empty values are ignored)
//! 3. `disgold.toml` (`--config`, or auto-discovered in the current directory)
//! 4. built-in defaults
//!
//! Relative paths in a config file are relative to the directory holding it.

use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use disgold_core::invoke::Strategy;
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;
use tracing::debug;

/// Config file looked up in the current directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "disgold.toml";

pub const DEFAULT_CASES_DIR: &str = "tests/disas";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Contents of `disgold.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub harness: HarnessSection,
    #[serde(default)]
    pub tools: ToolsSection,
}

/// `[harness]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessSection {
    pub cases: Option<String>,
    pub goldens: Option<String>,
    pub root: Option<String>,
    pub strategy: Option<Strategy>,
    pub timeout_secs: Option<u64>,
}

/// `[tools]` table: executables to run for each strategy.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsSection {
    pub objdump: Option<String>,
    pub gdb: Option<String>,
}

/// Settings given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<Utf8PathBuf>,
    pub cases: Option<Utf8PathBuf>,
    pub goldens: Option<Utf8PathBuf>,
    pub root: Option<Utf8PathBuf>,
    pub strategy: Option<Strategy>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub cases_dir: Utf8PathBuf,
    pub goldens_dir: Utf8PathBuf,
    pub root: Utf8PathBuf,
    pub strategy: Strategy,
    pub timeout: Duration,
    pub objdump: String,
    pub gdb: String,
}

impl Settings {
    /// Executable for the selected strategy.
    #[must_use]
    pub fn program(&self) -> &str {
        match self.strategy {
            Strategy::Objdump => &self.objdump,
            Strategy::Gdb => &self.gdb,
        }
    }

    /// Resolves settings from `overrides`, the process environment and the
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// an environment variable holds an invalid value.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file = load_config_file(overrides.config.as_deref(), Utf8Path::new("."))?;
        Self::layer(overrides, |name| std::env::var(name).ok(), file)
    }

    /// Layers `overrides` over `env` over `file` over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value
    /// or the resulting timeout is zero.
    pub fn layer(
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
        file: Option<(Utf8PathBuf, ConfigFile)>,
    ) -> Result<Self> {
        let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());
        let (base, file) = match file {
            Some((dir, file)) => (dir, file),
            None => (Utf8PathBuf::new(), ConfigFile::default()),
        };
        let from_file = |path: Option<String>| path.map(|p| base.join(p));

        let cases_dir = overrides
            .cases
            .clone()
            .or_else(|| env("DISGOLD_CASES").map(Utf8PathBuf::from))
            .or_else(|| from_file(file.harness.cases))
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CASES_DIR));
        let goldens_dir = overrides
            .goldens
            .clone()
            .or_else(|| env("DISGOLD_GOLDENS").map(Utf8PathBuf::from))
            .or_else(|| from_file(file.harness.goldens))
            .unwrap_or_else(|| cases_dir.clone());
        let root = overrides
            .root
            .clone()
            .or_else(|| env("DISGOLD_ROOT").map(Utf8PathBuf::from))
            .or_else(|| from_file(file.harness.root))
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        let strategy = match overrides.strategy {
            Some(strategy) => strategy,
            None => match env("DISGOLD_STRATEGY") {
                Some(value) => value
                    .parse::<Strategy>()
                    .map_err(|e| miette::miette!("Invalid DISGOLD_STRATEGY: {e}"))?,
                None => file.harness.strategy.unwrap_or_default(),
            },
        };

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => match env("DISGOLD_TIMEOUT") {
                Some(value) => value.trim().parse::<u64>().into_diagnostic().wrap_err_with(|| {
                    format!("Invalid DISGOLD_TIMEOUT '{value}': expected whole seconds")
                })?,
                None => file.harness.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
        };
        if timeout_secs == 0 {
            miette::bail!("Disassembler timeout must be at least one second");
        }

        let objdump = env("DISGOLD_OBJDUMP")
            .or(file.tools.objdump)
            .unwrap_or_else(|| Strategy::Objdump.default_program().to_string());
        let gdb = env("DISGOLD_GDB")
            .or(file.tools.gdb)
            .unwrap_or_else(|| Strategy::Gdb.default_program().to_string());

        Ok(Self {
            cases_dir,
            goldens_dir,
            root,
            strategy,
            timeout: Duration::from_secs(timeout_secs),
            objdump,
            gdb,
        })
    }
}

/// Loads the explicit config file, or `disgold.toml` in `cwd` if present.
///
/// Returns the directory relative paths resolve against, with the parsed
/// file.
///
/// # Errors
///
/// Returns an error if an explicit file is missing, or if any config file
/// cannot be read or parsed.
pub fn load_config_file(
    explicit: Option<&Utf8Path>,
    cwd: &Utf8Path,
) -> Result<Option<(Utf8PathBuf, ConfigFile)>> {
    let path = match explicit {
        Some(path) => path.to_owned(),
        None => {
            let candidate = cwd.join(CONFIG_FILE_NAME);
            if !candidate
                .try_exists()
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to stat config file '{candidate}'"))?
            {
                return Ok(None);
            }
            candidate
        }
    };

    let content = fs::read_to_string(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read config file '{path}'"))?;
    let file: ConfigFile = toml::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse config file '{path}'"))?;
    debug!(%path, "Loaded config file");

    let dir = path.parent().map(Utf8Path::to_owned).unwrap_or_default();
    Ok(Some((dir, file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn parse(content: &str) -> ConfigFile {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let settings = Settings::layer(&Overrides::default(), no_env, None).unwrap();
        assert_eq!(settings.cases_dir, Utf8PathBuf::from("tests/disas"));
        assert_eq!(settings.goldens_dir, settings.cases_dir);
        assert_eq!(settings.root, Utf8PathBuf::from("."));
        assert_eq!(settings.strategy, Strategy::Objdump);
        assert_eq!(settings.timeout, Duration::from_secs(120));
        assert_eq!(settings.program(), "objdump");
        assert_eq!(settings.gdb, "gdb");
    }

    #[test]
    fn file_values_resolve_against_config_directory() {
        let file = parse(
            r#"
            [harness]
            cases = "cases"
            root = "build"
            strategy = "gdb"
            timeout_secs = 30

            [tools]
            gdb = "gdb-multiarch"
            "#,
        );
        let settings = Settings::layer(
            &Overrides::default(),
            no_env,
            Some((Utf8PathBuf::from("project"), file)),
        )
        .unwrap();
        assert_eq!(settings.cases_dir, Utf8PathBuf::from("project/cases"));
        assert_eq!(settings.goldens_dir, Utf8PathBuf::from("project/cases"));
        assert_eq!(settings.root, Utf8PathBuf::from("project/build"));
        assert_eq!(settings.strategy, Strategy::Gdb);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.program(), "gdb-multiarch");
    }

    #[test]
    fn env_beats_file_and_flags_beat_env() {
        let file = parse("[harness]\ncases = \"from-file\"\nstrategy = \"gdb\"\n");
        let env = env_of(&[
            ("DISGOLD_CASES", "from-env"),
            ("DISGOLD_STRATEGY", "objdump"),
            ("DISGOLD_TIMEOUT", "7"),
            ("DISGOLD_OBJDUMP", "llvm-objdump"),
        ]);
        let overrides = Overrides {
            cases: Some(Utf8PathBuf::from("from-flag")),
            ..Overrides::default()
        };

        let settings = Settings::layer(&overrides, &env, Some((Utf8PathBuf::new(), file))).unwrap();
        assert_eq!(settings.cases_dir, Utf8PathBuf::from("from-flag"));
        assert_eq!(settings.strategy, Strategy::Objdump);
        assert_eq!(settings.timeout, Duration::from_secs(7));
        assert_eq!(settings.program(), "llvm-objdump");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let env = env_of(&[("DISGOLD_CASES", ""), ("DISGOLD_STRATEGY", "  ")]);
        let settings = Settings::layer(&Overrides::default(), env, None).unwrap();
        assert_eq!(settings.cases_dir, Utf8PathBuf::from(DEFAULT_CASES_DIR));
        assert_eq!(settings.strategy, Strategy::Objdump);
    }

    #[test]
    fn invalid_env_values_are_errors() {
        let env = env_of(&[("DISGOLD_STRATEGY", "lldb")]);
        assert!(Settings::layer(&Overrides::default(), env, None).is_err());

        let env = env_of(&[("DISGOLD_TIMEOUT", "soon")]);
        assert!(Settings::layer(&Overrides::default(), env, None).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Overrides::default()
        };
        assert!(Settings::layer(&overrides, no_env, None).is_err());
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        assert!(toml::from_str::<ConfigFile>("[harness]\ncase = \"x\"\n").is_err());
        assert!(toml::from_str::<ConfigFile>("[other]\n").is_err());
    }

    #[test]
    fn config_file_is_auto_discovered() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        assert!(load_config_file(None, dir).unwrap().is_none());

        fs::write(dir.join(CONFIG_FILE_NAME), "[harness]\nroot = \"out\"\n").unwrap();
        let (base, file) = load_config_file(None, dir).unwrap().unwrap();
        assert_eq!(base, dir);
        assert_eq!(file.harness.root.as_deref(), Some("out"));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let missing = dir.join("missing.toml");
        assert!(load_config_file(Some(missing.as_path()), dir).is_err());
    }

    #[test]
    #[serial(env_var)]
    fn resolve_reads_process_environment() {
        // SAFETY: serialized with other environment-mutating tests
        unsafe {
            std::env::set_var("DISGOLD_ROOT", "/tmp/disgold-build");
        }
        let overrides = Overrides {
            config: Some(Utf8PathBuf::from("/nonexistent/disgold.toml")),
            ..Overrides::default()
        };
        assert!(Settings::resolve(&overrides).is_err());

        let temp = TempDir::new().unwrap();
        let config = Utf8Path::from_path(temp.path()).unwrap().join("disgold.toml");
        fs::write(&config, "[harness]\nroot = \"ignored\"\n").unwrap();
        let overrides = Overrides {
            config: Some(config),
            ..Overrides::default()
        };
        let settings = Settings::resolve(&overrides);
        // SAFETY: cleaning up test state
        unsafe {
            std::env::remove_var("DISGOLD_ROOT");
        }
        assert_eq!(settings.unwrap().root, Utf8PathBuf::from("/tmp/disgold-build"));
    }
}
