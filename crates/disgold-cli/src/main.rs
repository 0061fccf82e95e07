// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Golden disassembly regression runner.
//!
//! This is the main entry point for the `disgold` command.

use camino::Utf8PathBuf;
use clap::{ArgAction, Args, Parser, Subcommand};
use disgold_core::invoke::Strategy;
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{Overrides, Settings};

/// disgold: verify the machine code emitted for selected functions against
/// golden disassembly snapshots
#[derive(Debug, Parser)]
#[command(name = "disgold")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Case ids to compare (default: every discovered case)
    ids: Vec<String>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Regenerate golden snapshots from the current artifacts
    Generate {
        /// Case ids to regenerate (default: every discovered case)
        ids: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Config file (default: ./disgold.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    /// Directory holding `<id>.toml` case files
    #[arg(long, global = true, value_name = "DIR")]
    cases: Option<Utf8PathBuf>,

    /// Directory holding `<id>.dis` golden snapshots (default: the case directory)
    #[arg(long, global = true, value_name = "DIR")]
    goldens: Option<Utf8PathBuf>,

    /// Directory searched for artifacts
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<Utf8PathBuf>,

    /// Disassembler strategy: objdump or gdb
    #[arg(long, global = true)]
    strategy: Option<Strategy>,

    /// Seconds before a disassembler process is killed
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            cases: self.cases.clone(),
            goldens: self.goldens.clone(),
            root: self.root.clone(),
            strategy: self.strategy,
            timeout_secs: self.timeout,
        }
    }
}

fn main() -> Result<()> {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = Settings::resolve(&cli.global.overrides()).and_then(|settings| match cli.command {
        None => commands::check::run(&settings, &cli.ids),
        Some(Command::Generate { ids }) => commands::generate::run(&settings, &ids),
    });

    // Exit with appropriate code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose))),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

fn directive_for_verbosity(v: u8) -> &'static str {
    // Targets are module paths: the binary crate is `disgold`.
    match v {
        0 => "disgold=info,disgold_core=info",
        1 => "disgold=debug,disgold_core=debug",
        _ => "disgold=trace,disgold_core=trace",
    }
}
