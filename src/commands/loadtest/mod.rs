//! `apiprobe loadtest` CLI subcommands.
//!
//! Provides `run` (execute a load test) and `init` (generate starter config).

mod init;
mod run;

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Load test commands.
#[derive(Debug, Subcommand)]
pub enum LoadtestCommand {
    /// Run a load test
    ///
    /// Targets come from `--target` flags, from a collection file
    /// (`--collection`, optionally narrowed with `--group`), or from the
    /// `targets` list in .apiprobe/loadtest.toml, in that order of
    /// precedence. Reports results to the terminal and writes a JSON report
    /// to .apiprobe/reports/.
    Run(RunArgs),

    /// Generate a starter loadtest config file
    ///
    /// Creates .apiprobe/loadtest.toml with default settings. If a collection
    /// is provided, its dispatchable URLs become the target list and its
    /// placeholders are listed under [variables].
    Init {
        /// Collection or specification file to discover targets from
        #[arg(long)]
        collection: Option<PathBuf>,

        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for `loadtest run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Collection or specification file to select targets from
    #[arg(long)]
    pub collection: Option<PathBuf>,

    /// Only load test endpoints in this group and its sub-folders
    #[arg(long, requires = "collection")]
    pub group: Option<String>,

    /// Target URL (repeatable). Overrides collection and config targets
    #[arg(long = "target")]
    pub targets: Vec<String>,

    /// Path to config file (default: auto-discover .apiprobe/loadtest.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Requested number of requests (overrides config)
    #[arg(long, env = "APIPROBE_VOLUME")]
    pub volume: Option<u64>,

    /// Number of concurrent workers (overrides config)
    #[arg(long, env = "APIPROBE_CONCURRENCY")]
    pub concurrency: Option<u32>,

    /// Placeholder value as NAME=VALUE (repeatable, overrides config)
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Disable JSON report output
    #[arg(long)]
    pub no_report: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        },
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

impl LoadtestCommand {
    /// Execute the selected loadtest subcommand.
    pub fn execute(self) -> Result<()> {
        match self {
            LoadtestCommand::Run(args) => {
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(run::execute_run(args))
            },
            LoadtestCommand::Init { collection, force } => init::execute_init(collection, force),
        }
    }
}
