//! apiprobe: explore API collections and load test their endpoints.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Explore API collections and load test their endpoints
#[derive(Parser)]
#[command(name = "apiprobe")]
#[command(about = "Explore API collections and load test their endpoints", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the endpoints described by a collection or specification file
    ///
    /// Accepts a collection export with nested `item` folders or a flat
    /// specification with a `paths` map. Prints endpoints grouped by folder
    /// or tag, the total count, and every `{{variable}}` referenced.
    Catalog {
        /// Collection or specification JSON file
        file: PathBuf,

        /// Print catalog rows as JSON instead of a grouped listing
        #[arg(long)]
        json: bool,

        /// Only show this group and its sub-folders
        #[arg(long)]
        group: Option<String>,
    },

    /// Load test HTTP endpoints
    ///
    /// Dispatch concurrent GET requests round-robin across a target list and
    /// report latency and status code breakdowns.
    Loadtest {
        #[command(subcommand)]
        command: commands::loadtest::LoadtestCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute_command(cli.command)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Catalog { file, json, group } => {
            commands::catalog::execute(&file, json, group.as_deref())
        },
        Commands::Loadtest { command } => command.execute(),
    }
}
