//! `apiprobe loadtest run` command implementation.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::PathBuf;

use apiprobe::collection::parse_file;
use apiprobe::loadtest::config::LoadTestConfig;
use apiprobe::loadtest::engine::LoadTestEngine;
use apiprobe::loadtest::report::{write_report, LoadTestReport};
use apiprobe::loadtest::summary::render_summary;

use super::RunArgs;

/// Execute the `loadtest run` command.
///
/// Loads config (explicit path, auto-discovery, or defaults), applies CLI
/// overrides, selects targets, runs the engine, and prints the summary.
pub async fn execute_run(args: RunArgs) -> Result<()> {
    // Step 1: Load config
    let mut config = match args.config.as_ref() {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: {}\nUse `apiprobe loadtest init` to create one.",
                    path.display()
                );
            }
            load_config(path)?
        },
        None => match discover_config() {
            Some(path) => load_config(&path)?,
            None => LoadTestConfig::default(),
        },
    };

    // Step 2: Apply CLI overrides
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid load test settings")?;

    // Step 3: Select targets
    let targets = select_targets(&config, &args)?;
    eprintln!("Load testing {} target(s)", targets.len());

    // Step 4: Run the engine
    let engine = LoadTestEngine::from_settings(&config.settings)
        .with_progress(true)
        .with_no_color(args.no_color);
    let run = engine.run(targets).await.context("Load test failed")?;

    // Step 5: Terminal summary
    if args.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    let summary = run.summary();
    println!("{}", render_summary(&run, &summary));

    // Step 6: JSON report (unless --no-report)
    if !args.no_report {
        let report = LoadTestReport::from_run(&run, &summary);
        let cwd = std::env::current_dir()?;
        match write_report(&report, &cwd) {
            Ok(path) => {
                eprintln!();
                eprintln!("Report written to: {}", path.display());
            },
            Err(e) => {
                eprintln!();
                eprintln!("Warning: Failed to write report: {}", e);
            },
        }
    }

    Ok(())
}

fn load_config(path: &std::path::Path) -> Result<LoadTestConfig> {
    eprintln!("Loading config from: {}", path.display());
    LoadTestConfig::load(path)
        .with_context(|| format!("Failed to load config '{}'", path.display()))
}

/// Apply CLI flag overrides to a loaded config.
fn apply_overrides(config: &mut LoadTestConfig, args: &RunArgs) {
    if let Some(volume) = args.volume {
        config.settings.requested_volume = volume;
    }
    if let Some(concurrency) = args.concurrency {
        config.settings.concurrency = concurrency;
    }
    for (name, value) in &args.vars {
        config.variables.insert(name.clone(), value.clone());
    }
}

/// Pick the target list: `--target` flags, then the collection, then the
/// config file.
fn select_targets(config: &LoadTestConfig, args: &RunArgs) -> Result<Vec<String>> {
    if !args.targets.is_empty() {
        return Ok(args.targets.clone());
    }

    if let Some(path) = args.collection.as_ref() {
        let catalog = parse_file(path)
            .with_context(|| format!("Failed to parse collection '{}'", path.display()))?;
        let targets = catalog.select_targets(args.group.as_deref(), &config.variables);
        if targets.is_empty() {
            let missing: Vec<&str> = catalog
                .all_variables()
                .iter()
                .filter(|name| !config.variables.contains_key(*name))
                .map(String::as_str)
                .collect();
            let hint = if missing.is_empty() {
                String::new()
            } else {
                format!("\nUnresolved variables: {} (set them with --var NAME=VALUE)", missing.join(", "))
            };
            anyhow::bail!(
                "No dispatchable URLs found in '{}'{}",
                path.display(),
                hint
            );
        }
        return Ok(targets);
    }

    if config.targets.is_empty() {
        anyhow::bail!(
            "No targets to load test.\n\
             Pass --target URL, --collection FILE, or add `targets` to .apiprobe/loadtest.toml."
        );
    }
    config
        .validated_targets()
        .context("Invalid targets in config (set placeholders with --var NAME=VALUE)")
}

/// Discover `.apiprobe/loadtest.toml` by walking parent directories.
///
/// Starts from the current working directory and walks up until either
/// the file is found or the filesystem root is reached.
fn discover_config() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(".apiprobe").join("loadtest.toml");
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
