//! `apiprobe loadtest init` command implementation.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use apiprobe::collection::{parse_file, EndpointCatalog};
use apiprobe::loadtest::config::{DEFAULT_CONCURRENCY, DEFAULT_REQUESTED_VOLUME};

/// Execute the `loadtest init` command.
///
/// Creates `.apiprobe/loadtest.toml`. If a collection is given, its
/// dispatchable URLs are written as targets, templated URLs are listed as
/// comments, and every placeholder gets a commented `[variables]` entry.
pub fn execute_init(collection: Option<PathBuf>, force: bool) -> Result<()> {
    let config_dir = std::env::current_dir()?.join(".apiprobe");
    let config_path = config_dir.join("loadtest.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}\n\
             Use `--force` to overwrite.",
            config_path.display()
        );
    }

    let content = match collection {
        Some(path) => {
            let catalog = parse_file(&path)
                .with_context(|| format!("Failed to parse collection '{}'", path.display()))?;
            eprintln!(
                "Discovered {} endpoint(s) in {}",
                catalog.total(),
                path.display()
            );
            generate_collection_template(&path, &catalog)
        },
        None => generate_default_template(),
    };

    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(&config_path, &content)?;
    eprintln!("Created {}", config_path.display());
    eprintln!("Edit the file to set targets and variables.");

    Ok(())
}

fn settings_block() -> String {
    format!(
        r#"[settings]
# Requested number of GET requests. The run dispatches the largest multiple
# of the target count that does not exceed this value.
requested_volume = {DEFAULT_REQUESTED_VOLUME}

# Number of concurrent workers
concurrency = {DEFAULT_CONCURRENCY}
"#
    )
}

/// Default template without collection discovery.
fn generate_default_template() -> String {
    format!(
        r#"# Load test configuration for apiprobe

# Target URLs, dispatched round-robin. May use {{{{name}}}} placeholders
# resolved from [variables].
targets = [
    # "https://api.example.com/health",
]

{}
[variables]
# base_url = "https://api.example.com"
"#,
        settings_block()
    )
}

/// Template populated from a parsed collection.
fn generate_collection_template(source: &Path, catalog: &EndpointCatalog) -> String {
    let no_vars = HashMap::new();
    let ready = catalog.select_targets(None, &no_vars);

    let mut templated: Vec<&str> = Vec::new();
    for endpoint in catalog.endpoints() {
        if !endpoint.variables.is_empty()
            && !endpoint.path.is_empty()
            && !templated.contains(&endpoint.path.as_str())
        {
            templated.push(endpoint.path.as_str());
        }
    }

    let mut content = format!(
        "# Load test configuration for apiprobe\n# Generated from collection: {}\n\n",
        source.display()
    );

    content.push_str("targets = [\n");
    for url in &ready {
        content.push_str(&format!("    {},\n", toml_string(url)));
    }
    if !templated.is_empty() {
        content.push_str("    # Templated URLs: uncomment once [variables] are set\n");
        for url in &templated {
            content.push_str(&format!("    # {},\n", toml_string(url)));
        }
    }
    content.push_str("]\n\n");

    content.push_str(&settings_block());
    content.push_str("\n[variables]\n");
    for name in catalog.all_variables() {
        content.push_str(&format!("# {} = \"\"\n", toml_key(name)));
    }

    content
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_owned()).to_string()
}

fn toml_key(name: &str) -> String {
    let bare = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        name.to_owned()
    } else {
        toml_string(name)
    }
}
