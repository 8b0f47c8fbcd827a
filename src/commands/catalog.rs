//! `apiprobe catalog` command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::Path;

use apiprobe::collection::catalog::group_matches;
use apiprobe::collection::{parse_file, CatalogRow, EndpointCatalog};

/// Execute the `catalog` command.
pub fn execute(file: &Path, json: bool, group: Option<&str>) -> Result<()> {
    let catalog = parse_file(file)
        .with_context(|| format!("Failed to parse collection '{}'", file.display()))?;

    if json {
        let rows = filtered_rows(&catalog, group);
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    println!("{}", render_catalog(&catalog, group));
    Ok(())
}

fn filtered_rows(catalog: &EndpointCatalog, group: Option<&str>) -> Vec<CatalogRow> {
    catalog
        .rows()
        .into_iter()
        .filter(|row| group.map_or(true, |wanted| group_matches(&row.folder_or_tag, wanted)))
        .collect()
}

/// Grouped listing: one heading per group with its endpoint count, then the
/// total and the sorted variable set for the whole document.
fn render_catalog(catalog: &EndpointCatalog, group: Option<&str>) -> String {
    let mut lines = Vec::new();
    for (label, endpoints) in catalog.groups() {
        if group.is_some_and(|wanted| !group_matches(label, wanted)) {
            continue;
        }
        let heading = if label.is_empty() { "(root)" } else { label.as_str() };
        lines.push(format!("{} ({})", heading.bold(), endpoints.len()));
        for endpoint in endpoints {
            let path = if endpoint.path.is_empty() {
                "-".dimmed().to_string()
            } else {
                endpoint.path.clone()
            };
            lines.push(format!("  {:<40} {}", endpoint.name, path));
        }
        lines.push(String::new());
    }

    lines.push(format!("Total endpoints: {}", catalog.total()));
    let variables: Vec<&str> = catalog.all_variables().iter().map(String::as_str).collect();
    if variables.is_empty() {
        lines.push("Variables: none".to_string());
    } else {
        lines.push(format!("Variables: {}", variables.join(", ")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiprobe::collection::parse_str;

    const DOC: &str = r#"{
        "item": [
            {"name": "Users", "item": [
                {"name": "List", "request": {"url": "{{host}}/users"}},
                {"name": "Admin", "item": [
                    {"name": "Admins", "request": {"url": "{{host}}/admins"}}
                ]}
            ]},
            {"name": "Health", "request": {"url": "https://api.example.com/health"}}
        ]
    }"#;

    #[test]
    fn test_render_catalog_lists_groups_and_totals() {
        colored::control::set_override(false);
        let catalog = parse_str(DOC).unwrap();
        let output = render_catalog(&catalog, None);
        assert!(output.contains("Users (1)"), "got: {output}");
        assert!(output.contains("Users/Admin (1)"), "got: {output}");
        assert!(output.contains("(root) (1)"), "got: {output}");
        assert!(output.contains("Total endpoints: 3"));
        assert!(output.contains("Variables: host"));
    }

    #[test]
    fn test_filtered_rows_by_group() {
        let catalog = parse_str(DOC).unwrap();
        let rows = filtered_rows(&catalog, Some("Users"));
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.folder_or_tag.starts_with("Users")));
        assert_eq!(filtered_rows(&catalog, None).len(), 3);
    }
}
