//! Endpoint catalog produced by the collection parser.
//!
//! The catalog maps a group label (folder path or tag) to the endpoints found
//! under it. Group order and endpoint order follow document traversal order,
//! so two parses of the same document always iterate identically.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::collection::variables;

/// Name used when an item carries no usable `name`.
pub const UNNAMED: &str = "Unnamed";

/// A single discovered API operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// Display name of the request or synthesized operation name.
    pub name: String,
    /// Folder path joined by `/`, or the operation's tag.
    pub group: String,
    /// Raw URL or path template. May be empty.
    pub path: String,
    /// Placeholder names found in the URL, headers and body.
    pub variables: BTreeSet<String>,
    /// Raw request body text, when one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// One tabular row for catalog exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    /// Folder path or tag.
    #[serde(rename = "Folder/Tag")]
    pub folder_or_tag: String,
    /// Endpoint name.
    #[serde(rename = "API Name")]
    pub api_name: String,
    /// Endpoint URL or path template.
    #[serde(rename = "API Path")]
    pub api_path: String,
    /// Comma-joined placeholder names.
    #[serde(rename = "Env Variables")]
    pub env_variables: String,
    /// Request body text, empty when absent.
    #[serde(rename = "Request Body")]
    pub request_body: String,
}

/// Endpoints grouped by folder path or tag, in traversal order.
///
/// Built once per parse call and never mutated afterwards. `total` always
/// equals the sum of the per-group lengths and `all_variables` is the union of
/// every endpoint's variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EndpointCatalog {
    groups: IndexMap<String, Vec<Endpoint>>,
    total: usize,
    all_variables: BTreeSet<String>,
}

impl EndpointCatalog {
    /// Append an endpoint to its group, creating the group on first use.
    pub(crate) fn push(&mut self, endpoint: Endpoint) {
        self.all_variables
            .extend(endpoint.variables.iter().cloned());
        self.total += 1;
        self.groups
            .entry(endpoint.group.clone())
            .or_default()
            .push(endpoint);
    }

    /// Group label to ordered endpoints.
    pub fn groups(&self) -> &IndexMap<String, Vec<Endpoint>> {
        &self.groups
    }

    /// Endpoints under a single group label, if the group exists.
    pub fn group(&self, label: &str) -> Option<&[Endpoint]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    /// Total number of endpoints across all groups.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Union of placeholder names across every endpoint.
    pub fn all_variables(&self) -> &BTreeSet<String> {
        &self.all_variables
    }

    /// Returns `true` if no endpoint was found.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterate all endpoints in catalog order.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.groups.values().flatten()
    }

    /// Flatten the catalog into export rows, in catalog order.
    pub fn rows(&self) -> Vec<CatalogRow> {
        self.endpoints()
            .map(|ep| CatalogRow {
                folder_or_tag: ep.group.clone(),
                api_name: ep.name.clone(),
                api_path: ep.path.clone(),
                env_variables: ep
                    .variables
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                request_body: ep.body.clone().unwrap_or_default(),
            })
            .collect()
    }

    /// Select dispatchable target URLs for a load test.
    ///
    /// Each endpoint path has its placeholders resolved from `vars`. Only paths
    /// that end up as absolute `http`/`https` URLs with no placeholder left are
    /// kept. Duplicates are dropped, first occurrence wins.
    ///
    /// `group` limits the selection to a group label and every sub-folder
    /// below it (`Users` matches `Users` and `Users/Admin`).
    pub fn select_targets(
        &self,
        group: Option<&str>,
        vars: &HashMap<String, String>,
    ) -> Vec<String> {
        let mut targets = IndexSet::new();
        for (label, endpoints) in &self.groups {
            if let Some(wanted) = group {
                if !group_matches(label, wanted) {
                    continue;
                }
            }
            for ep in endpoints {
                let resolved = variables::resolve(&ep.path, vars);
                if is_dispatchable(&resolved) {
                    targets.insert(resolved);
                } else {
                    tracing::debug!(endpoint = %ep.name, path = %resolved, "Skipping non-dispatchable path");
                }
            }
        }
        targets.into_iter().collect()
    }
}

/// Returns `true` if `label` is `wanted` or a sub-folder of it.
pub fn group_matches(label: &str, wanted: &str) -> bool {
    label == wanted
        || label
            .strip_prefix(wanted)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Returns `true` for an absolute `http`/`https` URL with no unresolved placeholder.
pub fn is_dispatchable(candidate: &str) -> bool {
    if variables::has_placeholders(candidate) {
        return false;
    }
    match url::Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
