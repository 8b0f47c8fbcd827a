//! Collection document parsing.
//!
//! Two document shapes are recognized:
//!
//! - **Hierarchical collection**: `{"item": [...]}` where each item is either a
//!   request leaf (`request` key) or a folder (`item` array). Folder names are
//!   joined with `/` to form the group label.
//! - **Flat specification**: `{"paths": {"/path": {"get": {...}}}}` where every
//!   path/method pair becomes one endpoint grouped by its first tag.
//!
//! Anything else is rejected with [`ParseError::UnsupportedFormat`]. Within a
//! recognized shape, missing or malformed fields fall back to defaults and never
//! abort the parse.
//!
//! Folder traversal is iterative over an explicit frame stack, so deeply
//! nested collections cannot exhaust the call stack.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

use crate::collection::catalog::{Endpoint, EndpointCatalog, UNNAMED};
use crate::collection::error::ParseError;
use crate::collection::variables;

/// Group label for operations that declare no tag.
pub const UNTAGGED: &str = "Untagged";

/// Operation keys of a path item that are treated as HTTP methods.
const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Shape of a top-level document, resolved once at parse entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DocumentShape<'a> {
    /// Collection export with a top-level `item` array.
    HierarchicalCollection(&'a [Value]),
    /// Path-keyed specification with a top-level `paths` object.
    FlatSpecification(&'a Map<String, Value>),
    /// Neither shape matched.
    Unsupported,
}

impl<'a> DocumentShape<'a> {
    /// Classify a document. `item` takes precedence over `paths`.
    pub fn detect(document: &'a Value) -> Self {
        if let Some(items) = document.get("item").and_then(Value::as_array) {
            return Self::HierarchicalCollection(items);
        }
        if let Some(paths) = document.get("paths").and_then(Value::as_object) {
            return Self::FlatSpecification(paths);
        }
        Self::Unsupported
    }

    /// Short label for logs and terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::HierarchicalCollection(_) => "collection",
            Self::FlatSpecification(_) => "specification",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Parse an already-decoded JSON document into an [`EndpointCatalog`].
pub fn parse_value(document: &Value) -> Result<EndpointCatalog, ParseError> {
    let shape = DocumentShape::detect(document);
    tracing::debug!(shape = shape.label(), "Detected document shape");

    let mut catalog = EndpointCatalog::default();
    match shape {
        DocumentShape::HierarchicalCollection(items) => walk_collection(items, &mut catalog),
        DocumentShape::FlatSpecification(paths) => walk_specification(paths, &mut catalog),
        DocumentShape::Unsupported => return Err(ParseError::UnsupportedFormat),
    }

    tracing::info!(
        shape = shape.label(),
        endpoints = catalog.total(),
        groups = catalog.groups().len(),
        "Parsed document"
    );
    Ok(catalog)
}

/// Parse a JSON string into an [`EndpointCatalog`].
pub fn parse_str(content: &str) -> Result<EndpointCatalog, ParseError> {
    let document: Value = serde_json::from_str(content)?;
    parse_value(&document)
}

/// Read and parse a JSON file into an [`EndpointCatalog`].
pub fn parse_file(path: &Path) -> Result<EndpointCatalog, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        source,
        path: path.display().to_string(),
    })?;
    parse_str(&content)
}

/// Pending items of one folder level plus the group label they belong to.
struct Frame<'a> {
    items: std::slice::Iter<'a, Value>,
    group: String,
}

/// Depth-first walk over collection items, preserving document order.
fn walk_collection(items: &[Value], catalog: &mut EndpointCatalog) {
    let mut stack = vec![Frame {
        items: items.iter(),
        group: String::new(),
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(item) = frame.items.next() else {
            stack.pop();
            continue;
        };

        let name = item_name(item);
        if let Some(request) = item.get("request") {
            catalog.push(request_endpoint(name, frame.group.clone(), request));
        } else if let Some(children) = item.get("item").and_then(Value::as_array) {
            let group = if frame.group.is_empty() {
                name
            } else {
                format!("{}/{}", frame.group, name)
            };
            stack.push(Frame {
                items: children.iter(),
                group,
            });
        } else {
            tracing::debug!(item = %name, "Skipping item with neither request nor children");
        }
    }
}

fn item_name(item: &Value) -> String {
    item.get("name")
        .and_then(Value::as_str)
        .unwrap_or(UNNAMED)
        .to_string()
}

/// Build one endpoint from a collection request leaf.
fn request_endpoint(name: String, group: String, request: &Value) -> Endpoint {
    let path = request_url(request);
    let mut vars = variables::extract(&path);

    if let Some(headers) = request.get("header").and_then(Value::as_array) {
        for header in headers {
            match header {
                Value::Object(_) => {
                    if let Some(value) = header.get("value") {
                        vars.extend(variables::extract_value(value));
                    }
                },
                other => vars.extend(variables::extract_value(other)),
            }
        }
    }

    let body = request
        .get("body")
        .and_then(|body| body.get("raw"))
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(raw) = &body {
        vars.extend(variables::extract(raw));
    }

    Endpoint {
        name,
        group,
        path,
        variables: vars,
        body,
    }
}

/// Request URL as written: a bare string, `url` string, or `url.raw`.
fn request_url(request: &Value) -> String {
    let url = match request {
        Value::String(url) => return url.clone(),
        Value::Object(_) => request.get("url"),
        _ => None,
    };
    match url {
        Some(Value::String(raw)) => raw.clone(),
        Some(url) => url
            .get("raw")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    }
}

/// Emit one endpoint per (path, method) pair in declaration order.
fn walk_specification(paths: &Map<String, Value>, catalog: &mut EndpointCatalog) {
    for (path, path_item) in paths {
        let Some(operations) = path_item.as_object() else {
            tracing::debug!(path = %path, "Skipping path item that is not an object");
            continue;
        };
        for (method, operation) in operations {
            if !HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                continue;
            }
            if !operation.is_object() {
                tracing::debug!(path = %path, method = %method, "Skipping malformed operation");
                continue;
            }
            catalog.push(operation_endpoint(path, method, operation));
        }
    }
}

fn operation_endpoint(path: &str, method: &str, operation: &Value) -> Endpoint {
    let method = method.to_ascii_uppercase();
    let summary = operation
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{method} {path}"));

    let group = operation
        .get("tags")
        .and_then(Value::as_array)
        .and_then(|tags| tags.first())
        .and_then(Value::as_str)
        .unwrap_or(UNTAGGED)
        .to_string();

    let body = operation
        .pointer("/requestBody/content/application~1json/example")
        .filter(|example| !example.is_null())
        .and_then(|example| serde_json::to_string_pretty(example).ok());

    let variables: BTreeSet<String> = variables::extract(path);

    Endpoint {
        name: format!("{method} {path} — {summary}"),
        group,
        path: path.to_string(),
        variables,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_shapes() {
        let collection = json!({"item": []});
        let spec = json!({"paths": {}});
        let neither = json!({"info": {}});
        let item_not_array = json!({"item": "nope"});

        assert!(matches!(
            DocumentShape::detect(&collection),
            DocumentShape::HierarchicalCollection(_)
        ));
        assert!(matches!(
            DocumentShape::detect(&spec),
            DocumentShape::FlatSpecification(_)
        ));
        assert_eq!(DocumentShape::detect(&neither), DocumentShape::Unsupported);
        assert_eq!(
            DocumentShape::detect(&item_not_array),
            DocumentShape::Unsupported
        );
        assert_eq!(DocumentShape::detect(&json!([1, 2])), DocumentShape::Unsupported);
    }

    #[test]
    fn test_item_wins_over_paths() {
        let doc = json!({"item": [], "paths": {"/x": {"get": {}}}});
        let catalog = parse_value(&doc).unwrap();
        assert_eq!(catalog.total(), 0);
    }

    #[test]
    fn test_request_leaf_collects_all_variables() {
        let doc = json!({"item": [{
            "name": "Create user",
            "request": {
                "method": "POST",
                "url": {"raw": "{{base_url}}/users", "host": ["{{base_url}}"]},
                "header": [
                    {"key": "Authorization", "value": "Bearer {{token}}"},
                    {"key": "X-Count", "value": 3}
                ],
                "body": {"mode": "raw", "raw": "{\"org\": \"{{org_id}}\"}"}
            }
        }]});
        let catalog = parse_value(&doc).unwrap();
        let ep = &catalog.group("").unwrap()[0];

        assert_eq!(ep.name, "Create user");
        assert_eq!(ep.path, "{{base_url}}/users");
        assert_eq!(
            ep.variables.iter().cloned().collect::<Vec<_>>(),
            vec!["base_url", "org_id", "token"]
        );
        assert_eq!(ep.body.as_deref(), Some("{\"org\": \"{{org_id}}\"}"));
    }

    #[test]
    fn test_request_leaf_defaults() {
        let doc = json!({"item": [
            {"request": {}},
            {"name": 7, "request": "https://example.com/{{v}}"},
            {"name": "Form", "request": {"url": "https://x", "body": {"mode": "formdata"}}}
        ]});
        let catalog = parse_value(&doc).unwrap();
        let eps = catalog.group("").unwrap();

        assert_eq!(eps[0].name, "Unnamed");
        assert_eq!(eps[0].path, "");
        assert!(eps[0].variables.is_empty());
        assert_eq!(eps[1].name, "Unnamed");
        assert_eq!(eps[1].path, "https://example.com/{{v}}");
        assert!(eps[1].variables.contains("v"));
        assert!(eps[2].body.is_none());
    }

    #[test]
    fn test_folder_paths_join_with_slash() {
        let doc = json!({"item": [{
            "name": "A",
            "item": [
                {"name": "a1", "request": {"url": "u1"}},
                {"name": "B", "item": [{"name": "b1", "request": {"url": "u2"}}]},
                {"name": "a2", "request": {"url": "u3"}}
            ]
        }]});
        let catalog = parse_value(&doc).unwrap();
        assert_eq!(
            catalog.groups().keys().collect::<Vec<_>>(),
            vec!["A", "A/B"]
        );
        let names: Vec<_> = catalog.group("A").unwrap().iter().map(|e| &e.name).collect();
        assert_eq!(names, vec!["a1", "a2"]);
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut node = json!({"name": "leaf", "request": {"url": "http://x"}});
        for depth in 0..100 {
            node = json!({"name": format!("f{depth}"), "item": [node]});
        }
        let doc = json!({"item": [node]});
        let catalog = parse_value(&doc).unwrap();
        assert_eq!(catalog.total(), 1);
        let group = catalog.groups().keys().next().unwrap();
        assert_eq!(group.split('/').count(), 100);
        assert!(group.starts_with("f99/f98"));
    }

    #[test]
    fn test_flat_specification_endpoints() {
        let doc = json!({"paths": {
            "/users/{id}": {
                "parameters": [],
                "get": {"tags": ["Users", "Admin"], "summary": "Fetch user"},
                "post": {
                    "requestBody": {"content": {"application/json": {"example": {"name": "a"}}}}
                }
            },
            "/{{tenant}}/health": {"get": {"tags": []}}
        }});
        let catalog = parse_value(&doc).unwrap();
        assert_eq!(catalog.total(), 3);

        let users = catalog.group("Users").unwrap();
        assert_eq!(users[0].name, "GET /users/{id} — Fetch user");
        assert!(users[0].body.is_none());

        let untagged = catalog.group(UNTAGGED).unwrap();
        assert_eq!(untagged[0].name, "POST /users/{id} — POST /users/{id}");
        assert_eq!(untagged[0].body.as_deref(), Some("{\n  \"name\": \"a\"\n}"));
        assert!(untagged[1].variables.contains("tenant"));
    }

    #[test]
    fn test_flat_specification_null_example_has_no_body() {
        let doc = json!({"paths": {"/a": {"post": {
            "requestBody": {"content": {"application/json": {"example": null}}}
        }}}});
        let catalog = parse_value(&doc).unwrap();
        assert!(catalog.group(UNTAGGED).unwrap()[0].body.is_none());
    }

    #[test]
    fn test_flat_specification_skips_malformed() {
        let doc = json!({"paths": {"/a": "oops", "/b": {"get": "nope", "put": {}}}});
        let catalog = parse_value(&doc).unwrap();
        assert_eq!(catalog.total(), 1);
        assert_eq!(catalog.endpoints().next().unwrap().name, "PUT /b — PUT /b");
    }

    #[test]
    fn test_unsupported_format() {
        let err = parse_value(&json!({"openapi": "3.0.0"})).unwrap_err();
        assert!(err.is_unsupported_format());
    }

    #[test]
    fn test_parse_str_invalid_json() {
        let err = parse_str("{not json").unwrap_err();
        assert!(matches!(err, ParseError::Json { .. }));
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
