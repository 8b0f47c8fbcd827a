//! End-to-end tests for collection and specification parsing.

use std::collections::HashMap;
use std::io::Write;

use apiprobe::collection::{parse_file, parse_str, ParseError};
use pretty_assertions::assert_eq;
use serde_json::json;

const NESTED_COLLECTION: &str = r#"{
    "info": {"name": "Shop"},
    "item": [
        {"name": "Users", "item": [
            {"name": "List users", "request": {"method": "GET", "url": {"raw": "{{base}}/users"}}},
            {"name": "Get user", "request": {"method": "GET", "url": "{{base}}/users/{{id}}"}}
        ]},
        {"name": "Orders", "item": [
            {"name": "Create order", "request": {
                "method": "POST",
                "url": "{{base}}/orders",
                "header": [{"key": "Authorization", "value": "Bearer {{token}}"}],
                "body": {"mode": "raw", "raw": "{\"sku\": \"{{sku}}\"}"}
            }},
            {"name": "Archive", "item": [
                {"name": "List archived", "request": {"url": "https://shop.example.com/orders/archived"}}
            ]}
        ]},
        {"name": "Health", "request": {"url": "https://shop.example.com/health"}}
    ]
}"#;

#[test]
fn test_nested_collection_groups_and_totals() {
    let catalog = parse_str(NESTED_COLLECTION).unwrap();

    assert_eq!(catalog.total(), 5);
    let labels: Vec<&str> = catalog.groups().keys().map(String::as_str).collect();
    assert_eq!(labels, vec!["Users", "Orders", "Orders/Archive", ""]);
    assert_eq!(
        catalog.groups().values().map(Vec::len).sum::<usize>(),
        catalog.total()
    );

    let vars: Vec<&str> = catalog.all_variables().iter().map(String::as_str).collect();
    assert_eq!(vars, vec!["base", "id", "sku", "token"]);

    let create = &catalog.group("Orders").unwrap()[0];
    assert_eq!(create.name, "Create order");
    assert_eq!(create.body.as_deref(), Some("{\"sku\": \"{{sku}}\"}"));
}

#[test]
fn test_three_nested_folders_five_leaves() {
    let doc = json!({"item": [{"name": "A", "item": [
        {"name": "a1", "request": {"url": "http://x/a1"}},
        {"name": "B", "item": [
            {"name": "b1", "request": {"url": "http://x/b1"}},
            {"name": "C", "item": [
                {"name": "c1", "request": {"url": "http://x/c1"}},
                {"name": "c2", "request": {"url": "http://x/c2"}}
            ]},
            {"name": "b2", "request": {"url": "http://x/b2"}}
        ]}
    ]}]});
    let catalog = parse_str(&doc.to_string()).unwrap();

    assert_eq!(catalog.total(), 5);
    let labels: Vec<&str> = catalog.groups().keys().map(String::as_str).collect();
    assert_eq!(labels, vec!["A", "A/B", "A/B/C"]);
    let b: Vec<&str> = catalog
        .group("A/B")
        .unwrap()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(b, vec!["b1", "b2"]);
}

#[test]
fn test_parsing_is_deterministic() {
    let first = parse_str(NESTED_COLLECTION).unwrap();
    let second = parse_str(NESTED_COLLECTION).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.rows(), second.rows());
}

#[test]
fn test_flat_specification_by_tag() {
    let doc = json!({
        "openapi": "3.0.0",
        "paths": {
            "/pets": {
                "get": {"tags": ["pets"], "summary": "List pets"},
                "post": {
                    "tags": ["pets", "admin"],
                    "requestBody": {"content": {"application/json": {"example": {"name": "Rex"}}}}
                }
            },
            "/stores/{{region}}": {
                "get": {"summary": "Stores"},
                "parameters": [{"name": "region"}]
            }
        }
    });
    let catalog = parse_str(&doc.to_string()).unwrap();

    assert_eq!(catalog.total(), 3);
    let pets = catalog.group("pets").unwrap();
    assert_eq!(pets.len(), 2);
    assert_eq!(pets[0].name, "GET /pets — List pets");
    assert!(pets[1].body.as_deref().unwrap().contains("\"name\": \"Rex\""));

    let untagged = catalog.group("Untagged").unwrap();
    assert_eq!(untagged[0].path, "/stores/{{region}}");
    assert!(catalog.all_variables().contains("region"));
}

#[test]
fn test_select_targets_resolves_and_filters() {
    let catalog = parse_str(NESTED_COLLECTION).unwrap();

    let none = catalog.select_targets(None, &HashMap::new());
    assert_eq!(
        none,
        vec![
            "https://shop.example.com/orders/archived",
            "https://shop.example.com/health"
        ]
    );

    let vars = HashMap::from([
        ("base".to_string(), "http://localhost:8080".to_string()),
        ("id".to_string(), "7".to_string()),
    ]);
    let users = catalog.select_targets(Some("Users"), &vars);
    assert_eq!(
        users,
        vec!["http://localhost:8080/users", "http://localhost:8080/users/7"]
    );

    let orders = catalog.select_targets(Some("Orders"), &vars);
    assert_eq!(
        orders,
        vec![
            "http://localhost:8080/orders",
            "https://shop.example.com/orders/archived"
        ]
    );
}

#[test]
fn test_unsupported_documents() {
    for doc in [json!({"info": {}}), json!([1, 2, 3]), json!({"item": {}}), json!({"paths": []})] {
        let err = parse_str(&doc.to_string()).unwrap_err();
        assert!(err.is_unsupported_format(), "expected unsupported for {doc}");
    }
}

#[test]
fn test_parse_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(NESTED_COLLECTION.as_bytes()).unwrap();
    let catalog = parse_file(file.path()).unwrap();
    assert_eq!(catalog.total(), 5);

    let err = parse_file(&file.path().with_extension("missing")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
}
