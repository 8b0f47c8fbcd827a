//! `{{variable}}` placeholder extraction and substitution.
//!
//! Placeholders use the double-brace syntax common to collection exports.
//! Matching is lazy and non-overlapping; nested braces are not supported, so
//! `{{a{{b}}}}` yields the single name `a{{b`.

use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid"));

/// Extract the distinct placeholder names found in `text`.
///
/// ```
/// use apiprobe::collection::variables::extract;
///
/// let vars = extract("https://api.x.com/{{host}}/v1/{{id}}/{{id}}");
/// assert_eq!(vars.into_iter().collect::<Vec<_>>(), vec!["host", "id"]);
/// ```
pub fn extract(text: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Extract placeholders from an arbitrary JSON value.
///
/// Only strings are scanned. Every other value yields the empty set.
pub fn extract_value(value: &Value) -> BTreeSet<String> {
    match value {
        Value::String(text) => extract(text),
        _ => BTreeSet::new(),
    }
}

/// Replace every placeholder with a known value.
///
/// Placeholders without an entry in `vars` are left untouched so the caller
/// can still see what is unresolved.
pub fn resolve(text: &str, vars: &HashMap<String, String>) -> String {
    if vars.is_empty() {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Returns `true` if `text` still contains at least one placeholder.
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}
