//! # apiprobe
//!
//! Explore API collections and load test the endpoints they describe.
//!
//! The crate has two halves:
//!
//! - [`collection`] turns a collection export (nested `item` folders) or a flat
//!   path-keyed specification (`paths` map) into an [`collection::EndpointCatalog`]
//!   grouped by folder or tag, with every `{{variable}}` placeholder extracted.
//! - [`loadtest`] dispatches concurrent GET requests against a list of target
//!   URLs and summarizes latency and outcome per status code.
//!
//! ```
//! use apiprobe::collection::parse_str;
//!
//! let catalog = parse_str(r#"{"item": [{"name": "Ping", "request": {"url": "{{host}}/ping"}}]}"#)
//!     .unwrap();
//! assert_eq!(catalog.total(), 1);
//! assert!(catalog.all_variables().contains("host"));
//! ```

pub mod collection;
pub mod loadtest;
