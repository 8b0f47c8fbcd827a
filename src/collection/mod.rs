//! API collection parsing.
//!
//! Provides shape detection for collection exports and flat path-keyed
//! specifications, an endpoint catalog grouped by folder or tag, and
//! `{{variable}}` placeholder extraction.

pub mod catalog;
pub mod error;
pub mod parser;
pub mod variables;

pub use catalog::{CatalogRow, Endpoint, EndpointCatalog};
pub use error::ParseError;
pub use parser::{parse_file, parse_str, parse_value, DocumentShape};
