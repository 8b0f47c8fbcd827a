//! Error types for collection parsing.

/// Errors that abort a parse call. No catalog is produced when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document is valid JSON but is neither a collection export (`item`
    /// array) nor a flat specification (`paths` object).
    #[error(
        "Unsupported file format: expected a collection with an `item` array \
         or a specification with a `paths` object"
    )]
    UnsupportedFormat,

    /// The input is not valid JSON.
    #[error("Failed to parse JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// The input file could not be read from disk.
    #[error("Failed to read collection file '{path}': {source}")]
    Io {
        source: std::io::Error,
        path: String,
    },
}

impl ParseError {
    /// Returns `true` for the unsupported-shape classification.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat)
    }
}
