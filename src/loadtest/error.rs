//! Error types for the load testing engine.
//!
//! Defines [`LoadTestError`] for configuration and precondition failures that
//! stop a run before dispatch, and [`RequestError`] for per-request transport
//! failures that are recorded as data and never abort a run.

/// Errors that occur during load test configuration, validation, or file I/O.
#[derive(Debug, thiserror::Error)]
pub enum LoadTestError {
    /// TOML parse failure -- the config file contains invalid TOML syntax
    /// or does not match the expected schema.
    #[error("Failed to parse config TOML: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    /// Semantic validation failure -- the config parsed successfully but
    /// contains invalid values (e.g., zero concurrency).
    #[error("Config validation error: {message}")]
    ConfigValidation { message: String },

    /// File I/O failure -- the config file could not be read from disk.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigIo {
        source: std::io::Error,
        path: String,
    },

    /// The target list is empty.
    #[error("No target URLs to load test")]
    EmptyTargets,

    /// A target is not an absolute `http`/`https` URL.
    #[error("Invalid target URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },
}

/// Transport failure for a single dispatched request.
///
/// Captured into the run's results as an `ERROR` outcome.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request timed out at the transport level.
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure (DNS resolution, TCP connect, TLS handshake).
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Any other failure while sending the request or reading the response.
    #[error("Request error: {message}")]
    Other { message: String },
}

impl RequestError {
    /// Returns the error category as a static string for report breakdowns.
    ///
    /// Categories: `"timeout"`, `"connection"`, `"other"`.
    pub fn error_category(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connection { .. } => "connection",
            Self::Other { .. } => "other",
        }
    }

    /// Classify a [`reqwest::Error`] into the appropriate [`RequestError`] variant.
    pub fn classify_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection {
                message: err.to_string(),
            }
        } else {
            Self::Other {
                message: err.to_string(),
            }
        }
    }
}
