//! Concurrent HTTP GET load testing.
//!
//! A run takes a list of target URLs, a requested volume and a concurrency,
//! dispatches `n * floor(volume / n)` requests round-robin across the targets
//! from a fixed worker pool, and returns every raw result for aggregation.
//!
//! - [`engine`]: run orchestration and target validation
//! - [`worker`]: per-worker dispatch loop and the completed counter
//! - [`metrics`]: result types and the [`metrics::Summary`] aggregation
//! - [`config`]: TOML config file
//! - [`summary`] / [`report`] / [`display`]: terminal and JSON output

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;
pub mod summary;
pub mod worker;

pub use config::{LoadTestConfig, Settings};
pub use engine::{effective_count, validate_targets, LoadTestEngine, LoadTestRun};
pub use error::{LoadTestError, RequestError};
pub use metrics::{summarize, Outcome, OutcomeKey, RequestResult, Summary};
pub use worker::CompletedCounter;
