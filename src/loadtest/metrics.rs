//! Raw request outcomes and their aggregation into a [`Summary`].
//!
//! Workers produce one [`RequestResult`] per dispatched request. After a run
//! completes, [`summarize`] (or a [`MetricsRecorder`] fed incrementally)
//! derives the success rate, the latency distribution, and a per-outcome
//! breakdown.
//!
//! # Design
//!
//! - **Strict success**: only status `200` counts as a success. Other 2xx/3xx
//!   codes and every `ERROR` outcome are failures.
//! - **Latency only when completed**: `ERROR` outcomes carry no latency and
//!   never enter a histogram.
//! - **Microsecond resolution**: latencies are recorded into HdrHistogram as
//!   whole microseconds and reported back in milliseconds with 2 decimals.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::{Serialize, Serializer};

use crate::loadtest::error::RequestError;

/// Tag used in place of a status code when a request could not complete.
pub const ERROR_TAG: &str = "ERROR";

/// The only status code counted as a success.
pub const SUCCESS_STATUS: u16 = 200;

/// Outcome of a single dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request completed and the server answered with this status code.
    Status(u16),
    /// The request failed before a response was received.
    Error(RequestError),
}

impl Outcome {
    /// Grouping key for this outcome.
    pub fn key(&self) -> OutcomeKey {
        match self {
            Self::Status(code) => OutcomeKey::Status(*code),
            Self::Error(_) => OutcomeKey::Error,
        }
    }

    /// Returns `true` only for status `200`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Status(SUCCESS_STATUS))
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Status(code) => serializer.serialize_u16(*code),
            Self::Error(_) => serializer.serialize_str(ERROR_TAG),
        }
    }
}

/// Outcome value used to partition results: a status code or the `ERROR` tag.
///
/// Orders status codes ascending, with `Error` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutcomeKey {
    /// Numeric HTTP status code.
    Status(u16),
    /// The request did not complete.
    Error,
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{code}"),
            Self::Error => f.write_str(ERROR_TAG),
        }
    }
}

impl Serialize for OutcomeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Raw record of one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestResult {
    /// URL the request was sent to.
    pub target_url: String,
    /// Status code or error.
    pub outcome: Outcome,
    /// Wall-clock latency in milliseconds, rounded to 2 decimals.
    /// `None` when the outcome is an error.
    pub latency_ms: Option<f64>,
}

impl RequestResult {
    /// A request that completed with `status` after `elapsed`.
    pub fn completed(target_url: impl Into<String>, status: u16, elapsed: Duration) -> Self {
        Self {
            target_url: target_url.into(),
            outcome: Outcome::Status(status),
            latency_ms: Some(round_ms(elapsed)),
        }
    }

    /// A request that failed with `err`. No latency is recorded.
    pub fn failed(target_url: impl Into<String>, err: RequestError) -> Self {
        Self {
            target_url: target_url.into(),
            outcome: Outcome::Error(err),
            latency_ms: None,
        }
    }

    /// Error description for failed requests.
    pub fn error_description(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Error(err) => Some(err.to_string()),
            Outcome::Status(_) => None,
        }
    }
}

/// Convert a duration to milliseconds rounded to 2 decimals.
pub fn round_ms(elapsed: Duration) -> f64 {
    round2(elapsed.as_secs_f64() * 1000.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Latency distribution in milliseconds. All zero when `count` is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyDistribution {
    /// Number of latencies recorded.
    pub count: u64,
    /// Fastest latency.
    pub min_ms: f64,
    /// Slowest latency.
    pub max_ms: f64,
    /// Arithmetic mean.
    pub mean_ms: f64,
    /// Median.
    pub p50_ms: f64,
    /// 95th percentile.
    pub p95_ms: f64,
    /// 99th percentile.
    pub p99_ms: f64,
}

/// HdrHistogram-backed latency recorder.
///
/// Min, max and mean are tracked exactly; percentiles come from the histogram.
struct LatencyRecorder {
    histogram: Histogram<u64>,
    count: u64,
    sum_ms: f64,
    min_ms: f64,
    max_ms: f64,
}

impl LatencyRecorder {
    fn new() -> Self {
        let mut histogram = Histogram::<u64>::new(3).expect("3 sigfigs is always valid");
        histogram.auto(true);

        Self {
            histogram,
            count: 0,
            sum_ms: 0.0,
            min_ms: f64::MAX,
            max_ms: 0.0,
        }
    }

    fn record(&mut self, latency_ms: f64) {
        let latency_ms = latency_ms.max(0.0);
        let _ = self.histogram.record((latency_ms * 1000.0).round() as u64);
        self.count += 1;
        self.sum_ms += latency_ms;
        self.min_ms = self.min_ms.min(latency_ms);
        self.max_ms = self.max_ms.max(latency_ms);
    }

    fn quantile_ms(&self, quantile: f64) -> f64 {
        round2(self.histogram.value_at_quantile(quantile) as f64 / 1000.0)
    }

    fn distribution(&self) -> LatencyDistribution {
        if self.count == 0 {
            return LatencyDistribution::default();
        }
        LatencyDistribution {
            count: self.count,
            min_ms: self.min_ms,
            max_ms: self.max_ms,
            mean_ms: round2(self.sum_ms / self.count as f64),
            p50_ms: self.quantile_ms(0.50),
            p95_ms: self.quantile_ms(0.95),
            p99_ms: self.quantile_ms(0.99),
        }
    }
}

/// Results sharing one outcome value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutcomeGroup {
    /// Number of results with this outcome.
    pub count: u64,
    /// Latency distribution of those results (empty for `ERROR`).
    pub latency: LatencyDistribution,
}

/// Aggregated view of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Number of results summarized.
    pub total: u64,
    /// Results with status `200`.
    pub success_count: u64,
    /// Every other result.
    pub failure_count: u64,
    /// `success_count / total * 100`, or 0 when there are no results.
    pub success_rate: f64,
    /// Latencies of every result that completed, in result order.
    pub latency_values: Vec<f64>,
    /// Distribution over `latency_values`.
    pub latency: LatencyDistribution,
    /// Per-outcome counts and latency distributions.
    pub by_outcome: BTreeMap<OutcomeKey, OutcomeGroup>,
    /// Error counts by classification (timeout, connection, other).
    pub error_categories: BTreeMap<String, u64>,
}

/// Incremental recorder producing a [`Summary`].
///
/// Designed for single-owner usage -- no internal locking.
pub struct MetricsRecorder {
    overall: LatencyRecorder,
    per_outcome: BTreeMap<OutcomeKey, (u64, LatencyRecorder)>,
    latency_values: Vec<f64>,
    total: u64,
    success_count: u64,
    error_categories: BTreeMap<String, u64>,
}

impl MetricsRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            overall: LatencyRecorder::new(),
            per_outcome: BTreeMap::new(),
            latency_values: Vec::new(),
            total: 0,
            success_count: 0,
            error_categories: BTreeMap::new(),
        }
    }

    /// Record one result.
    pub fn record(&mut self, result: &RequestResult) {
        self.total += 1;
        if result.outcome.is_success() {
            self.success_count += 1;
        }
        if let Outcome::Error(err) = &result.outcome {
            *self
                .error_categories
                .entry(err.error_category().to_owned())
                .or_insert(0) += 1;
        }

        let (count, group) = self
            .per_outcome
            .entry(result.outcome.key())
            .or_insert_with(|| (0, LatencyRecorder::new()));
        *count += 1;

        if let Some(latency_ms) = result.latency_ms {
            group.record(latency_ms);
            self.overall.record(latency_ms);
            self.latency_values.push(latency_ms);
        }
    }

    /// Number of results recorded so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Success rate as a percentage. Returns 0.0 if nothing was recorded.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.total as f64 * 100.0
    }

    /// Capture the current state as a [`Summary`].
    pub fn summary(&self) -> Summary {
        let by_outcome = self
            .per_outcome
            .iter()
            .map(|(key, (count, latency))| {
                (
                    *key,
                    OutcomeGroup {
                        count: *count,
                        latency: latency.distribution(),
                    },
                )
            })
            .collect();

        Summary {
            total: self.total,
            success_count: self.success_count,
            failure_count: self.total - self.success_count,
            success_rate: self.success_rate(),
            latency_values: self.latency_values.clone(),
            latency: self.overall.distribution(),
            by_outcome,
            error_categories: self.error_categories.clone(),
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Summarize a finished set of results.
pub fn summarize(results: &[RequestResult]) -> Summary {
    let mut recorder = MetricsRecorder::new();
    for result in results {
        recorder.record(result);
    }
    recorder.summary()
}
