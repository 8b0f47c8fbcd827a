//! JSON report serialization for load test results.
//!
//! Produces a schema-versioned JSON file holding the run settings, the
//! aggregate metrics, a per-status breakdown, and every raw result, for
//! consumption by CI pipelines or later analysis.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::loadtest::engine::LoadTestRun;
use crate::loadtest::metrics::{LatencyDistribution, Outcome, OutcomeGroup, Summary};

/// Schema version for the JSON report format.
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON report structure.
#[derive(Debug, Serialize)]
pub struct LoadTestReport {
    /// Report format version for parser compatibility.
    pub schema_version: String,
    /// RFC 3339 timestamp when the report was generated.
    pub timestamp: String,
    /// Actual run duration in seconds.
    pub duration_secs: f64,
    /// Settings the run was executed with.
    pub settings: ReportSettings,
    /// Targets in round-robin order.
    pub targets: Vec<String>,
    /// Aggregate metrics.
    pub metrics: ReportMetrics,
    /// Per-outcome breakdown keyed by status code or `"ERROR"`.
    pub status_breakdown: BTreeMap<String, OutcomeGroup>,
    /// Error counts by classification.
    pub errors: BTreeMap<String, u64>,
    /// One row per dispatched request.
    pub results: Vec<ResultRow>,
}

/// Run settings as requested and as executed.
#[derive(Debug, Serialize)]
pub struct ReportSettings {
    pub requested_volume: u64,
    pub effective_count: u64,
    pub concurrency: u32,
}

/// Aggregate metrics section.
#[derive(Debug, Serialize)]
pub struct ReportMetrics {
    pub total_requests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    /// Percentage of requests answered with status 200.
    pub success_rate: f64,
    pub throughput_rps: f64,
    pub latency: LatencyDistribution,
}

/// Serialized form of one [`RequestResult`](crate::loadtest::metrics::RequestResult).
#[derive(Debug, Serialize)]
pub struct ResultRow {
    pub url: String,
    /// Status code, or `"ERROR"`.
    pub status: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadTestReport {
    /// Build a report from a finished run and its summary.
    pub fn from_run(run: &LoadTestRun, summary: &Summary) -> Self {
        let status_breakdown = summary
            .by_outcome
            .iter()
            .map(|(key, group)| (key.to_string(), group.clone()))
            .collect();

        let results = run
            .results
            .iter()
            .map(|result| ResultRow {
                url: result.target_url.clone(),
                status: result.outcome.clone(),
                latency_ms: result.latency_ms,
                error: result.error_description(),
            })
            .collect();

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration_secs: run.elapsed.as_secs_f64(),
            settings: ReportSettings {
                requested_volume: run.requested_volume,
                effective_count: run.effective_count,
                concurrency: run.concurrency,
            },
            targets: run.targets.clone(),
            metrics: ReportMetrics {
                total_requests: summary.total,
                success_count: summary.success_count,
                failure_count: summary.failure_count,
                success_rate: summary.success_rate,
                throughput_rps: run.requests_per_second(),
                latency: summary.latency.clone(),
            },
            status_breakdown,
            errors: summary.error_categories.clone(),
            results,
        }
    }
}

/// Write a report under `<base_dir>/.apiprobe/reports/`.
///
/// Creates the directory if needed. Returns the written file's path.
pub fn write_report(report: &LoadTestReport, base_dir: &Path) -> Result<PathBuf, std::io::Error> {
    let reports_dir = base_dir.join(".apiprobe").join("reports");
    std::fs::create_dir_all(&reports_dir)?;

    let report_path = reports_dir.join(report_filename(&chrono::Utc::now()));
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(&report_path, json)?;

    tracing::debug!(path = %report_path.display(), "Wrote load test report");
    Ok(report_path)
}

/// `loadtest-YYYY-MM-DDTHH-MM-SS.json`. Hyphens instead of colons keep the
/// name valid on Windows.
pub fn report_filename(timestamp: &chrono::DateTime<chrono::Utc>) -> String {
    format!("loadtest-{}.json", timestamp.format("%Y-%m-%dT%H-%M-%S"))
}
