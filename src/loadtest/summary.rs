//! Terminal summary renderer for load test results.
//!
//! [`render_summary`] is a pure function over a finished [`LoadTestRun`] and
//! its [`Summary`]: it returns the text block printed after a run and does
//! no I/O. Color comes from `colored`, which honours the global override set
//! when `--no-color` is active or output is piped.

use colored::Colorize;

use crate::loadtest::engine::LoadTestRun;
use crate::loadtest::metrics::{OutcomeKey, Summary};

/// Width for dotted metric row padding.
const PAD_WIDTH: usize = 32;

/// Render the post-run summary.
///
/// # Layout
///
/// ```text
///   apiprobe loadtest
///   -----------------------------------------
///   targets:     2
///   requested:   7
///   dispatched:  6
///   concurrency: 100
///
///   http_reqs.......................: 6
///   http_req_success................: 4
///   http_req_failed.................: 2
///   http_req_success_rate...........: 66.67%
///   http_req_duration...............: min=1.2ms  avg=3.4ms  p50=3ms  p95=6.1ms  p99=6.1ms  max=6.1ms
///   http_req_throughput.............: 512.3 req/s
///   elapsed.........................: 0.0s
///
///   note: requested 7 but dispatched 6 (1 short: volume is not a multiple of 2 targets)
///
///   status   count   p50       p95       p99
///   200      4       ...
///   ERROR    2       -         -         -
/// ```
pub fn render_summary(run: &LoadTestRun, summary: &Summary) -> String {
    let mut lines = vec![render_header(run)];

    lines.push(format_metric_row("http_reqs", &summary.total.to_string()));
    lines.push(format_metric_row(
        "http_req_success",
        &summary.success_count.to_string().green().to_string(),
    ));

    let failed = summary.failure_count.to_string();
    let failed = if summary.failure_count > 0 {
        failed.red().to_string()
    } else {
        failed
    };
    lines.push(format_metric_row("http_req_failed", &failed));

    let rate = format!("{:.2}%", summary.success_rate);
    let rate = if summary.total == 0 {
        rate
    } else if summary.success_rate >= 99.0 {
        rate.green().to_string()
    } else if summary.success_rate >= 95.0 {
        rate.yellow().to_string()
    } else {
        rate.red().to_string()
    };
    lines.push(format_metric_row("http_req_success_rate", &rate));

    let latency = &summary.latency;
    let duration = if latency.count == 0 {
        "-".to_string()
    } else {
        format!(
            "min={}ms  avg={}ms  p50={}ms  p95={}ms  p99={}ms  max={}ms",
            latency.min_ms,
            latency.mean_ms,
            latency.p50_ms,
            latency.p95_ms,
            latency.p99_ms,
            latency.max_ms
        )
    };
    lines.push(format_metric_row("http_req_duration", &duration));

    lines.push(format_metric_row(
        "http_req_throughput",
        &format!("{:.1} req/s", run.requests_per_second()),
    ));
    lines.push(format_metric_row(
        "elapsed",
        &format!("{:.1}s", run.elapsed.as_secs_f64()),
    ));

    if run.is_under_dispatched() {
        lines.push(String::new());
        lines.push(format!(
            "  {} requested {} but dispatched {} ({} short: volume is not a multiple of {} targets)",
            "note:".yellow().bold(),
            run.requested_volume,
            run.effective_count,
            run.shortfall(),
            run.targets.len()
        ));
    }

    if !summary.by_outcome.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "  {:<8} {:>7} {:>10} {:>10} {:>10}",
            "status", "count", "p50", "p95", "p99"
        ));
        lines.push(format!("  {}", "-".repeat(49)));
        for (key, group) in &summary.by_outcome {
            let label = key.to_string();
            let label = match key {
                OutcomeKey::Status(200) => label.green().to_string(),
                OutcomeKey::Status(_) => label.yellow().to_string(),
                OutcomeKey::Error => label.red().to_string(),
            };
            let (p50, p95, p99) = if group.latency.count == 0 {
                ("-".to_string(), "-".to_string(), "-".to_string())
            } else {
                (
                    format!("{}ms", group.latency.p50_ms),
                    format!("{}ms", group.latency.p95_ms),
                    format!("{}ms", group.latency.p99_ms),
                )
            };
            lines.push(format!(
                "  {label:<8} {:>7} {p50:>10} {p95:>10} {p99:>10}",
                group.count
            ));
        }
    }

    if !summary.error_categories.is_empty() {
        lines.push(String::new());
        lines.push("  errors:".to_string());
        let mut categories: Vec<_> = summary.error_categories.iter().collect();
        categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (category, count) in categories {
            lines.push(format_metric_row(
                &format!("  {category}"),
                &count.to_string().red().to_string(),
            ));
        }
    }

    lines.join("\n")
}

fn render_header(run: &LoadTestRun) -> String {
    format!(
        "\n  {}\n  {}\n  targets:     {}\n  requested:   {}\n  dispatched:  {}\n  concurrency: {}\n",
        "apiprobe loadtest".bold(),
        "-".repeat(41),
        run.targets.len(),
        run.requested_volume,
        run.effective_count,
        run.concurrency,
    )
}

/// `"  name........: value"`, dot-padded to [`PAD_WIDTH`].
fn format_metric_row(name: &str, value: &str) -> String {
    format!("  {name:.<PAD_WIDTH$}: {value}")
}
