//! Load test execution engine.
//!
//! [`LoadTestEngine`] is the top-level orchestrator that:
//! - Computes the effective request count from the requested volume
//! - Spawns a fixed pool of workers via [`tokio_util::task::TaskTracker`]
//! - Collects every [`RequestResult`] through a bounded mpsc channel
//! - Exposes a [`CompletedCounter`] so callers can observe progress
//!
//! Work is planned round-robin: unit `i` targets `targets[i % n]`. The
//! effective count is `n * floor(requested_volume / n)`, so a volume that is
//! not a multiple of the target count is rounded *down*. The shortfall is
//! reported, never silently topped up.

use crate::loadtest::config::Settings;
use crate::loadtest::display::progress_loop;
use crate::loadtest::error::LoadTestError;
use crate::loadtest::metrics::{summarize, RequestResult, Summary};
use crate::loadtest::worker::{worker_loop, CompletedCounter, WorkQueue};

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use url::Url;

fn _assert_send<T: Send>() {}
#[allow(dead_code)]
fn _check_send_bounds() {
    _assert_send::<RequestResult>();
    _assert_send::<CompletedCounter>();
}

/// Number of requests actually dispatched for `target_count` targets.
///
/// Returns the largest multiple of `target_count` that does not exceed
/// `requested_volume`; zero when there are no targets.
pub fn effective_count(target_count: usize, requested_volume: u64) -> u64 {
    if target_count == 0 {
        return 0;
    }
    let n = target_count as u64;
    n * (requested_volume / n)
}

/// Check that `targets` is non-empty and every entry is an absolute
/// `http`/`https` URL with a host.
pub fn validate_targets(targets: &[String]) -> Result<(), LoadTestError> {
    if targets.is_empty() {
        return Err(LoadTestError::EmptyTargets);
    }
    for target in targets {
        let parsed = Url::parse(target).map_err(|e| LoadTestError::InvalidTarget {
            url: target.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LoadTestError::InvalidTarget {
                url: target.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.host_str().is_none() {
            return Err(LoadTestError::InvalidTarget {
                url: target.clone(),
                reason: "missing host".to_string(),
            });
        }
    }
    Ok(())
}

/// Initial capacity of the result buffer. Bounded by a multiple of the
/// channel size so a huge volume grows the buffer as results arrive instead
/// of reserving it all up front.
fn result_capacity(effective: u64, channel_size: usize) -> usize {
    let cap = channel_size.saturating_mul(16);
    usize::try_from(effective).map_or(cap, |effective| effective.min(cap))
}

/// Everything produced by one [`LoadTestEngine::run`].
#[derive(Debug, Clone)]
pub struct LoadTestRun {
    /// Targets in the order they were dispatched round-robin.
    pub targets: Vec<String>,
    /// Volume the caller asked for.
    pub requested_volume: u64,
    /// Worker pool size the caller asked for.
    pub concurrency: u32,
    /// Units actually dispatched.
    pub effective_count: u64,
    /// One result per dispatched unit, in completion order.
    pub results: Vec<RequestResult>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl LoadTestRun {
    /// Aggregate the results.
    pub fn summary(&self) -> Summary {
        summarize(&self.results)
    }

    /// Returns `true` if fewer requests were dispatched than asked for.
    pub fn is_under_dispatched(&self) -> bool {
        self.effective_count < self.requested_volume
    }

    /// Requests asked for but not dispatched.
    pub fn shortfall(&self) -> u64 {
        self.requested_volume.saturating_sub(self.effective_count)
    }

    /// Observed throughput in requests per second.
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.results.len() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Top-level load test engine configuration and entry point.
pub struct LoadTestEngine {
    requested_volume: u64,
    concurrency: u32,
    completed: CompletedCounter,
    show_progress: bool,
    no_color: bool,
}

impl LoadTestEngine {
    /// Creates an engine for `requested_volume` requests over `concurrency` workers.
    pub fn new(requested_volume: u64, concurrency: u32) -> Self {
        Self {
            requested_volume,
            concurrency,
            completed: CompletedCounter::new(),
            show_progress: false,
            no_color: false,
        }
    }

    /// Creates an engine from config-file settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.requested_volume, settings.concurrency)
    }

    /// Enables the live progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Disables colored output.
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// Handle to the completed-unit counter. Reset to zero at the start of
    /// every run.
    pub fn completed(&self) -> CompletedCounter {
        self.completed.clone()
    }

    /// Returns the requested volume.
    pub fn requested_volume(&self) -> u64 {
        self.requested_volume
    }

    /// Returns the worker pool size.
    pub fn concurrency(&self) -> u32 {
        self.concurrency
    }

    /// Run the load test against `targets` and return every result.
    ///
    /// Fails before dispatch if `targets` is empty, any target is not an
    /// absolute http(s) URL, or concurrency is zero. Per-request failures
    /// never fail the run; they are recorded as `ERROR` results.
    pub async fn run(&self, targets: Vec<String>) -> Result<LoadTestRun, LoadTestError> {
        validate_targets(&targets)?;
        if self.concurrency == 0 {
            return Err(LoadTestError::ConfigValidation {
                message: "concurrency must be greater than 0".to_string(),
            });
        }

        let effective = effective_count(targets.len(), self.requested_volume);
        if effective < self.requested_volume {
            tracing::warn!(
                requested = self.requested_volume,
                effective,
                targets = targets.len(),
                "Requested volume is not a multiple of the target count; dispatching fewer requests"
            );
        }

        self.completed.reset();
        let started = Instant::now();

        if effective == 0 {
            return Ok(LoadTestRun {
                targets,
                requested_volume: self.requested_volume,
                concurrency: self.concurrency,
                effective_count: 0,
                results: Vec::new(),
                elapsed: started.elapsed(),
            });
        }

        let worker_count = u64::from(self.concurrency).min(effective) as u32;
        tracing::info!(
            targets = targets.len(),
            effective,
            workers = worker_count,
            "Starting load test"
        );

        let tracker = TaskTracker::new();
        let cancel = CancellationToken::new();
        let http_client = reqwest::Client::new();
        let queue = Arc::new(WorkQueue::new(targets.clone(), effective));

        let buffer_size = (worker_count as usize).max(1) * 100;
        let (result_tx, mut result_rx) = mpsc::channel::<RequestResult>(buffer_size);

        let display_handle = self.show_progress.then(|| {
            tokio::spawn(progress_loop(
                self.completed.clone(),
                effective,
                cancel.clone(),
                self.no_color,
                started,
            ))
        });

        for i in 0..worker_count {
            tracker.spawn(worker_loop(
                i,
                http_client.clone(),
                queue.clone(),
                result_tx.clone(),
                self.completed.clone(),
            ));
        }
        tracker.close();

        // Workers hold their own clones; the channel closes when they finish.
        drop(result_tx);

        let mut results = Vec::with_capacity(result_capacity(effective, buffer_size));
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }
        tracker.wait().await;

        cancel.cancel();
        if let Some(handle) = display_handle {
            let _ = handle.await;
        }

        let elapsed = started.elapsed();
        tracing::info!(
            results = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Load test finished"
        );

        Ok(LoadTestRun {
            targets,
            requested_volume: self.requested_volume,
            concurrency: self.concurrency,
            effective_count: effective,
            results,
            elapsed,
        })
    }
}
