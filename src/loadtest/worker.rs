//! Worker task loop for load test execution.
//!
//! Each worker claims the next unit of work from a shared [`WorkQueue`],
//! issues exactly one GET for it, and sends the resulting [`RequestResult`]
//! through a bounded mpsc channel. Workers stop when the queue is exhausted.

use crate::loadtest::error::RequestError;
use crate::loadtest::metrics::RequestResult;

use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Atomic counter of finished units of work.
///
/// Lightweight wrapper around `Arc<AtomicU64>` for clone-friendly sharing
/// between workers, the engine, and any outside observer.
#[derive(Clone, Debug)]
pub struct CompletedCounter(Arc<AtomicU64>);

impl CompletedCounter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(0)))
    }

    /// Increments the completed count by one.
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of completed units.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Resets the count to zero at the start of a run.
    pub(crate) fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

impl Default for CompletedCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Round-robin work plan over a fixed target list.
///
/// Unit `i` is assigned `targets[i % targets.len()]`. Units are claimed
/// through an atomic cursor, so every unit is handed out exactly once no
/// matter how many workers pull concurrently.
#[derive(Debug)]
pub struct WorkQueue {
    targets: Vec<String>,
    len: u64,
    cursor: AtomicU64,
}

impl WorkQueue {
    /// Creates a queue of `len` units over `targets`.
    pub fn new(targets: Vec<String>, len: u64) -> Self {
        Self {
            targets,
            len,
            cursor: AtomicU64::new(0),
        }
    }

    /// Target URL of unit `index`, in submission order.
    pub fn target_at(&self, index: u64) -> Option<&str> {
        if index >= self.len || self.targets.is_empty() {
            return None;
        }
        let slot = (index % self.targets.len() as u64) as usize;
        Some(self.targets[slot].as_str())
    }

    /// Claims the next unit. Returns `None` once the plan is exhausted.
    pub fn next(&self) -> Option<&str> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.target_at(index)
    }

    /// Total number of units in the plan.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the plan has no units.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Issues one GET and records its outcome.
///
/// The response body is read to completion so latency covers the full
/// exchange. Any failure becomes an `ERROR` result without latency.
pub async fn dispatch(client: &Client, url: &str) -> RequestResult {
    let start = Instant::now();
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => return RequestResult::failed(url, RequestError::classify_reqwest(&err)),
    };
    let status = response.status().as_u16();
    match response.bytes().await {
        Ok(_) => RequestResult::completed(url, status, start.elapsed()),
        Err(err) => RequestResult::failed(url, RequestError::classify_reqwest(&err)),
    }
}

/// Main worker task loop.
///
/// Pulls units from `queue` until it is exhausted, sending one result per
/// unit and bumping `completed` after each send.
pub async fn worker_loop(
    worker_id: u32,
    client: Client,
    queue: Arc<WorkQueue>,
    result_tx: mpsc::Sender<RequestResult>,
    completed: CompletedCounter,
) {
    let mut handled: u64 = 0;
    while let Some(url) = queue.next() {
        let result = dispatch(&client, url).await;
        if result_tx.send(result).await.is_err() {
            tracing::warn!(worker_id, "Result channel closed, stopping worker");
            break;
        }
        completed.increment();
        handled += 1;
    }
    tracing::debug!(worker_id, handled, "Worker finished");
}
