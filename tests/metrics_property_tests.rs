//! Property-based tests for dispatch planning and metrics invariants.

use proptest::prelude::*;
use std::time::Duration;

use apiprobe::loadtest::engine::effective_count;
use apiprobe::loadtest::error::RequestError;
use apiprobe::loadtest::metrics::{summarize, RequestResult};
use apiprobe::loadtest::worker::WorkQueue;

fn outcome_strategy() -> impl Strategy<Value = RequestResult> {
    prop_oneof![
        (prop::sample::select(vec![200u16, 201, 204, 301, 404, 500, 503]), 0u64..5_000).prop_map(
            |(status, micros)| RequestResult::completed(
                "http://localhost/",
                status,
                Duration::from_micros(micros * 100),
            )
        ),
        Just(RequestResult::failed("http://localhost/", RequestError::Timeout)),
    ]
}

proptest! {
    /// Effective count is a multiple of the target count, never exceeds the
    /// request, and falls short by less than one full round.
    #[test]
    fn effective_count_bounds(targets in 1usize..200, requested in 0u64..100_000) {
        let effective = effective_count(targets, requested);
        prop_assert_eq!(effective % targets as u64, 0);
        prop_assert!(effective <= requested);
        prop_assert!(requested - effective < targets as u64);
    }

    /// Every target receives the same number of units.
    #[test]
    fn round_robin_is_balanced(targets in 1usize..20, rounds in 0u64..20) {
        let names: Vec<String> = (0..targets).map(|i| format!("http://h/{i}")).collect();
        let queue = WorkQueue::new(names.clone(), targets as u64 * rounds);
        let mut counts = vec![0u64; targets];
        while let Some(url) = queue.next() {
            let slot = names.iter().position(|n| n == url).unwrap();
            counts[slot] += 1;
        }
        prop_assert!(counts.iter().all(|&c| c == rounds));
    }

    /// Counts partition the results and the rate stays within 0..=100.
    #[test]
    fn summary_counts_partition(results in prop::collection::vec(outcome_strategy(), 0..200)) {
        let summary = summarize(&results);

        prop_assert_eq!(summary.total, results.len() as u64);
        prop_assert_eq!(summary.success_count + summary.failure_count, summary.total);
        prop_assert_eq!(
            summary.by_outcome.values().map(|g| g.count).sum::<u64>(),
            summary.total
        );
        prop_assert!((0.0..=100.0).contains(&summary.success_rate));

        let completed = results.iter().filter(|r| r.latency_ms.is_some()).count();
        prop_assert_eq!(summary.latency_values.len(), completed);
        prop_assert_eq!(summary.latency.count, completed as u64);
    }

    /// Percentiles are ordered and fall within the observed range.
    #[test]
    fn latency_percentiles_ordered(millis in prop::collection::vec(1u64..10_000, 1..300)) {
        let results: Vec<_> = millis
            .iter()
            .map(|ms| RequestResult::completed("http://localhost/", 200, Duration::from_millis(*ms)))
            .collect();
        let latency = summarize(&results).latency;

        prop_assert!(latency.p50_ms <= latency.p95_ms);
        prop_assert!(latency.p95_ms <= latency.p99_ms);
        prop_assert!(latency.min_ms <= latency.mean_ms);
        prop_assert!(latency.mean_ms <= latency.max_ms);
        // HdrHistogram with 3 significant figures is within 0.1% of the true value.
        prop_assert!(latency.p99_ms <= latency.max_ms * 1.001 + 0.01);
        prop_assert!(latency.p50_ms >= latency.min_ms * 0.999 - 0.01);
    }
}
