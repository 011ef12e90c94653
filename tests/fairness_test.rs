#![cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]

mod common;

use balancers::measure::{drive, Load, Report};
use balancers::{Error, Selector, Strategy};
use common::{fairness_test, sequential_test};
use test_log::test;

const POOL_LEN: usize = 4;
const LAPS_PER_THREAD: usize = 10_000;

fn num_threads() -> usize {
    Load::oversubscribed(0).threads
}

#[test]
fn test_sequential_calls_visit_every_element_in_order() {
    for strategy in Strategy::ALL.iter().filter(|strategy| strategy.is_fair()) {
        for len in [1, 2, 5] {
            sequential_test(*strategy, len);
        }
    }
}

#[test]
fn test_fair_under_contention() {
    for strategy in Strategy::ALL {
        fairness_test(*strategy, POOL_LEN, num_threads(), POOL_LEN * LAPS_PER_THREAD);
    }
}

#[test]
fn test_unsynchronized_stays_in_pool_under_contention() {
    // unequal counts are expected here; concurrency_test still panics on an out-of-range element
    let histogram: Vec<usize> = common::concurrency_test(
        Strategy::Unsynchronized,
        POOL_LEN,
        num_threads(),
        POOL_LEN * LAPS_PER_THREAD,
    );
    assert_eq!(histogram.len(), POOL_LEN);
}

#[test]
fn test_contention_harness_catches_unsynchronized_lost_updates() {
    if std::thread::available_parallelism().map_or(1, |n| n.get()) == 1 {
        return;
    }
    let calls_per_thread: usize = POOL_LEN * LAPS_PER_THREAD;
    let lost_an_update: bool = (0..50).any(|_| {
        let histogram: Vec<usize> = common::concurrency_test(
            Strategy::Unsynchronized,
            POOL_LEN,
            num_threads(),
            calls_per_thread,
        );
        let expected: usize = num_threads() * calls_per_thread / POOL_LEN;
        histogram.iter().any(|count| *count != expected)
    });
    assert!(lost_an_update, "unsynchronized selector stayed fair over 50 contended runs");
}

#[test]
fn test_drive_reports_uniform_histogram_for_fair_strategies() {
    let pool: [&str; 4] = ["A", "B", "C", "D"];
    for strategy in Strategy::ALL.iter().filter(|strategy| strategy.is_fair()) {
        let selector: Box<dyn Selector<&str>> = strategy.build(&pool).unwrap();
        let report: Report<&str> = drive(&selector, Load::oversubscribed(pool.len() * 2_500));
        assert!(report.is_uniform_over(&pool), "{strategy}: {:?}", report.histogram);
    }
}

#[test]
fn test_empty_pool_fails_for_every_strategy() {
    let empty: Vec<String> = Vec::new();
    for strategy in Strategy::ALL {
        assert!(matches!(strategy.build(&empty), Err(Error::EmptyPool)));
    }
}

#[test]
fn test_mutating_the_original_pool_does_not_leak_into_the_selector() {
    for strategy in Strategy::ALL.iter().filter(|strategy| strategy.is_fair()) {
        let mut original: Vec<String> = vec!["A".to_owned(), "B".to_owned()];
        let selector: Box<dyn Selector<String>> = strategy.build(&original).unwrap();
        original[0] = "X".to_owned();
        original[1] = "Y".to_owned();
        original.push("Z".to_owned());

        let seen: Vec<String> = (0..4).map(|_| selector.next().clone()).collect();
        assert_eq!(seen, ["A", "B", "A", "B"], "{strategy}");
    }
}
