#![allow(dead_code)]

use balancers::{Selector, Strategy};
use tracing::debug;

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::Arc;
        pub(crate) use loom::thread;

        /// loom has no barrier, and already explores every start order.
        pub(crate) struct Barrier;

        impl Barrier {
            pub(crate) fn new(_parties: usize) -> Self {
                Barrier
            }

            pub(crate) fn wait(&self) {}
        }
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::{Arc, Barrier};
        pub(crate) use shuttle::thread;
    } else {
        pub(crate) use std::sync::{Arc, Barrier};
        pub(crate) use std::thread;
    }
}

/// A pool whose elements are their own positions, so a returned element can be tallied directly.
pub(crate) fn numbered_pool(len: usize) -> Vec<usize> {
    (0..len).collect()
}

/// A single caller sees every element once per lap, in pool order, starting wherever the
/// selector happens to start.
pub(crate) fn sequential_test(strategy: Strategy, len: usize) {
    let pool: Vec<usize> = numbered_pool(len);
    let selector: Box<dyn Selector<usize>> = strategy.build(&pool).unwrap();

    let first: usize = *selector.next();
    let mut expected: usize = first;
    for _ in 1..3 * len {
        expected = (expected + 1) % len;
        assert_eq!(*selector.next(), expected, "{strategy} broke pool order");
    }
}

/// Hammer one selector from `num_threads` threads making `calls_per_thread` calls each, and
/// return how many times each position was handed out. The threads are held at a barrier until
/// all of them exist, so their calls overlap.
///
/// Panics if any call returned something outside the pool, whatever the strategy.
pub(crate) fn concurrency_test(
    strategy: Strategy,
    len: usize,
    num_threads: usize,
    calls_per_thread: usize,
) -> Vec<usize> {
    let pool: Vec<usize> = numbered_pool(len);
    let selector: Arc<Box<dyn Selector<usize>>> = Arc::new(strategy.build(&pool).unwrap());
    let start_line: Arc<Barrier> = Arc::new(Barrier::new(num_threads));

    let join_handles: Vec<thread::JoinHandle<Vec<usize>>> = (0..num_threads)
        .map(|_| {
            let selector: Arc<Box<dyn Selector<usize>>> = selector.clone();
            let start_line: Arc<Barrier> = start_line.clone();
            thread::spawn(move || {
                let mut tally: Vec<usize> = vec![0; len];
                start_line.wait();
                for _ in 0..calls_per_thread {
                    let position: usize = *selector.next();
                    assert!(position < len, "{strategy} returned {position}, not in the pool");
                    tally[position] += 1;
                }
                tally
            })
        })
        .collect();

    let mut histogram: Vec<usize> = vec![0; len];
    join_handles.into_iter().for_each(|join_handle| {
        let tally: Vec<usize> = join_handle.join().expect("A thread panicked");
        histogram
            .iter_mut()
            .zip(tally)
            .for_each(|(total, count)| *total += count);
    });
    debug!("{strategy} handed out {histogram:?}");
    histogram
}

/// Fair strategies must hand out every position exactly equally often. Baselines only have to
/// stay inside the pool, which [concurrency_test] already checks.
pub(crate) fn fairness_test(
    strategy: Strategy,
    len: usize,
    num_threads: usize,
    calls_per_thread: usize,
) {
    let histogram: Vec<usize> = concurrency_test(strategy, len, num_threads, calls_per_thread);
    let total_calls: usize = num_threads * calls_per_thread;
    assert_eq!(histogram.iter().sum::<usize>(), total_calls);
    if strategy.is_fair() {
        assert!(
            histogram.iter().all(|count| *count == total_calls / len),
            "unequal distribution from {strategy}: {histogram:?}"
        );
    }
}
