//! Drives a selector from many threads and reports how long it took and what it handed out.
//!
//! This is the whole surface a benchmarking harness needs: a call count goes in, elapsed time and
//! a per-element histogram come out.

use std::collections::BTreeMap;
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::Selector;

/// How many threads call [Selector::next], and how many times each.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Load {
    pub threads: usize,
    pub calls_per_thread: usize,
}

impl Load {
    /// Twice the available parallelism, so that threads outnumber cores and get preempted in the
    /// middle of an update.
    pub fn oversubscribed(calls_per_thread: usize) -> Self {
        let parallelism: usize = thread::available_parallelism().map_or(1, |n| n.get());
        Self {
            threads: 2 * parallelism,
            calls_per_thread,
        }
    }

    pub fn total_calls(&self) -> usize {
        self.threads * self.calls_per_thread
    }
}

/// The outcome of [drive].
#[derive(Debug, Clone)]
pub struct Report<T> {
    pub load: Load,
    /// Wall-clock time from releasing the threads to joining the last one.
    pub elapsed: Duration,
    /// How many times each element was returned.
    pub histogram: BTreeMap<T, usize>,
}

impl<T: Ord> Report<T> {
    /// Whether every element of `pool` was returned exactly `total_calls / pool.len()` times.
    /// An empty pool is never uniform.
    pub fn is_uniform_over(&self, pool: &[T]) -> bool {
        if pool.is_empty() || self.load.total_calls() % pool.len() != 0 {
            return false;
        }
        let expected: usize = self.load.total_calls() / pool.len();
        self.histogram.len() == pool.len()
            && pool
                .iter()
                .all(|element| self.histogram.get(element) == Some(&expected))
    }

    pub fn throughput_per_sec(&self) -> f64 {
        self.load.total_calls() as f64 / self.elapsed.as_secs_f64()
    }
}

/// Call `selector` according to `load` and tally the results.
#[instrument(level = "debug", skip(selector))]
pub fn drive<T, S>(selector: &S, load: Load) -> Report<T>
where
    T: Ord + Clone + Send + Sync,
    S: Selector<T> + ?Sized,
{
    // the driving thread waits too, so the clock starts once every caller is ready
    let start_line: Barrier = Barrier::new(load.threads + 1);
    let (started, tallies): (Instant, Vec<BTreeMap<&T, usize>>) = thread::scope(|scope| {
        let handles: Vec<thread::ScopedJoinHandle<BTreeMap<&T, usize>>> = (0..load.threads)
            .map(|_| {
                scope.spawn(|| {
                    let mut tally: BTreeMap<&T, usize> = BTreeMap::new();
                    start_line.wait();
                    for _ in 0..load.calls_per_thread {
                        *tally.entry(selector.next()).or_insert(0) += 1;
                    }
                    tally
                })
            })
            .collect();
        start_line.wait();
        let started: Instant = Instant::now();
        let tallies: Vec<BTreeMap<&T, usize>> = handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(tally) => tally,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect();
        (started, tallies)
    });
    let elapsed: Duration = started.elapsed();

    let mut histogram: BTreeMap<T, usize> = BTreeMap::new();
    for tally in tallies {
        for (element, count) in tally {
            *histogram.entry(element.clone()).or_insert(0) += count;
        }
    }
    debug!(?elapsed, distinct = histogram.len(), "finished driving selector");
    Report {
        load,
        elapsed,
        histogram,
    }
}
