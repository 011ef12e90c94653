//! Selectors which advance the cursor with atomic read-modify-write primitives.
//!
//! Every variant linearizes at its successful atomic update, so all of them are fair. They differ
//! in how a failed attempt is retried and in how strong the memory orderings are, which only
//! shows up in throughput and latency under contention.
//!
//! [CasSelector] and [FetchUpdateSelector] are lock-free. [ExchangeSelector] is not: its claim
//! marker makes it a spinlock, and a caller preempted while holding the claim stalls every other
//! caller until it is scheduled again.

use tracing::{debug, instrument, trace};

use crate::backoff::Backoff;
use crate::err::Error;
use crate::pool::{Pool, Position};
use crate::sync::{AtomicUsize, Ordering};
use crate::Selector;

/// Memory ordering of the load that reads the current cursor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LoadOrdering {
    /// `Relaxed`. Experimental.
    Plain,
    Acquire,
    SeqCst,
}

/// Memory ordering of the store performed by a successful update.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StoreOrdering {
    /// `Relaxed`. Experimental.
    Plain,
    Release,
    SeqCst,
}

/// How the update is attempted and how a failed attempt is retried.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UpdatePrimitive {
    /// Strong compare-and-swap. On failure, throw the result away and reload the cursor.
    CompareAndSet,
    /// Strong compare-and-swap. On failure, retry with the value the failed swap observed instead
    /// of loading again.
    CompareAndExchange,
    /// Weak compare-and-swap, which may fail spuriously. On failure, reload the cursor.
    WeakCompareAndSet,
}

/// Configuration of a [CasSelector].
///
/// The default is the strongest ordering on both sides. Every combination is correct for a
/// single shared cursor, since all read-modify-writes on one location are totally ordered, but
/// weaker orderings are opt-in.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CasOptions {
    pub load: LoadOrdering,
    pub store: StoreOrdering,
    pub update: UpdatePrimitive,
    pub backoff: Backoff,
}

impl Default for CasOptions {
    fn default() -> Self {
        Self {
            load: LoadOrdering::SeqCst,
            store: StoreOrdering::SeqCst,
            update: UpdatePrimitive::CompareAndSet,
            backoff: Backoff::None,
        }
    }
}

impl CasOptions {
    pub fn with_update(self, update: UpdatePrimitive) -> Self {
        Self { update, ..self }
    }

    pub fn with_orderings(self, load: LoadOrdering, store: StoreOrdering) -> Self {
        Self {
            load,
            store,
            ..self
        }
    }

    pub fn with_backoff(self, backoff: Backoff) -> Self {
        Self { backoff, ..self }
    }

    fn load_ordering(&self) -> Ordering {
        match self.load {
            LoadOrdering::Plain => Ordering::Relaxed,
            LoadOrdering::Acquire => Ordering::Acquire,
            LoadOrdering::SeqCst => Ordering::SeqCst,
        }
    }

    /// The success ordering of the compare-and-swap covers both its read and its write, so it is
    /// the join of the load and store orderings. This also keeps the failure ordering, which is the
    /// load ordering, no stronger than the success ordering.
    fn success_ordering(&self) -> Ordering {
        match (self.load, self.store) {
            (LoadOrdering::SeqCst, _) | (_, StoreOrdering::SeqCst) => Ordering::SeqCst,
            (LoadOrdering::Acquire, StoreOrdering::Release) => Ordering::AcqRel,
            (LoadOrdering::Acquire, StoreOrdering::Plain) => Ordering::Acquire,
            (LoadOrdering::Plain, StoreOrdering::Release) => Ordering::Release,
            (LoadOrdering::Plain, StoreOrdering::Plain) => Ordering::Relaxed,
        }
    }
}

/// Advances the cursor with a compare-and-swap retry loop, configured by [CasOptions].
#[derive(Debug)]
pub struct CasSelector<T> {
    pool: Pool<T>,
    cursor: AtomicUsize,
    options: CasOptions,
    load: Ordering,
    success: Ordering,
}

impl<T: Clone> CasSelector<T> {
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        Self::with_options(elements, CasOptions::default())
    }

    #[instrument(level = "debug", skip(elements), fields(len = elements.len()))]
    pub fn with_options(elements: &[T], options: CasOptions) -> Result<Self, Error> {
        let pool: Pool<T> = Pool::new(elements)?;
        debug!("constructed compare-and-swap selector");
        Ok(Self {
            pool,
            cursor: AtomicUsize::new(0),
            options,
            load: options.load_ordering(),
            success: options.success_ordering(),
        })
    }
}

impl<T> CasSelector<T> {
    pub fn options(&self) -> &CasOptions {
        &self.options
    }

    #[inline]
    fn advance(&self) -> Position {
        match self.options.update {
            UpdatePrimitive::CompareAndSet => self.advance_by_reloading(false),
            UpdatePrimitive::WeakCompareAndSet => self.advance_by_reloading(true),
            UpdatePrimitive::CompareAndExchange => self.advance_by_reusing_witness(),
        }
    }

    fn advance_by_reloading(&self, weak: bool) -> Position {
        let mut attempt: u32 = 0;
        loop {
            let current: Position = self.cursor.load(self.load);
            let next: Position = self.pool.wrap_next(current);
            let result: Result<Position, Position> = if weak {
                self.cursor
                    .compare_exchange_weak(current, next, self.success, self.load)
            } else {
                self.cursor
                    .compare_exchange(current, next, self.success, self.load)
            };
            if result.is_ok() {
                return current;
            }
            trace!(current, attempt, "cursor moved underneath us, reloading");
            self.options.backoff.wait(attempt);
            attempt = attempt.saturating_add(1);
        }
    }

    fn advance_by_reusing_witness(&self) -> Position {
        let mut attempt: u32 = 0;
        let mut current: Position = self.cursor.load(self.load);
        loop {
            let next: Position = self.pool.wrap_next(current);
            match self
                .cursor
                .compare_exchange(current, next, self.success, self.load)
            {
                Ok(previous) => return previous,
                Err(witness) => {
                    trace!(current, witness, attempt, "cursor moved underneath us, retrying with witness");
                    self.options.backoff.wait(attempt);
                    attempt = attempt.saturating_add(1);
                    // every value ever stored came out of wrap_next, so the witness is in range
                    current = witness;
                }
            }
        }
    }
}

impl<T: Send + Sync> Selector<T> for CasSelector<T> {
    #[inline]
    fn next(&self) -> &T {
        let position: Position = self.advance();
        &self.pool[position]
    }
}

/// Advances the cursor with a single get-and-update call taking the pure wrap function.
#[derive(Debug)]
pub struct FetchUpdateSelector<T> {
    pool: Pool<T>,
    cursor: AtomicUsize,
}

impl<T: Clone> FetchUpdateSelector<T> {
    #[instrument(level = "debug", skip_all, fields(len = elements.len()))]
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        let pool: Pool<T> = Pool::new(elements)?;
        debug!("constructed fetch-update selector");
        Ok(Self {
            pool,
            cursor: AtomicUsize::new(0),
        })
    }
}

impl<T: Send + Sync> Selector<T> for FetchUpdateSelector<T> {
    #[inline]
    fn next(&self) -> &T {
        let pool: &Pool<T> = &self.pool;
        let position: Position = match self.cursor.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |current| Some(pool.wrap_next(current)),
        ) {
            // the closure never declines, so the error arm is unreachable but equally in range
            Ok(previous) | Err(previous) => previous,
        };
        &self.pool[position]
    }
}

/// Position stored in the cursor while some thread has claimed it. Never a valid position: every
/// position is below the pool length, which is at most `usize::MAX`.
const CLAIMED: Position = usize::MAX;

/// Retrieves the previous cursor by atomically swapping in a claim marker, then publishes the
/// successor with a plain store. A thread which swaps out the marker itself lost the race and
/// retries after backing off.
///
/// This is effectively a spinlock around the cursor, not a lock-free algorithm: between the swap
/// and the store every other caller spins, so a claiming thread preempted in that window blocks
/// them all.
#[derive(Debug)]
pub struct ExchangeSelector<T> {
    pool: Pool<T>,
    cursor: AtomicUsize,
    backoff: Backoff,
}

impl<T: Clone> ExchangeSelector<T> {
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        Self::with_backoff(elements, Backoff::SpinHint)
    }

    #[instrument(level = "debug", skip(elements), fields(len = elements.len()))]
    pub fn with_backoff(elements: &[T], backoff: Backoff) -> Result<Self, Error> {
        let pool: Pool<T> = Pool::new(elements)?;
        debug!("constructed exchange selector");
        Ok(Self {
            pool,
            cursor: AtomicUsize::new(0),
            backoff,
        })
    }
}

impl<T> ExchangeSelector<T> {
    fn advance(&self) -> Position {
        let mut attempt: u32 = 0;
        loop {
            let previous: Position = self.cursor.swap(CLAIMED, Ordering::Acquire);
            if previous != CLAIMED {
                self.cursor
                    .store(self.pool.wrap_next(previous), Ordering::Release);
                return previous;
            }
            trace!(attempt, "cursor is claimed by another thread");
            self.backoff.wait(attempt);
            attempt = attempt.saturating_add(1);
        }
    }
}

impl<T: Send + Sync> Selector<T> for ExchangeSelector<T> {
    #[inline]
    fn next(&self) -> &T {
        let position: Position = self.advance();
        &self.pool[position]
    }
}
