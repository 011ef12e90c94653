//! Fair round-robin selection over a fixed pool of identifiers, implemented under a range of
//! concurrency-control disciplines so that they can be compared against each other.
//!
//! Every strategy implements [Selector]. Thread-safe strategies guarantee that over any number
//! of calls which is a multiple of the pool length, every element is returned the same number of
//! times, no matter how many threads call [Selector::next] concurrently. The
//! [UnsynchronizedSelector] and [FirstSelector] baselines only guarantee that whatever they
//! return is an element of the pool.
//!
//! ```
//! use balancers::{Selector, Strategy};
//!
//! let selector = Strategy::CompareAndExchange.build(&["a", "b"]).unwrap();
//! let first: &str = selector.next();
//! let second: &str = selector.next();
//! assert_ne!(first, second);
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

mod backoff;
pub mod err;
#[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
pub mod measure;
mod pool;
mod strategy;
mod sync;

pub use crate::backoff::Backoff;
pub use crate::err::{Error, ParseStrategyError};
pub use crate::pool::{Pool, Position};
pub use crate::strategy::atomic::{
    CasOptions, CasSelector, ExchangeSelector, FetchUpdateSelector, LoadOrdering, StoreOrdering,
    UpdatePrimitive,
};
#[cfg(feature = "std")]
pub use crate::strategy::locked::{MutexMethodSelector, MutexSelector};
#[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
pub use crate::strategy::locked::ParkingLotSelector;
#[cfg(feature = "std")]
pub use crate::strategy::semaphore::{Semaphore, SemaphorePermit, SemaphoreSelector};
pub use crate::strategy::unsync::{FirstSelector, UnsynchronizedSelector};
pub use crate::strategy::Strategy;

/// Hands out elements of a fixed pool, one per call, in round-robin order.
pub trait Selector<T>: Send + Sync {
    /// Return the element at the cursor and advance the cursor by one position, wrapping at the
    /// end of the pool.
    ///
    /// Never fails: the only error condition, an empty pool, is rejected at construction.
    fn next(&self) -> &T;
}

impl<T, S: Selector<T> + ?Sized> Selector<T> for alloc::boxed::Box<S> {
    #[inline]
    fn next(&self) -> &T {
        (**self).next()
    }
}
