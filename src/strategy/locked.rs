//! Selectors which serialize access to the cursor with a mutual-exclusion lock.
//!
//! All of them run the same read, increment, wrap, write sequence inside the critical section and
//! differ only in the primitive that guards it. The guard is always scoped, so the lock is
//! released on every exit path, unwinding included.

use tracing::{debug, instrument};

use crate::err::Error;
use crate::pool::{Pool, Position};
use crate::strategy::unsync::UnsynchronizedSelector;
use crate::sync::{lock, Mutex};
use crate::Selector;

/// Hand out the position under `cursor` and advance it. Callers must hold exclusive access.
#[inline]
fn advance_exclusive<T>(pool: &Pool<T>, cursor: &mut Position) -> Position {
    let position: Position = *cursor;
    *cursor = pool.wrap_next(position);
    position
}

/// The cursor lives inside a [Mutex] and only the cursor update is in the critical section.
#[derive(Debug)]
pub struct MutexSelector<T> {
    pool: Pool<T>,
    cursor: Mutex<Position>,
}

impl<T: Clone> MutexSelector<T> {
    #[instrument(level = "debug", skip_all, fields(len = elements.len()))]
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        let pool: Pool<T> = Pool::new(elements)?;
        debug!("constructed mutex selector");
        Ok(Self {
            pool,
            cursor: Mutex::new(0),
        })
    }
}

impl<T: Send + Sync> Selector<T> for MutexSelector<T> {
    fn next(&self) -> &T {
        let position: Position = {
            let mut cursor = lock(&self.cursor);
            advance_exclusive(&self.pool, &mut cursor)
        };
        &self.pool[position]
    }
}

/// Wraps an entire [UnsynchronizedSelector] in a single monitor, the way one would make a
/// non-thread-safe type safe by locking around every call to it.
#[derive(Debug)]
pub struct MutexMethodSelector<T> {
    baseline: UnsynchronizedSelector<T>,
    monitor: Mutex<()>,
}

impl<T: Clone> MutexMethodSelector<T> {
    #[instrument(level = "debug", skip_all, fields(len = elements.len()))]
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        let pool: Pool<T> = Pool::new(elements)?;
        debug!("constructed mutex-method selector");
        Ok(Self {
            baseline: UnsynchronizedSelector::from_pool(pool),
            monitor: Mutex::new(()),
        })
    }
}

impl<T: Send + Sync> Selector<T> for MutexMethodSelector<T> {
    fn next(&self) -> &T {
        let position: Position = {
            let _held = lock(&self.monitor);
            self.baseline.advance()
        };
        &self.baseline.pool()[position]
    }
}

/// Same shape as [MutexSelector], guarded by a `parking_lot` mutex instead. `parking_lot` locks
/// are not poisoned and spin briefly before parking, which is the difference being measured.
#[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
#[derive(Debug)]
pub struct ParkingLotSelector<T> {
    pool: Pool<T>,
    cursor: parking_lot::Mutex<Position>,
}

#[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
impl<T: Clone> ParkingLotSelector<T> {
    #[instrument(level = "debug", skip_all, fields(len = elements.len()))]
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        let pool: Pool<T> = Pool::new(elements)?;
        debug!("constructed parking_lot selector");
        Ok(Self {
            pool,
            cursor: parking_lot::Mutex::new(0),
        })
    }
}

#[cfg(all(feature = "std", not(loom), not(feature = "shuttle")))]
impl<T: Send + Sync> Selector<T> for ParkingLotSelector<T> {
    fn next(&self) -> &T {
        let position: Position = advance_exclusive(&self.pool, &mut self.cursor.lock());
        &self.pool[position]
    }
}
