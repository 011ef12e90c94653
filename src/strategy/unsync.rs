use tracing::{debug, instrument};

use crate::err::Error;
use crate::pool::{Pool, Position};
use crate::sync::{AtomicUsize, Ordering};
use crate::Selector;

/// A selector which does no synchronization at all.
///
/// It loads the cursor, computes the wrapped successor, and stores it back as two separate
/// operations. Under contention two threads can load the same position (a duplicate) or one
/// thread's store can overwrite another's (a skip), so the distribution is not guaranteed to be
/// fair. What it does guarantee is that every returned element comes from the pool: the position
/// it indexes with is its own local copy of a value some thread previously stored, and every
/// stored value is the in-range output of [Pool::wrap_next].
///
/// The cursor is a relaxed atomic rather than a plain integer only so that the race is a
/// well-defined lost update instead of undefined behavior.
#[derive(Debug)]
pub struct UnsynchronizedSelector<T> {
    pool: Pool<T>,
    cursor: AtomicUsize,
}

impl<T: Clone> UnsynchronizedSelector<T> {
    #[instrument(level = "debug", skip_all, fields(len = elements.len()))]
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        let pool: Pool<T> = Pool::new(elements)?;
        debug!("constructed unsynchronized selector");
        Ok(Self::from_pool(pool))
    }
}

impl<T> UnsynchronizedSelector<T> {
    pub(crate) fn from_pool(pool: Pool<T>) -> Self {
        Self {
            pool,
            cursor: AtomicUsize::new(0),
        }
    }

    pub(crate) fn pool(&self) -> &Pool<T> {
        &self.pool
    }

    /// Read, wrap, write. Deliberately not a single read-modify-write.
    #[inline]
    pub(crate) fn advance(&self) -> Position {
        let position: Position = self.cursor.load(Ordering::Relaxed);
        self.cursor
            .store(self.pool.wrap_next(position), Ordering::Relaxed);
        position
    }
}

impl<T: Send + Sync> Selector<T> for UnsynchronizedSelector<T> {
    #[inline]
    fn next(&self) -> &T {
        let position: Position = self.advance();
        &self.pool[position]
    }
}

/// Always returns the first element of the pool. It touches no shared mutable state, which makes
/// it the throughput ceiling any real selector is measured against.
#[derive(Debug)]
pub struct FirstSelector<T> {
    pool: Pool<T>,
}

impl<T: Clone> FirstSelector<T> {
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        Ok(Self {
            pool: Pool::new(elements)?,
        })
    }
}

impl<T: Send + Sync> Selector<T> for FirstSelector<T> {
    #[inline]
    fn next(&self) -> &T {
        &self.pool[0]
    }
}
