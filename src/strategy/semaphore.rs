use tracing::{debug, instrument, trace};

use crate::err::Error;
use crate::pool::{Pool, Position};
use crate::sync::{lock, AtomicUsize, Condvar, Mutex, Ordering};
use crate::Selector;

/// A blocking counting semaphore.
pub struct Semaphore {
    permits: Mutex<usize>,
    released: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            released: Condvar::new(),
        }
    }

    /// Block until a permit is available and take it. There is no way to interrupt the wait.
    pub fn acquire(&self) -> SemaphorePermit<'_> {
        let mut permits = lock(&self.permits);
        while *permits == 0 {
            trace!("waiting for a semaphore permit");
            permits = match self.released.wait(permits) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        *permits -= 1;
        SemaphorePermit { semaphore: self }
    }

    /// Take a permit if one is available right now.
    pub fn try_acquire(&self) -> Option<SemaphorePermit<'_>> {
        let mut permits = lock(&self.permits);
        if *permits == 0 {
            return None;
        }
        *permits -= 1;
        Some(SemaphorePermit { semaphore: self })
    }

    pub fn available_permits(&self) -> usize {
        *lock(&self.permits)
    }

    fn release(&self) {
        *lock(&self.permits) += 1;
        self.released.notify_one();
    }
}

impl core::fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // must not lock: may be formatted while the permit lock is held
        f.debug_struct("Semaphore").finish_non_exhaustive()
    }
}

/// A permit taken from a [Semaphore], handed back when dropped.
#[must_use = "permit will be immediately released if not held"]
#[derive(Debug)]
pub struct SemaphorePermit<'a> {
    semaphore: &'a Semaphore,
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}

/// Serializes cursor updates with a [Semaphore] holding a single permit.
///
/// The cursor is only ever touched while the permit is held, and the semaphore's internal lock
/// orders one holder's writes before the next holder's reads, so relaxed accesses suffice.
#[derive(Debug)]
pub struct SemaphoreSelector<T> {
    pool: Pool<T>,
    semaphore: Semaphore,
    cursor: AtomicUsize,
}

impl<T: Clone> SemaphoreSelector<T> {
    #[instrument(level = "debug", skip_all, fields(len = elements.len()))]
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        let pool: Pool<T> = Pool::new(elements)?;
        debug!("constructed semaphore selector");
        Ok(Self {
            pool,
            semaphore: Semaphore::new(1),
            cursor: AtomicUsize::new(0),
        })
    }
}

impl<T: Send + Sync> Selector<T> for SemaphoreSelector<T> {
    fn next(&self) -> &T {
        let position: Position = {
            let _permit: SemaphorePermit<'_> = self.semaphore.acquire();
            let position: Position = self.cursor.load(Ordering::Relaxed);
            self.cursor
                .store(self.pool.wrap_next(position), Ordering::Relaxed);
            position
        };
        &self.pool[position]
    }
}
