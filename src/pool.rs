use alloc::boxed::Box;
use core::ops::Index;

use tracing::debug;

use crate::err::Error;

/// An index into a [Pool]. Always in `[0, pool.len())` when produced by this crate.
pub type Position = usize;

/// The fixed, ordered, non-empty collection of identifiers a selector hands out.
///
/// The pool owns a private copy of the caller's elements, so mutating the caller's original
/// sequence after construction cannot influence any selector built from it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Pool<T> {
    elements: Box<[T]>,
}

impl<T: Clone> Pool<T> {
    /// Copy `elements` into a new pool. Fails with [Error::EmptyPool] if there is nothing to copy.
    pub fn new(elements: &[T]) -> Result<Self, Error> {
        if elements.is_empty() {
            debug!("rejecting empty pool");
            return Err(Error::EmptyPool);
        }
        Ok(Self {
            elements: elements.to_vec().into_boxed_slice(),
        })
    }
}

impl<T> Pool<T> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false; kept for symmetry with [Pool::len].
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// The position after `position`, wrapping to 0 at the end of the pool.
    ///
    /// Written as a comparison rather than `%` so that any in-range input produces an in-range
    /// output, which is what keeps racy callers from ever indexing out of bounds.
    #[inline]
    pub fn wrap_next(&self, position: Position) -> Position {
        if position + 1 < self.elements.len() {
            position + 1
        } else {
            0
        }
    }
}

impl<T> Index<Position> for Pool<T> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &T {
        &self.elements[position]
    }
}
