//! A module which decides which synchronization primitives to use throughout the rest of the crate
//! depending on features and configuration options

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use loom::sync::{Condvar, Mutex, MutexGuard};
        pub(crate) use loom::hint::spin_loop;
        pub(crate) use loom::thread::yield_now;

        /// loom cannot model timed parking, so a park degrades into a yield.
        pub(crate) fn park_for(_duration: core::time::Duration) {
            loom::thread::yield_now();
        }
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use shuttle::sync::{Condvar, Mutex, MutexGuard};
        pub(crate) use shuttle::thread::yield_now;

        pub(crate) fn spin_loop() {
            shuttle::thread::yield_now();
        }

        pub(crate) fn park_for(_duration: core::time::Duration) {
            shuttle::thread::yield_now();
        }
    } else if #[cfg(feature = "std")] {
        pub(crate) use std::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use std::sync::{Condvar, Mutex, MutexGuard};
        pub(crate) use std::hint::spin_loop;
        pub(crate) use std::thread::yield_now;

        pub(crate) fn park_for(duration: core::time::Duration) {
            std::thread::park_timeout(duration);
        }
    } else {
        // no_std: there is no scheduler to yield to or park on
        pub(crate) use core::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use core::hint::spin_loop;

        pub(crate) fn yield_now() {
            core::hint::spin_loop();
        }

        pub(crate) fn park_for(_duration: core::time::Duration) {
            core::hint::spin_loop();
        }
    }
}

/// Lock a mutex, recovering the guard if a previous holder panicked. Every critical section in
/// this crate leaves the cursor in range, so a poisoned lock still protects valid state.
#[cfg(feature = "std")]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
