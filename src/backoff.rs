use core::time::Duration;

use tracing::trace;

use crate::sync::{park_for, spin_loop, yield_now};

/// The operation performed after each unsuccessful attempt in the busy-retry loop of the
/// atomic selectors.
///
/// All variants are functionally equivalent. They differ only in how a losing thread behaves
/// under contention, which is what makes them worth comparing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Backoff {
    /// Retry immediately.
    #[default]
    None,
    /// Give up the rest of the time slice.
    Yield,
    /// Tell the processor we are in a busy-wait loop.
    SpinHint,
    /// Park the thread, starting at `initial` and doubling on every consecutive failure up to
    /// `max`.
    Park { initial: Duration, max: Duration },
}

impl Backoff {
    /// Park for 1ns, doubling up to 1µs.
    pub const SHORT_PARK: Backoff = Backoff::Park {
        initial: Duration::from_nanos(1),
        max: Duration::from_micros(1),
    };

    /// Perform the back-off for the `attempt`-th consecutive failure, counted from 0.
    #[inline]
    pub(crate) fn wait(&self, attempt: u32) {
        match *self {
            Backoff::None => {}
            Backoff::Yield => yield_now(),
            Backoff::SpinHint => spin_loop(),
            Backoff::Park { initial, max } => {
                let duration: Duration = park_duration(initial, max, attempt);
                trace!(?duration, attempt, "parking after failed attempt");
                park_for(duration);
            }
        }
    }
}

fn park_duration(initial: Duration, max: Duration, attempt: u32) -> Duration {
    // beyond 2^16 the cap has long since been reached for any sane `initial`
    let factor: u32 = 1u32 << attempt.min(16);
    initial.saturating_mul(factor).min(max)
}
