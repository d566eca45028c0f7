//! Millisecond clock seam shared by the generator and the sampler.
//!
//! Both hot paths need nothing more than "the current millisecond" and
//! both assume it never goes backward. Keeping the clock behind a trait
//! lets tests drive time by hand.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A source of monotonic millisecond timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds.
    fn now_millis(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    #[inline]
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Wall-aligned base captured once per process. Pairing an `Instant`
/// with the unix millis observed at the same moment keeps readings
/// monotonic even if the wall clock is stepped afterwards.
static CLOCK_BASE: Lazy<(Instant, u64)> = Lazy::new(|| {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    (Instant::now(), wall)
});

/// The process-wide monotonic clock.
///
/// Readings are roughly unix-epoch-aligned so identifiers remain
/// comparable across nodes, but advance with `Instant` and therefore
/// never regress within one process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        let (base, wall) = *CLOCK_BASE;
        wall + base.elapsed().as_millis() as u64
    }
}

/// A hand-driven clock for tests and simulations.
///
/// Starts at the given millisecond and only moves when told to. Unlike
/// [`SystemClock`] it can be moved backward, which is exactly what the
/// clock-regression tests need.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `millis`.
    pub fn new(millis: u64) -> Self {
        Self {
            now: AtomicU64::new(millis),
        }
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute millisecond value.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
