use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// One clock tick: the granularity at which generators observe time.
///
/// When a millisecond's sequence space is exhausted, the generator reports
/// [`IdStatus::Exhausted`] with this duration as the suggested wait before
/// re-polling.
///
/// [`IdStatus::Exhausted`]: crate::IdStatus::Exhausted
pub const CLOCK_TICK: Duration = Duration::from_millis(1);

/// A source of wall-clock milliseconds.
///
/// Generators read all time through this trait, which is what lets tests
/// substitute scripted clocks and lets deployments pick between a true
/// syscall-per-read wall clock and a cached ticker.
///
/// Implementations report **milliseconds since the Unix epoch**; generators
/// translate into their layout's epoch themselves.
///
/// # Example
///
/// ```
/// use floe::Clock;
///
/// struct FixedTime;
/// impl Clock for FixedTime {
///     fn now_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.now_millis(), 1234);
/// ```
pub trait Clock {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// The system wall clock, read on every call.
///
/// This is the default time source: each read performs a `SystemTime` lookup,
/// so external clock adjustments (NTP steps, manual changes) are observed
/// immediately. A regression shows up as a [`ClockMovedBackwards`] error from
/// the generator rather than as a duplicate or out-of-order id.
///
/// A platform clock earlier than 1970 reads as 0, which the generator
/// likewise rejects as a regression.
///
/// # Example
///
/// ```
/// use floe::{Clock, WallClock};
///
/// let now = WallClock.now_millis();
/// assert!(now > 0);
/// ```
///
/// [`ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
#[derive(Copy, Clone, Debug, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

/// Shared ticker thread state, updated every millisecond.
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic wall-clock source driven by a background ticker thread.
///
/// The clock captures `SystemTime::now()` once at construction and afterwards
/// measures elapsed time with a monotonic timer (`Instant`), so readings
/// never go backward even if the system clock is adjusted externally. With
/// this source the generator's backward-clock branch is unreachable.
///
/// Reads are a single atomic load, which avoids a syscall per generated id.
/// The tradeoff is that readings lag the true wall clock by up to one tick
/// and do not track NTP adjustments made after construction.
///
/// Clones share the same ticker. The background thread exits once the last
/// clone is dropped.
///
/// # Example
///
/// ```
/// use floe::{Clock, MonotonicClock};
///
/// let clock = MonotonicClock::new();
/// let a = clock.now_millis();
/// let b = clock.now_millis();
/// assert!(b >= a);
/// ```
#[derive(Clone)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    unix_start: u64, // in milliseconds
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock anchored to the current wall-clock time.
    ///
    /// Spawns a background thread that updates a shared atomic counter once
    /// per millisecond. Each [`now_millis`] call returns the captured start
    /// time plus the counter, so values are monotonically non-decreasing for
    /// the life of the clock.
    ///
    /// [`now_millis`]: Clock::now_millis
    pub fn new() -> Self {
        let unix_start = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let mut tick = 0;

            loop {
                // Holding only a weak reference lets the thread observe the
                // last clone dropping and exit.
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Compute the absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                // Sleep if we are early
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                // After waking, recompute how far we actually are from the
                // start
                let now_ms = start.elapsed().as_millis() as u64;

                // Monotonic store, aligned to elapsed milliseconds since
                // start
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                // Align to next tick after the current actual time
                tick = now_ms + 1;
            }
        });

        let _ = inner._handle.set(handle);

        Self { inner, unix_start }
    }
}

impl Clock for MonotonicClock {
    /// Returns the captured start time plus elapsed monotonic milliseconds.
    fn now_millis(&self) -> u64 {
        self.unix_start + self.inner.current.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_is_past_the_default_epoch() {
        let now = WallClock.now_millis();
        assert!(now > TWITTER_EPOCH.as_millis() as u64);
    }

    #[test]
    fn monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now_millis();
        thread::sleep(Duration::from_millis(20));
        let b = clock.now_millis();
        assert!(b > a);
    }

    #[test]
    fn monotonic_clock_never_regresses() {
        let clock = MonotonicClock::new();
        let mut last = 0;
        for _ in 0..10_000 {
            let now = clock.now_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn monotonic_clock_clones_share_the_ticker() {
        let clock = MonotonicClock::new();
        let clone = clock.clone();
        assert!(Arc::ptr_eq(&clock.inner, &clone.inner));
        assert_eq!(clock.unix_start, clone.unix_start);
    }

    #[test]
    fn monotonic_clock_tracks_wall_time() {
        let clock = MonotonicClock::new();
        let wall = WallClock.now_millis();
        let mono = clock.now_millis();
        // Same second, give or take scheduling.
        assert!(wall.abs_diff(mono) < 1_000);
    }
}
