mod basic;
mod lock;
mod status;

pub use basic::*;
pub use lock::*;
pub use status::*;

use crate::{Flake, Result};

/// A minimal interface for generating snowflake ids.
///
/// The two flavors ([`BasicFlakeGenerator`] for single-threaded ownership,
/// [`LockFlakeGenerator`] for shared concurrent use) both implement this
/// trait, so code that only needs "give me the next id" can stay generic over
/// the flavor.
///
/// [`poll_id`] is the non-blocking primitive: one attempt, one clock read,
/// reporting exhaustion as a status instead of waiting. [`next_id`] is the
/// blocking convenience built on top of it.
///
/// [`poll_id`]: FlakeGenerator::poll_id
/// [`next_id`]: FlakeGenerator::next_id
pub trait FlakeGenerator<ID>
where
    ID: Flake,
{
    /// Attempts to generate the next id without blocking.
    ///
    /// Returns [`IdStatus::Ready`] with a new, strictly increasing id, or
    /// [`IdStatus::Exhausted`] when the current millisecond's sequence space
    /// is fully used and the caller should retry after the clock ticks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockMovedBackwards`] when the clock reads earlier
    /// than the last issued id. The failed attempt leaves generator state
    /// untouched.
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    fn poll_id(&self) -> Result<IdStatus<ID>>;

    /// Generates the next id, blocking through sequence exhaustion.
    ///
    /// Re-polls until the clock advances past the exhausted millisecond,
    /// yielding the scheduler between attempts. The wait ends only on genuine
    /// forward clock progress; there is no timeout, so a clock frozen forever
    /// stalls the caller forever.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockMovedBackwards`] when the clock reads earlier
    /// than the last issued id.
    ///
    /// # Example
    /// ```
    /// use floe::{ClassicFlake, FlakeGenerator, LockFlakeGenerator, WallClock};
    ///
    /// let generator = LockFlakeGenerator::<ClassicFlake>::new(0, 0, WallClock)?;
    /// let a = generator.next_id()?;
    /// let b = generator.next_id()?;
    /// assert!(b > a);
    /// # Ok::<(), floe::Error>(())
    /// ```
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    fn next_id(&self) -> Result<ID> {
        loop {
            match self.poll_id()? {
                IdStatus::Ready { id } => return Ok(id),
                IdStatus::Exhausted { .. } => std::thread::yield_now(),
            }
        }
    }
}
