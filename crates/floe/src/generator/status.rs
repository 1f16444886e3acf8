use crate::Flake;
use core::time::Duration;

/// Outcome of a single id-generation attempt.
///
/// `Exhausted` is not an error: it means the sequence space for the current
/// millisecond is fully used and the attempt should be repeated once the
/// clock has ticked. Backward clock movement, by contrast, is reported as
/// [`Error::ClockMovedBackwards`] and never as a status.
///
/// # Example
///
/// ```
/// use floe::{ClassicFlake, IdStatus, LockFlakeGenerator, WallClock};
///
/// let generator = LockFlakeGenerator::<ClassicFlake>::new(0, 0, WallClock)?;
/// match generator.poll_id()? {
///     IdStatus::Ready { id } => println!("id: {id}"),
///     IdStatus::Exhausted { retry_after } => println!("retry in {retry_after:?}"),
/// }
/// # Ok::<(), floe::Error>(())
/// ```
///
/// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStatus<ID: Flake> {
    /// A new id was issued.
    Ready { id: ID },
    /// The current millisecond's sequence space is exhausted; retry once
    /// roughly `retry_after` has passed and the clock has moved on.
    Exhausted { retry_after: Duration },
}
