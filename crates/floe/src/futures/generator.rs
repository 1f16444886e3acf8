use core::future::Future;

use super::SleepProvider;
use crate::{Flake, FlakeGenerator, IdStatus, Result};

/// Extension trait for generating ids in async contexts.
///
/// Instead of blocking a thread through sequence exhaustion the way
/// [`FlakeGenerator::next_id`] does, the returned future sleeps for the
/// duration the generator suggests and retries. A clock regression is not
/// waited out: [`Error::ClockMovedBackwards`] propagates immediately, exactly
/// as on the sync path.
///
/// Blanket-implemented for every `Sync` generator, so both flavors that can
/// be shared get it for free.
///
/// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
pub trait FlakeGeneratorAsyncExt<ID>
where
    ID: Flake,
{
    /// Returns a future resolving to the next id, sleeping via `S` whenever
    /// the current millisecond's sequence space is exhausted.
    ///
    /// # Errors
    ///
    /// Resolves to [`Error::ClockMovedBackwards`] when the clock reads
    /// earlier than the last issued id.
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    fn next_id_with<S>(&self) -> impl Future<Output = Result<ID>>
    where
        S: SleepProvider;
}

impl<G, ID> FlakeGeneratorAsyncExt<ID> for G
where
    G: FlakeGenerator<ID> + Sync,
    ID: Flake + Send,
{
    fn next_id_with<S>(&self) -> impl Future<Output = Result<ID>>
    where
        S: SleepProvider,
    {
        async {
            loop {
                let retry_after = match self.poll_id()? {
                    IdStatus::Ready { id } => return Ok(id),
                    IdStatus::Exhausted { retry_after } => retry_after,
                };
                S::sleep_for(retry_after).await;
            }
        }
    }
}
