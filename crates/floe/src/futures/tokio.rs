use core::time::Duration;

use super::{FlakeGeneratorAsyncExt, SleepProvider};
use crate::{Flake, FlakeGenerator, Result};

/// A [`SleepProvider`] backed by Tokio's timer.
///
/// The default provider for applications built on Tokio.
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    type Sleep = tokio::time::Sleep;

    fn sleep_for(dur: Duration) -> Self::Sleep {
        tokio::time::sleep(dur)
    }
}

/// Tokio convenience over [`FlakeGeneratorAsyncExt`].
///
/// Saves the turbofish when the runtime is known to be Tokio.
pub trait FlakeGeneratorTokioExt<ID>
where
    ID: Flake,
{
    /// Returns a future resolving to the next id, sleeping on Tokio's timer
    /// through sequence exhaustion.
    ///
    /// # Errors
    ///
    /// Resolves to [`Error::ClockMovedBackwards`] when the clock reads
    /// earlier than the last issued id.
    ///
    /// # Example
    /// ```
    /// use floe::{ClassicFlake, FlakeGeneratorTokioExt, LockFlakeGenerator, WallClock};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> floe::Result<()> {
    /// let generator = LockFlakeGenerator::<ClassicFlake>::new(0, 0, WallClock)?;
    /// let id = generator.next_id_async().await?;
    /// assert!(id.to_raw() > 0);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    fn next_id_async(&self) -> impl Future<Output = Result<ID>>;
}

impl<G, ID> FlakeGeneratorTokioExt<ID> for G
where
    G: FlakeGenerator<ID> + Sync,
    ID: Flake + Send,
{
    fn next_id_async(&self) -> impl Future<Output = Result<ID>> {
        self.next_id_with::<TokioSleep>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassicFlake, LockFlakeGenerator, MonotonicClock, TokioSleep};
    use futures::future::try_join_all;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread")]
    async fn next_id_async_yields_increasing_ids() {
        let generator =
            LockFlakeGenerator::<ClassicFlake, _>::new(0, 0, MonotonicClock::new()).unwrap();

        let a = generator.next_id_async().await.unwrap();
        let b = generator.next_id_async().await.unwrap();
        assert!(b > a);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn runtime_agnostic_ext_accepts_a_provider() {
        let generator =
            LockFlakeGenerator::<ClassicFlake, _>::new(2, 3, MonotonicClock::new()).unwrap();

        let id = generator.next_id_with::<TokioSleep>().await.unwrap();
        assert_eq!(id.worker_id(), 2);
        assert_eq!(id.datacenter_id(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_tasks_never_collide() {
        const TASKS: usize = 8;
        const IDS_PER_TASK: usize = 4096;

        let generator = Arc::new(
            LockFlakeGenerator::<ClassicFlake, _>::new(1, 1, MonotonicClock::new()).unwrap(),
        );

        let handles = (0..TASKS).map(|_| {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move {
                let mut ids = Vec::with_capacity(IDS_PER_TASK);
                for _ in 0..IDS_PER_TASK {
                    ids.push(generator.next_id_async().await?.to_raw());
                }
                Ok::<_, crate::Error>(ids)
            })
        });

        let results = try_join_all(handles).await.unwrap();
        let mut seen = HashSet::with_capacity(TASKS * IDS_PER_TASK);
        for ids in results {
            for id in ids.unwrap() {
                assert!(seen.insert(id), "duplicate id issued: {id}");
            }
        }
        assert_eq!(seen.len(), TASKS * IDS_PER_TASK);
    }
}
