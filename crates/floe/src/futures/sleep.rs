use core::time::Duration;

/// Abstracts how to sleep for a [`Duration`] in async contexts.
///
/// The async generation extension is generic over this trait, so it works on
/// any runtime that can provide a timer. An implementation for Tokio ships
/// behind the `async-tokio` feature; other runtimes only need this one trait
/// implemented.
pub trait SleepProvider {
    /// `Send` so the composed future can move across worker threads.
    type Sleep: Future<Output = ()> + Send;

    /// Returns a future that completes roughly `dur` after being polled.
    fn sleep_for(dur: Duration) -> Self::Sleep;
}
