use core::cmp::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    CLOCK_TICK, Clock, DatacenterResolver, Error, Flake, FlakeGenerator, HostnameResolver,
    IdStatus, Result, WallClock, WorkerResolver, identity::validate_identity,
};

/// A lock-based snowflake generator for shared concurrent use.
///
/// The packed state sits behind an [`Arc`]`<`[`Mutex`]`<_>>`, and every
/// generation attempt holds the lock across the clock read, the branch
/// decision, and the state update. That critical section is what makes
/// concurrent callers serialize instead of computing the same
/// (timestamp, sequence) pair.
///
/// The mutex is `parking_lot`'s, which cannot poison, so a panicking caller
/// never wedges the generator and locking introduces no extra error variant.
///
/// Clones share state: two clones are two handles to one id stream, not two
/// instances. Distinct instances need distinct identities.
///
/// ## Recommended when
/// - Multiple threads or tasks draw from one identity
///
/// ## See also
/// - [`BasicFlakeGenerator`] for single-threaded ownership
///
/// [`BasicFlakeGenerator`]: crate::BasicFlakeGenerator
pub struct LockFlakeGenerator<ID, C = WallClock>
where
    ID: Flake,
    C: Clock,
{
    state: Arc<Mutex<ID>>,
    clock: C,
}

impl<ID, C> Clone for LockFlakeGenerator<ID, C>
where
    ID: Flake,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: self.clock.clone(),
        }
    }
}

impl<ID, C> LockFlakeGenerator<ID, C>
where
    ID: Flake,
    C: Clock,
{
    /// Creates a generator with an explicit instance identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] when `worker_id` or `datacenter_id`
    /// is negative or exceeds its layout maximum.
    ///
    /// # Example
    /// ```
    /// use floe::{ClassicFlake, FlakeGenerator, LockFlakeGenerator, WallClock};
    ///
    /// let generator = LockFlakeGenerator::<ClassicFlake>::new(0, 0, WallClock)?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.sequence(), 0);
    /// # Ok::<(), floe::Error>(())
    /// ```
    ///
    /// [`Error::InvalidIdentity`]: crate::Error::InvalidIdentity
    pub fn new(worker_id: i64, datacenter_id: i64, clock: C) -> Result<Self> {
        let worker_id = validate_identity("worker id", worker_id, ID::max_worker_id())?;
        let datacenter_id =
            validate_identity("datacenter id", datacenter_id, ID::max_datacenter_id())?;
        Ok(Self {
            state: Arc::new(Mutex::new(ID::from_components(0, datacenter_id, worker_id, 0))),
            clock,
        })
    }

    /// Creates a generator with an identity derived from resolvers.
    ///
    /// The datacenter resolver runs first; its result feeds the worker
    /// resolver. Resolvers are contractually in-range and never fail, so this
    /// constructor is infallible.
    pub fn from_resolvers<D, W>(datacenter: &D, worker: &W, clock: C) -> Self
    where
        D: DatacenterResolver + ?Sized,
        W: WorkerResolver + ?Sized,
    {
        let datacenter_id = datacenter.datacenter_id(ID::max_datacenter_id());
        let worker_id = worker.worker_id(datacenter_id, ID::max_worker_id());
        Self {
            state: Arc::new(Mutex::new(ID::from_components(0, datacenter_id, worker_id, 0))),
            clock,
        }
    }

    /// Creates a generator identified by the local host.
    ///
    /// Convenience over [`Self::from_resolvers`] with [`HostnameResolver`]
    /// supplying both components.
    pub fn from_host_identity(clock: C) -> Self {
        Self::from_resolvers(&HostnameResolver, &HostnameResolver, clock)
    }

    /// The datacenter id encoded into every id from this generator.
    pub fn datacenter_id(&self) -> u64 {
        self.state.lock().datacenter_id()
    }

    /// The worker id encoded into every id from this generator.
    pub fn worker_id(&self) -> u64 {
        self.state.lock().worker_id()
    }

    /// Attempts to generate the next id. See [`FlakeGenerator::poll_id`].
    ///
    /// The clock is read while the lock is held: reading it outside would let
    /// a second caller observe the same millisecond and race the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockMovedBackwards`] when the clock reads earlier
    /// than the last issued id; state is untouched on that path.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdStatus<ID>> {
        let mut state = self.state.lock();
        let now = self.clock.now_millis();
        let last = ID::epoch_millis() + state.timestamp();

        match now.cmp(&last) {
            Ordering::Equal => {
                if state.has_sequence_room() {
                    let issued = state.increment_sequence();
                    *state = issued;
                    Ok(IdStatus::Ready { id: issued })
                } else {
                    Ok(IdStatus::Exhausted {
                        retry_after: CLOCK_TICK,
                    })
                }
            }
            Ordering::Greater => {
                let issued = state.advance_to(now - ID::epoch_millis());
                *state = issued;
                Ok(IdStatus::Ready { id: issued })
            }
            Ordering::Less => Err(Self::cold_clock_behind(now, last)),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        Error::ClockMovedBackwards {
            backwards_ms: last - now,
        }
    }
}

impl<ID, C> FlakeGenerator<ID> for LockFlakeGenerator<ID, C>
where
    ID: Flake,
    C: Clock,
{
    fn poll_id(&self) -> Result<IdStatus<ID>> {
        LockFlakeGenerator::poll_id(self)
    }
}
