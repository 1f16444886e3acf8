use core::{cell::Cell, cmp::Ordering};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    CLOCK_TICK, Clock, DatacenterResolver, Error, Flake, FlakeGenerator, HostnameResolver,
    IdStatus, Result, WallClock, WorkerResolver, identity::validate_identity,
};

/// A non-concurrent snowflake generator for single-threaded ownership.
///
/// State lives in a [`Cell`], so the generator is `!Sync` and takes no lock:
/// the mutual-exclusion requirement is discharged by the type system instead
/// of at runtime. This is the fastest flavor.
///
/// ## Recommended when
/// - One thread (or one task) owns the generator outright
/// - You want zero locking overhead
///
/// ## See also
/// - [`LockFlakeGenerator`] for shared concurrent use
///
/// [`LockFlakeGenerator`]: crate::LockFlakeGenerator
pub struct BasicFlakeGenerator<ID, C = WallClock>
where
    ID: Flake,
    C: Clock,
{
    state: Cell<ID>,
    clock: C,
}

impl<ID, C> BasicFlakeGenerator<ID, C>
where
    ID: Flake,
    C: Clock,
{
    /// Creates a generator with an explicit instance identity.
    ///
    /// This is the primary constructor: identities here are what guarantees
    /// cross-instance uniqueness, so they should come from whatever assigns
    /// them distinctly (an orchestrator, config, a coordination service).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] when `worker_id` or `datacenter_id`
    /// is negative or exceeds its layout maximum.
    ///
    /// # Example
    /// ```
    /// use floe::{BasicFlakeGenerator, ClassicFlake, FlakeGenerator, WallClock};
    ///
    /// let generator = BasicFlakeGenerator::<ClassicFlake>::new(3, 7, WallClock)?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.worker_id(), 3);
    /// assert_eq!(id.datacenter_id(), 7);
    /// # Ok::<(), floe::Error>(())
    /// ```
    ///
    /// [`Error::InvalidIdentity`]: crate::Error::InvalidIdentity
    pub fn new(worker_id: i64, datacenter_id: i64, clock: C) -> Result<Self> {
        let worker_id = validate_identity("worker id", worker_id, ID::max_worker_id())?;
        let datacenter_id =
            validate_identity("datacenter id", datacenter_id, ID::max_datacenter_id())?;
        Ok(Self {
            state: Cell::new(ID::from_components(0, datacenter_id, worker_id, 0)),
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
            state: Cell::new(ID::from_components(0, datacenter_id, worker_id, 0)),
            clock,
        }
    }

    /// Creates a generator identified by the local host.
    ///
    /// Convenience over [`Self::from_resolvers`] with [`HostnameResolver`]
    /// supplying both components: the hashed host name picks the datacenter,
    /// the hashed (datacenter, pid) pair picks the worker.
    pub fn from_host_identity(clock: C) -> Self {
        Self::from_resolvers(&HostnameResolver, &HostnameResolver, clock)
    }

    /// The datacenter id encoded into every id from this generator.
    pub fn datacenter_id(&self) -> u64 {
        self.state.get().datacenter_id()
    }

    /// The worker id encoded into every id from this generator.
    pub fn worker_id(&self) -> u64 {
        self.state.get().worker_id()
    }

    /// Attempts to generate the next id. See [`FlakeGenerator::poll_id`].
    ///
    /// The whole read-modify-write (clock read, branch, state update) runs on
    /// the owning thread; `!Sync` guarantees no interleaving.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockMovedBackwards`] when the clock reads earlier
    /// than the last issued id; state is untouched on that path.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<IdStatus<ID>> {
        let now = self.clock.now_millis();
        let state = self.state.get();
        let last = ID::epoch_millis() + state.timestamp();

        match now.cmp(&last) {
            Ordering::Equal => {
                if state.has_sequence_room() {
                    let issued = state.increment_sequence();
                    self.state.set(issued);
                    Ok(IdStatus::Ready { id: issued })
                } else {
                    Ok(IdStatus::Exhausted {
                        retry_after: CLOCK_TICK,
                    })
                }
            }
            Ordering::Greater => {
                let issued = state.advance_to(now - ID::epoch_millis());
                self.state.set(issued);
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

impl<ID, C> FlakeGenerator<ID> for BasicFlakeGenerator<ID, C>
where
    ID: Flake,
    C: Clock,
{
    fn poll_id(&self) -> Result<IdStatus<ID>> {
        BasicFlakeGenerator::poll_id(self)
    }
}
