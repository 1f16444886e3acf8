use crate::{Error, Result};
use std::{
    env,
    hash::{DefaultHasher, Hash, Hasher},
    process,
};

/// Datacenter id used when no ambient host identity can be found.
pub const FALLBACK_DATACENTER_ID: u64 = 1;

/// Resolves the datacenter component of a generator's identity.
///
/// The contract is narrow: return a value in `[0, max]`, deterministically or
/// pseudo-randomly, from whatever ambient information is available, and never
/// fail. Lookup errors must be converted to an in-range fallback rather than
/// propagated.
///
/// Closures of the shape `Fn(u64) -> u64` implement this trait directly:
///
/// ```
/// use floe::DatacenterResolver;
///
/// let pinned = |_max: u64| 7;
/// assert_eq!(pinned.datacenter_id(31), 7);
/// ```
pub trait DatacenterResolver {
    /// Returns a datacenter id in `[0, max]`.
    fn datacenter_id(&self, max: u64) -> u64;
}

/// Resolves the worker component of a generator's identity.
///
/// Same contract as [`DatacenterResolver`], with the already-resolved
/// datacenter id available as an input so workers can be spread within a
/// datacenter. Closures of the shape `Fn(u64, u64) -> u64` implement this
/// trait directly.
pub trait WorkerResolver {
    /// Returns a worker id in `[0, max]` for the given datacenter.
    fn worker_id(&self, datacenter_id: u64, max: u64) -> u64;
}

impl<F> DatacenterResolver for F
where
    F: Fn(u64) -> u64,
{
    fn datacenter_id(&self, max: u64) -> u64 {
        self(max)
    }
}

impl<F> WorkerResolver for F
where
    F: Fn(u64, u64) -> u64,
{
    fn worker_id(&self, datacenter_id: u64, max: u64) -> u64 {
        self(datacenter_id, max)
    }
}

/// Ambient identity resolution from the local host.
///
/// The datacenter id is the host name (from the `HOSTNAME` or `HOST`
/// environment variable) hashed and bounded into range, falling back to
/// [`FALLBACK_DATACENTER_ID`] when neither is set. The worker id hashes the
/// resolved datacenter id together with the current process id, folded to 16
/// bits before bounding.
///
/// Both components are stable for the lifetime of a process, so two
/// generators built from this resolver in the same process collide; processes
/// on the same host are distinguished by pid. This is a convenience for
/// small fleets. Deployments that need guaranteed-distinct identities should
/// assign them explicitly.
#[derive(Copy, Clone, Debug, Default)]
pub struct HostnameResolver;

fn hostname() -> Option<String> {
    env::var("HOSTNAME")
        .or_else(|_| env::var("HOST"))
        .ok()
        .filter(|name| !name.is_empty())
}

impl DatacenterResolver for HostnameResolver {
    fn datacenter_id(&self, max: u64) -> u64 {
        match hostname() {
            Some(name) => {
                let mut hasher = DefaultHasher::new();
                name.hash(&mut hasher);
                hasher.finish() % (max + 1)
            }
            None => FALLBACK_DATACENTER_ID.min(max),
        }
    }
}

impl WorkerResolver for HostnameResolver {
    fn worker_id(&self, datacenter_id: u64, max: u64) -> u64 {
        let mut hasher = DefaultHasher::new();
        datacenter_id.hash(&mut hasher);
        process::id().hash(&mut hasher);
        (hasher.finish() & 0xffff) % (max + 1)
    }
}

/// A resolver that always produces the same value, clamped into range.
///
/// Useful when identities are assigned externally (an orchestrator, a config
/// file) and the resolver seam still wants filling.
#[derive(Copy, Clone, Debug)]
pub struct FixedResolver(pub u64);

impl DatacenterResolver for FixedResolver {
    fn datacenter_id(&self, max: u64) -> u64 {
        self.0.min(max)
    }
}

impl WorkerResolver for FixedResolver {
    fn worker_id(&self, _datacenter_id: u64, max: u64) -> u64 {
        self.0.min(max)
    }
}

/// Checks one identity component against its layout bound.
///
/// Accepts the signed input so negative values are representable and
/// rejected; the validated value comes back unsigned.
pub(crate) fn validate_identity(field: &'static str, value: i64, max: u64) -> Result<u64> {
    if value < 0 || value as u64 > max {
        return Err(Error::InvalidIdentity { field, value, max });
    }
    Ok(value as u64)
}
