//! Snowflake-style 64-bit id generation for distributed deployments.
//!
//! Each generator instance packs a millisecond timestamp, a fixed
//! `(datacenter, worker)` identity, and a per-millisecond sequence into one
//! integer. Ids from a single instance are strictly increasing; ids across
//! instances with distinct identities never collide and sort roughly by
//! creation time. No coordination happens at generation time.
//!
//! The default [`ClassicFlake`] layout:
//!
//! ```text
//!  Bit Index:  63           63 62            22 21             17 16          12 11             0
//!              +--------------+----------------+-----------------+--------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | datacenter (5)  | worker (5)   | sequence (12) |
//!              +--------------+----------------+-----------------+--------------+---------------+
//!              |<------------------- MSB --------- 64 bits --------- LSB --------------------->|
//! ```
//!
//! That buys ~69 years of timestamps from the epoch, 1024 distinct
//! instances, and 4096 ids per instance per millisecond. Other tradeoffs are
//! a [`define_flake!`] invocation away.
//!
//! # Quickstart
//!
//! ```
//! use floe::{ClassicFlake, FlakeGenerator, LockFlakeGenerator, WallClock};
//!
//! // Identity comes from whatever assigns it distinctly in your fleet.
//! let generator = LockFlakeGenerator::<ClassicFlake>::new(3, 7, WallClock)?;
//!
//! let id = generator.next_id()?;
//! assert_eq!(id.worker_id(), 3);
//! assert_eq!(id.datacenter_id(), 7);
//! # Ok::<(), floe::Error>(())
//! ```
//!
//! # Clock discipline
//!
//! A wall clock observed running backwards makes `next_id` fail with
//! [`Error::ClockMovedBackwards`] rather than risk a duplicate; state is
//! untouched, so calls succeed again once the clock catches up. A
//! millisecond whose 4096-id sequence space is spent makes the generator
//! wait for the next tick. [`MonotonicClock`] sidesteps the regression case
//! entirely at the cost of lagging the true wall clock by up to a tick.
//!
//! # Feature flags
//!
//! - `serde`: [`as_u64`], a `with`-adapter storing ids as raw integers.
//! - `tracing`: trace-level instrumentation of the generation hot path.
//! - `async-tokio`: [`FlakeGeneratorAsyncExt`] / [`FlakeGeneratorTokioExt`]
//!   for waiting out sequence exhaustion on a runtime timer.
//! - `all`: everything above.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
#[cfg(feature = "async-tokio")]
mod futures;
mod generator;
mod id;
mod identity;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::identity::*;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::time::*;
