/// A specialized result type for fallible `floe` operations.
///
/// Defaults the error type to [`Error`] so signatures stay short at call
/// sites while still allowing a custom error parameter.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `floe` can emit.
///
/// Generation has exactly two failure modes: an identity component rejected
/// at construction, and a wall clock observed running backwards at call time.
/// Everything else (sequence exhaustion, scheduler waits) is handled
/// internally and never surfaces as an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An identity component supplied at construction is negative or exceeds
    /// the maximum representable by its layout field.
    ///
    /// The generator is never created; the caller must supply a valid
    /// component. `field` names the offending component.
    #[error("{field} {value} is out of range (0..={max})")]
    InvalidIdentity {
        field: &'static str,
        value: i64,
        max: u64,
    },

    /// The clock reported a millisecond earlier than the last issued id.
    ///
    /// The failing call leaves generator state untouched: once the clock
    /// catches back up, subsequent calls succeed normally. `backwards_ms` is
    /// the size of the observed regression.
    #[error("clock moved backwards; refusing to generate an id for {backwards_ms}ms")]
    ClockMovedBackwards { backwards_ms: u64 },
}
