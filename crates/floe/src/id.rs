use crate::TWITTER_EPOCH;
use core::{fmt, hash::Hash, time::Duration};

/// Trait for layout-compatible snowflake identifiers.
///
/// This trait abstracts a packed 64-bit id with separate bit fields for a
/// millisecond timestamp, a datacenter id, a worker id, and a per-millisecond
/// sequence. Types implementing this trait define their own bit partition and
/// epoch; generators are generic over it.
///
/// The timestamp field counts milliseconds elapsed since [`Flake::EPOCH`],
/// never absolute wall-clock time, which is what keeps 41 bits good for
/// roughly 69 years of range.
///
/// # Example
///
/// ```
/// use floe::{ClassicFlake, Flake};
///
/// let id = ClassicFlake::from(1000, 2, 3, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.datacenter_id(), 2);
/// assert_eq!(id.worker_id(), 3);
/// assert_eq!(id.sequence(), 1);
/// ```
pub trait Flake:
    Sized + Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Reference instant for this layout, as a duration since the Unix epoch.
    ///
    /// Must be earlier than any instant at which ids are generated. Changing
    /// it after ids have been issued breaks ordering and uniqueness across
    /// the change.
    const EPOCH: Duration;

    /// Returns the timestamp portion of the id (milliseconds since
    /// [`Flake::EPOCH`]).
    fn timestamp(&self) -> u64;

    /// Returns the maximum possible value for the timestamp field.
    fn max_timestamp() -> u64;

    /// Returns the datacenter id portion of the id.
    fn datacenter_id(&self) -> u64;

    /// Returns the maximum possible value for the datacenter id field.
    fn max_datacenter_id() -> u64;

    /// Returns the worker id portion of the id.
    fn worker_id(&self) -> u64;

    /// Returns the maximum possible value for the worker id field.
    fn max_worker_id() -> u64;

    /// Returns the sequence portion of the id.
    fn sequence(&self) -> u64;

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> u64;

    /// Constructs an id from its components.
    ///
    /// Debug builds assert that every component fits its field; release
    /// builds mask excess bits away.
    fn from_components(timestamp: u64, datacenter_id: u64, worker_id: u64, sequence: u64) -> Self;

    /// Converts this id into its raw `u64` representation.
    fn to_raw(&self) -> u64;

    /// Converts a raw `u64` into this id type.
    ///
    /// The raw value is taken as-is. Use [`Flake::is_valid`] first when the
    /// input comes from an untrusted source.
    fn from_raw(raw: u64) -> Self;

    /// Returns true if `raw` only uses payload bits of this layout (all
    /// reserved bits are zero).
    fn is_valid(raw: u64) -> bool;

    /// This layout's epoch in milliseconds since the Unix epoch.
    fn epoch_millis() -> u64 {
        Self::EPOCH.as_millis() as u64
    }

    /// Recovers the wall-clock millisecond (since the Unix epoch) at which
    /// this id was generated.
    fn unix_millis(&self) -> u64 {
        Self::epoch_millis() + self.timestamp()
    }

    /// Returns true if the current sequence value can be incremented without
    /// exhausting the field.
    fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns the next sequence value.
    fn next_sequence(&self) -> u64 {
        self.sequence() + 1
    }

    /// Returns a new id with the sequence incremented and all other fields
    /// unchanged.
    fn increment_sequence(&self) -> Self {
        Self::from_components(
            self.timestamp(),
            self.datacenter_id(),
            self.worker_id(),
            self.next_sequence(),
        )
    }

    /// Returns a new id for a later timestamp with the sequence reset to
    /// zero and the identity fields unchanged.
    fn advance_to(&self, timestamp: u64) -> Self {
        Self::from_components(timestamp, self.datacenter_id(), self.worker_id(), 0)
    }

    /// Returns the id as a zero-padded decimal string whose lexicographic
    /// order matches numeric order.
    fn to_padded_string(&self) -> String;
}

/// Declares a [`Flake`]-compatible id type with a custom bit layout and
/// epoch.
///
/// The macro defines a packed `u64` structure and generates field masks,
/// shifts, and accessors for each component. All 64 bits must be accounted
/// for; otherwise a compile-time assertion fails. Fields are packed from
/// **MSB to LSB** in declaration order:
///
/// ```text
///  Bit Index:   high bits                                              low bits
///              +----------+-----------+---------------+------------+----------+
///  Field:      | reserved | timestamp | datacenter id | worker id  | sequence |
///              +----------+-----------+---------------+------------+----------+
///              |<------------- MSB ------- 64 bits ------- LSB ------------->|
/// ```
///
/// Reserved bits occupy the top of the word and must remain zero; a one-bit
/// reserve keeps every id non-negative as an `i64`.
///
/// # Example
///
/// ```
/// use floe::{CUSTOM_EPOCH, define_flake};
///
/// define_flake!(
///     /// Dense-fleet layout: 256 datacenters x 256 workers, 256 ids/ms.
///     DenseFlake,
///     epoch: CUSTOM_EPOCH,
///     reserved: 1,
///     timestamp: 39,
///     datacenter_id: 8,
///     worker_id: 8,
///     sequence: 8
/// );
///
/// let id = DenseFlake::from(1, 200, 201, 5);
/// assert_eq!(id.datacenter_id(), 200);
/// assert_eq!(id.worker_id(), 201);
/// ```
#[macro_export]
macro_rules! define_flake {
    (
        $(#[$meta:meta])*
        $name:ident,
        epoch: $epoch:expr,
        reserved: $reserved_bits:expr,
        timestamp: $timestamp_bits:expr,
        datacenter_id: $datacenter_id_bits:expr,
        worker_id: $worker_id_bits:expr,
        sequence: $sequence_bits:expr
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            id: u64,
        }

        const _: () = {
            // Compile-time checks: the partition must cover the word exactly,
            // and a snowflake without a timestamp or sequence field is not
            // one.
            assert!(
                $reserved_bits
                    + $timestamp_bits
                    + $datacenter_id_bits
                    + $worker_id_bits
                    + $sequence_bits
                    == u64::BITS,
                "bit widths must sum to exactly 64"
            );
            assert!($timestamp_bits >= 1, "layout needs a timestamp field");
            assert!($sequence_bits >= 1, "layout needs a sequence field");
        };

        impl $name {
            /// Reference instant for this layout, as a duration since the
            /// Unix epoch.
            pub const EPOCH: ::core::time::Duration = $epoch;

            pub const RESERVED_BITS: u32 = $reserved_bits;
            pub const TIMESTAMP_BITS: u32 = $timestamp_bits;
            pub const DATACENTER_ID_BITS: u32 = $datacenter_id_bits;
            pub const WORKER_ID_BITS: u32 = $worker_id_bits;
            pub const SEQUENCE_BITS: u32 = $sequence_bits;

            pub const SEQUENCE_SHIFT: u32 = 0;
            pub const WORKER_ID_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
            pub const DATACENTER_ID_SHIFT: u32 = Self::WORKER_ID_SHIFT + Self::WORKER_ID_BITS;
            pub const TIMESTAMP_SHIFT: u32 = Self::DATACENTER_ID_SHIFT + Self::DATACENTER_ID_BITS;

            pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
            pub const DATACENTER_ID_MASK: u64 = (1 << Self::DATACENTER_ID_BITS) - 1;
            pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;
            pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

            /// Every payload bit in position. Set bits outside this mask are
            /// reserved and must be zero in a well-formed id.
            pub const PACKED_MASK: u64 = (Self::TIMESTAMP_MASK << Self::TIMESTAMP_SHIFT)
                | (Self::DATACENTER_ID_MASK << Self::DATACENTER_ID_SHIFT)
                | (Self::WORKER_ID_MASK << Self::WORKER_ID_SHIFT)
                | (Self::SEQUENCE_MASK << Self::SEQUENCE_SHIFT);

            /// Packs the components into an id, masking each into its field.
            pub const fn from(
                timestamp: u64,
                datacenter_id: u64,
                worker_id: u64,
                sequence: u64,
            ) -> Self {
                let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
                let datacenter_id =
                    (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
                let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
                let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
                Self {
                    id: timestamp | datacenter_id | worker_id | sequence,
                }
            }

            /// Extracts the timestamp from the packed id.
            pub const fn timestamp(&self) -> u64 {
                (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
            }

            /// Extracts the datacenter id from the packed id.
            pub const fn datacenter_id(&self) -> u64 {
                (self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK
            }

            /// Extracts the worker id from the packed id.
            pub const fn worker_id(&self) -> u64 {
                (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
            }

            /// Extracts the sequence number from the packed id.
            pub const fn sequence(&self) -> u64 {
                (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
            }

            /// Returns the maximum representable timestamp value.
            pub const fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            /// Returns the maximum representable datacenter id.
            pub const fn max_datacenter_id() -> u64 {
                Self::DATACENTER_ID_MASK
            }

            /// Returns the maximum representable worker id.
            pub const fn max_worker_id() -> u64 {
                Self::WORKER_ID_MASK
            }

            /// Returns the maximum representable sequence value.
            pub const fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            /// Returns the id as a signed 64-bit integer.
            ///
            /// Non-negative for every layout that reserves the sign bit,
            /// which makes the value safe to store in signed integer columns.
            pub const fn to_i64(&self) -> i64 {
                self.id as i64
            }

            /// Returns the id as a zero-padded 20-digit string.
            pub fn to_padded_string(&self) -> String {
                format!("{:020}", self.id)
            }
        }

        impl $crate::Flake for $name {
            const EPOCH: ::core::time::Duration = $epoch;

            fn timestamp(&self) -> u64 {
                self.timestamp()
            }

            fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            fn datacenter_id(&self) -> u64 {
                self.datacenter_id()
            }

            fn max_datacenter_id() -> u64 {
                Self::DATACENTER_ID_MASK
            }

            fn worker_id(&self) -> u64 {
                self.worker_id()
            }

            fn max_worker_id() -> u64 {
                Self::WORKER_ID_MASK
            }

            fn sequence(&self) -> u64 {
                self.sequence()
            }

            fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            fn from_components(
                timestamp: u64,
                datacenter_id: u64,
                worker_id: u64,
                sequence: u64,
            ) -> Self {
                debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
                debug_assert!(
                    datacenter_id <= Self::DATACENTER_ID_MASK,
                    "datacenter_id overflow"
                );
                debug_assert!(worker_id <= Self::WORKER_ID_MASK, "worker_id overflow");
                debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
                Self::from(timestamp, datacenter_id, worker_id, sequence)
            }

            fn to_raw(&self) -> u64 {
                self.id
            }

            fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }

            fn is_valid(raw: u64) -> bool {
                raw & !Self::PACKED_MASK == 0
            }

            fn to_padded_string(&self) -> String {
                self.to_padded_string()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.id)
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let full = ::core::any::type_name::<Self>();
                let name = full.rsplit("::").next().unwrap_or(full);
                f.debug_struct(name)
                    .field("id", &format_args!("{} (0x{:x})", self.id, self.id))
                    .field("timestamp", &self.timestamp())
                    .field("datacenter_id", &self.datacenter_id())
                    .field("worker_id", &self.worker_id())
                    .field("sequence", &self.sequence())
                    .finish()
            }
        }
    };
}

define_flake!(
    /// A 64-bit snowflake id in the classic layout
    ///
    /// - 1 bit reserved (keeps ids in the positive `i64` range)
    /// - 41 bits timestamp (ms since [`TWITTER_EPOCH`])
    /// - 5 bits datacenter id
    /// - 5 bits worker id
    /// - 12 bits sequence
    ///
    /// ```text
    ///  Bit Index:  63           63 62            22 21             17 16          12 11             0
    ///              +--------------+----------------+-----------------+--------------+---------------+
    ///  Field:      | reserved (1) | timestamp (41) | datacenter (5)  | worker (5)   | sequence (12) |
    ///              +--------------+----------------+-----------------+--------------+---------------+
    ///              |<------------------- MSB --------- 64 bits --------- LSB --------------------->|
    /// ```
    ///
    /// Capacity: ~69 years of timestamp range from the epoch, 1024 distinct
    /// `(datacenter, worker)` identities, and 4096 ids per instance per
    /// millisecond.
    ///
    /// [`TWITTER_EPOCH`]: crate::TWITTER_EPOCH
    ClassicFlake,
    epoch: TWITTER_EPOCH,
    reserved: 1,
    timestamp: 41,
    datacenter_id: 5,
    worker_id: 5,
    sequence: 12
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_fields_and_bounds() {
        let ts = ClassicFlake::max_timestamp();
        let dc = ClassicFlake::max_datacenter_id();
        let w = ClassicFlake::max_worker_id();
        let seq = ClassicFlake::max_sequence();

        let id = ClassicFlake::from(ts, dc, w, seq);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.datacenter_id(), dc);
        assert_eq!(id.worker_id(), w);
        assert_eq!(id.sequence(), seq);
        assert_eq!(ClassicFlake::from_components(ts, dc, w, seq), id);
    }

    #[test]
    fn classic_layout_constants() {
        assert_eq!(ClassicFlake::max_timestamp(), (1 << 41) - 1);
        assert_eq!(ClassicFlake::max_datacenter_id(), 31);
        assert_eq!(ClassicFlake::max_worker_id(), 31);
        assert_eq!(ClassicFlake::max_sequence(), 4095);
        assert_eq!(ClassicFlake::TIMESTAMP_SHIFT, 22);
        assert_eq!(ClassicFlake::DATACENTER_ID_SHIFT, 17);
        assert_eq!(ClassicFlake::WORKER_ID_SHIFT, 12);
    }

    #[test]
    fn classic_packing_matches_shift_formula() {
        let id = ClassicFlake::from(1234, 3, 7, 89);
        let expected = (1234u64 << 22) | (3 << 17) | (7 << 12) | 89;
        assert_eq!(id.to_raw(), expected);
        assert_eq!(ClassicFlake::from_raw(expected), id);
    }

    #[test]
    fn classic_low_bit_fields() {
        let id = ClassicFlake::from_components(0, 0, 0, 0);
        assert_eq!(id.to_raw(), 0);

        let id = ClassicFlake::from_components(1, 1, 1, 1);
        assert_eq!(id.timestamp(), 1);
        assert_eq!(id.datacenter_id(), 1);
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.sequence(), 1);
    }

    #[test]
    fn classic_fits_signed_range() {
        let id = ClassicFlake::from(
            ClassicFlake::max_timestamp(),
            ClassicFlake::max_datacenter_id(),
            ClassicFlake::max_worker_id(),
            ClassicFlake::max_sequence(),
        );
        assert!(id.to_i64() > 0);
        assert_eq!(id.to_i64() as u64, id.to_raw());
    }

    #[test]
    fn classic_validity_tracks_reserved_bit() {
        let id = ClassicFlake::from(42, 1, 2, 3);
        assert!(ClassicFlake::is_valid(id.to_raw()));
        assert!(!ClassicFlake::is_valid(id.to_raw() | 1 << 63));
    }

    #[test]
    fn classic_unix_millis_recovers_wall_clock() {
        let id = ClassicFlake::from_components(42, 0, 0, 0);
        assert_eq!(
            id.unix_millis(),
            TWITTER_EPOCH.as_millis() as u64 + 42
        );
    }

    #[test]
    fn classic_padded_string_sorts_lexicographically() {
        let small = ClassicFlake::from_components(1, 0, 0, 0);
        let large = ClassicFlake::from_components(2, 0, 0, 0);
        let (s, l) = (small.to_padded_string(), large.to_padded_string());
        assert_eq!(s.len(), 20);
        assert_eq!(l.len(), 20);
        assert!(s < l);
    }

    #[test]
    #[should_panic(expected = "timestamp overflow")]
    fn classic_timestamp_overflow_panics() {
        let ts = ClassicFlake::max_timestamp() + 1;
        ClassicFlake::from_components(ts, 0, 0, 0);
    }

    #[test]
    #[should_panic(expected = "datacenter_id overflow")]
    fn classic_datacenter_overflow_panics() {
        let dc = ClassicFlake::max_datacenter_id() + 1;
        ClassicFlake::from_components(0, dc, 0, 0);
    }

    #[test]
    #[should_panic(expected = "worker_id overflow")]
    fn classic_worker_overflow_panics() {
        let w = ClassicFlake::max_worker_id() + 1;
        ClassicFlake::from_components(0, 0, w, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn classic_sequence_overflow_panics() {
        let seq = ClassicFlake::max_sequence() + 1;
        ClassicFlake::from_components(0, 0, 0, seq);
    }

    #[test]
    fn custom_layout_via_macro() {
        use core::time::Duration;

        define_flake!(
            SoloFlake,
            epoch: Duration::from_millis(0),
            reserved: 1,
            timestamp: 47,
            datacenter_id: 2,
            worker_id: 2,
            sequence: 12
        );

        assert_eq!(SoloFlake::max_datacenter_id(), 3);
        assert_eq!(SoloFlake::max_worker_id(), 3);
        assert_eq!(SoloFlake::max_timestamp(), (1 << 47) - 1);

        let id = SoloFlake::from_components(10, 3, 2, 1);
        assert_eq!(id.timestamp(), 10);
        assert_eq!(id.datacenter_id(), 3);
        assert_eq!(id.worker_id(), 2);
        assert_eq!(id.sequence(), 1);
        assert_eq!(SoloFlake::epoch_millis(), 0);
    }
}
