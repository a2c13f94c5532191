/// Declares a packed binary identifier with an elapsed-time field, a worker
/// field and a sequence field, laid out from MSB to LSB:
///
/// ```text
///  +--------------+-------------+----------------+--------------+
///  | reserved (R) | elapsed (E) | worker id (W)  | sequence (S) |
///  +--------------+-------------+----------------+--------------+
///  |<------------- MSB ---- R+E+W+S bits ---- LSB ------------->|
/// ```
///
/// The total width must equal the width of the backing integer.
macro_rules! define_flake_id {
    (
        $(#[$meta:meta])*
        $name:ident, $int:ty,
        reserved: $reserved_bits:expr,
        elapsed: $elapsed_bits:expr,
        worker: $worker_bits:expr,
        sequence: $sequence_bits:expr
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            id: $int,
        }

        const _: () = {
            // Compile-time check: total bit width _must_ equal the backing
            // type.
            assert!(
                $reserved_bits + $elapsed_bits + $worker_bits + $sequence_bits == <$int>::BITS,
                "Snowflake layout does not match the underlying integer type"
            );
            assert!($worker_bits <= u16::BITS, "worker field wider than u16");
        };

        impl $name {
            pub const RESERVED_BITS: u32 = $reserved_bits;
            pub const ELAPSED_BITS: u32 = $elapsed_bits;
            pub const WORKER_ID_BITS: u32 = $worker_bits;
            pub const SEQUENCE_BITS: u32 = $sequence_bits;

            pub const SEQUENCE_SHIFT: u32 = 0;
            pub const WORKER_ID_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
            pub const ELAPSED_SHIFT: u32 = Self::WORKER_ID_SHIFT + Self::WORKER_ID_BITS;

            pub const ELAPSED_MASK: $int = (1 << Self::ELAPSED_BITS) - 1;
            pub const WORKER_ID_MASK: $int = (1 << Self::WORKER_ID_BITS) - 1;
            pub const SEQUENCE_MASK: $int = (1 << Self::SEQUENCE_BITS) - 1;

            pub const fn from(elapsed: $int, worker_id: $int, sequence: $int) -> Self {
                let e = (elapsed & Self::ELAPSED_MASK) << Self::ELAPSED_SHIFT;
                let w = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
                let s = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
                Self { id: e | w | s }
            }

            /// Extracts the elapsed time units since the epoch.
            pub const fn elapsed(&self) -> $int {
                (self.id >> Self::ELAPSED_SHIFT) & Self::ELAPSED_MASK
            }

            /// Extracts the worker id.
            pub const fn worker_id(&self) -> $int {
                (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
            }

            /// Extracts the sequence number.
            pub const fn sequence(&self) -> $int {
                (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
            }
        }

        impl $crate::PeriodId for $name {
            type Ty = $int;

            fn max_worker_id() -> u16 {
                Self::WORKER_ID_MASK as u16
            }

            fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK as u64
            }

            fn max_period() -> u64 {
                Self::ELAPSED_MASK as u64
            }

            fn from_components(period: u64, worker_id: u16, sequence: u64) -> Self {
                debug_assert!(period <= Self::ELAPSED_MASK as u64, "elapsed overflow");
                debug_assert!((worker_id as $int) <= Self::WORKER_ID_MASK, "worker_id overflow");
                debug_assert!(sequence <= Self::SEQUENCE_MASK as u64, "sequence overflow");
                Self::from(period as $int, worker_id as $int, sequence as $int)
            }

            fn from_baseline(baseline: u64, sequence: u64) -> Self {
                debug_assert!(sequence <= Self::SEQUENCE_MASK as u64, "sequence overflow");
                Self {
                    id: (baseline as $int) | ((sequence as $int) & Self::SEQUENCE_MASK),
                }
            }

            fn components(&self) -> $crate::Components {
                $crate::Components {
                    period: self.elapsed() as u64,
                    worker_id: self.worker_id() as u16,
                    sequence: self.sequence() as u64,
                }
            }

            fn to_raw(&self) -> Self::Ty {
                self.id
            }

            fn from_raw(raw: Self::Ty) -> Self {
                Self { id: raw }
            }
        }

        impl From<$name> for $int {
            fn from(id: $name) -> Self {
                id.id
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.id)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let full = core::any::type_name::<Self>();
                let name = full.rsplit("::").next().unwrap_or(full);
                f.debug_struct(name)
                    .field("id", &format_args!("{} (0x{:x})", self.id, self.id))
                    .field("elapsed", &self.elapsed())
                    .field("worker_id", &self.worker_id())
                    .field("sequence", &self.sequence())
                    .finish()
            }
        }
    };
}

define_flake_id!(
    /// A 64-bit Snowflake id counting whole seconds since the epoch.
    ///
    /// - 1 bit reserved
    /// - 31 bits elapsed seconds (~68 years)
    /// - 10 bits worker id
    /// - 22 bits sequence (4,194,304 ids per second)
    ///
    /// ```text
    ///  Bit Index:  63           63 62             32 31            22 21             0
    ///              +--------------+-----------------+----------------+---------------+
    ///  Field:      | reserved (1) | elapsed s (31)  | worker id (10) | sequence (22) |
    ///              +--------------+-----------------+----------------+---------------+
    ///              |<------------ MSB ----------- 64 bits ----------- LSB ---------->|
    /// ```
    SnowflakeSecondId, u64,
    reserved: 1,
    elapsed: 31,
    worker: 10,
    sequence: 22
);

define_flake_id!(
    /// A 32-bit Snowflake id counting whole days since the epoch.
    ///
    /// - 13 bits elapsed days (~22 years)
    /// - 2 bits worker id
    /// - 17 bits sequence (131,072 ids per day)
    ///
    /// ```text
    ///  Bit Index:  31             19 18            17 16             0
    ///              +----------------+----------------+---------------+
    ///  Field:      | elapsed d (13) | worker id (2)  | sequence (17) |
    ///              +----------------+----------------+---------------+
    ///              |<------- MSB ------ 32 bits ------ LSB --------->|
    /// ```
    SnowflakeDayId, u32,
    reserved: 0,
    elapsed: 13,
    worker: 2,
    sequence: 17
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Components, PeriodId};

    #[test]
    fn second_layout_fields_and_bounds() {
        assert_eq!(SnowflakeSecondId::max_worker_id(), 1023);
        assert_eq!(SnowflakeSecondId::max_sequence(), 4_194_303);
        assert_eq!(SnowflakeSecondId::max_period(), (1 << 31) - 1);

        let id = SnowflakeSecondId::from_components(
            SnowflakeSecondId::max_period(),
            1023,
            SnowflakeSecondId::max_sequence(),
        );
        assert_eq!(id.to_raw(), u64::MAX >> 1);
        assert_eq!(
            id.components(),
            Components {
                period: (1 << 31) - 1,
                worker_id: 1023,
                sequence: 4_194_303,
            }
        );
    }

    #[test]
    fn day_layout_fits_u32() {
        assert_eq!(SnowflakeDayId::max_worker_id(), 3);
        assert_eq!(SnowflakeDayId::max_sequence(), 131_071);

        let id = SnowflakeDayId::from_components(1461, 2, 86_399);
        let raw: u32 = id.into();
        assert_eq!(raw, (1461 << 19) | (2 << 17) | 86_399);
        assert_eq!(SnowflakeDayId::from_raw(raw).components().period, 1461);
        assert_eq!(id.components().worker_id, 2);
        assert_eq!(id.components().sequence, 86_399);
    }

    #[test]
    fn baseline_plus_sequence_matches_components() {
        let base = SnowflakeSecondId::from_components(125_000_000, 7, 0).to_raw();
        for seq in [0, 1, 4096, SnowflakeSecondId::max_sequence()] {
            assert_eq!(
                SnowflakeSecondId::from_baseline(base, seq),
                SnowflakeSecondId::from_components(125_000_000, 7, seq)
            );
        }
    }

    #[test]
    fn ordering_follows_elapsed_then_sequence() {
        let a = SnowflakeSecondId::from_components(10, 1023, 4_194_303);
        let b = SnowflakeSecondId::from_components(11, 0, 0);
        assert!(a < b);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        SnowflakeDayId::from_components(0, 0, SnowflakeDayId::max_sequence() + 1);
    }

    #[test]
    #[should_panic(expected = "worker_id overflow")]
    fn worker_overflow_panics() {
        SnowflakeDayId::from_components(0, 4, 0);
    }
}
