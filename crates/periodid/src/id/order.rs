/// Number of decimal digits in `n` (`0` has one digit).
pub(crate) const fn decimal_width(n: u64) -> u32 {
    match n.checked_ilog10() {
        Some(d) => d + 1,
        None => 1,
    }
}

/// Declares a human-readable decimal identifier: calendar digits, a
/// zero-padded sequence and a zero-padded worker id, concatenated and read
/// as one integer.
///
/// ```text
///  +--------------+--------------+------------+
///  | calendar (C) | sequence (S) | worker (W) |
///  +--------------+--------------+------------+
///  |<--- most significant ---- C+S+W digits ->|
/// ```
///
/// An id whose decimal width is not exactly `C+S+W` is malformed and
/// decodes to zeroed [`Components`](crate::Components).
macro_rules! define_order_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        calendar: $calendar_digits:expr,
        sequence: $sequence_digits:expr,
        worker: $worker_digits:expr
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            id: u64,
        }

        const _: () = {
            assert!(
                $calendar_digits + $sequence_digits + $worker_digits <= 19,
                "Order layout does not fit in a u64"
            );
            assert!($worker_digits <= 4, "worker field wider than u16");
        };

        impl $name {
            pub const CALENDAR_DIGITS: u32 = $calendar_digits;
            pub const SEQUENCE_DIGITS: u32 = $sequence_digits;
            pub const WORKER_ID_DIGITS: u32 = $worker_digits;
            pub const TOTAL_DIGITS: u32 =
                Self::CALENDAR_DIGITS + Self::SEQUENCE_DIGITS + Self::WORKER_ID_DIGITS;

            pub const WORKER_ID_SCALE: u64 = 1;
            pub const SEQUENCE_SCALE: u64 = 10u64.pow(Self::WORKER_ID_DIGITS);
            pub const CALENDAR_SCALE: u64 = 10u64.pow(Self::SEQUENCE_DIGITS + Self::WORKER_ID_DIGITS);

            pub const MAX_CALENDAR: u64 = 10u64.pow(Self::CALENDAR_DIGITS) - 1;
            pub const MAX_SEQUENCE: u64 = 10u64.pow(Self::SEQUENCE_DIGITS) - 1;
            pub const MAX_WORKER_ID: u64 = 10u64.pow(Self::WORKER_ID_DIGITS) - 1;

            pub const fn from(calendar: u64, worker_id: u64, sequence: u64) -> Self {
                let c = (calendar % (Self::MAX_CALENDAR + 1)) * Self::CALENDAR_SCALE;
                let s = (sequence % (Self::MAX_SEQUENCE + 1)) * Self::SEQUENCE_SCALE;
                let w = (worker_id % (Self::MAX_WORKER_ID + 1)) * Self::WORKER_ID_SCALE;
                Self { id: c + s + w }
            }

            /// Returns `true` if the id has exactly the layout's digit count.
            pub const fn is_well_formed(&self) -> bool {
                $crate::id::decimal_width(self.id) == Self::TOTAL_DIGITS
            }

            /// Extracts the calendar digits.
            pub const fn calendar(&self) -> u64 {
                (self.id / Self::CALENDAR_SCALE) % (Self::MAX_CALENDAR + 1)
            }

            /// Extracts the worker id.
            pub const fn worker_id(&self) -> u64 {
                (self.id / Self::WORKER_ID_SCALE) % (Self::MAX_WORKER_ID + 1)
            }

            /// Extracts the sequence number.
            pub const fn sequence(&self) -> u64 {
                (self.id / Self::SEQUENCE_SCALE) % (Self::MAX_SEQUENCE + 1)
            }
        }

        impl $crate::PeriodId for $name {
            type Ty = u64;

            fn max_worker_id() -> u16 {
                Self::MAX_WORKER_ID as u16
            }

            fn max_sequence() -> u64 {
                Self::MAX_SEQUENCE
            }

            fn max_period() -> u64 {
                Self::MAX_CALENDAR
            }

            fn from_components(period: u64, worker_id: u16, sequence: u64) -> Self {
                debug_assert!(period <= Self::MAX_CALENDAR, "calendar overflow");
                debug_assert!(u64::from(worker_id) <= Self::MAX_WORKER_ID, "worker_id overflow");
                debug_assert!(sequence <= Self::MAX_SEQUENCE, "sequence overflow");
                Self::from(period, u64::from(worker_id), sequence)
            }

            fn from_baseline(baseline: u64, sequence: u64) -> Self {
                debug_assert!(sequence <= Self::MAX_SEQUENCE, "sequence overflow");
                Self {
                    id: baseline + sequence * Self::SEQUENCE_SCALE,
                }
            }

            fn components(&self) -> $crate::Components {
                if !self.is_well_formed() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "{} has {} digits, expected {}",
                        self.id,
                        $crate::id::decimal_width(self.id),
                        Self::TOTAL_DIGITS
                    );
                    return $crate::Components::default();
                }
                $crate::Components {
                    period: self.calendar(),
                    worker_id: self.worker_id() as u16,
                    sequence: self.sequence(),
                }
            }

            fn to_raw(&self) -> Self::Ty {
                self.id
            }

            fn from_raw(raw: Self::Ty) -> Self {
                Self { id: raw }
            }
        }

        impl From<$name> for u64 {
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
                    .field("id", &self.id)
                    .field("calendar", &format_args!(
                        "{:0width$}",
                        self.calendar(),
                        width = Self::CALENDAR_DIGITS as usize
                    ))
                    .field("sequence", &self.sequence())
                    .field("worker_id", &self.worker_id())
                    .finish()
            }
        }
    };
}

define_order_id!(
    /// A 15-digit order id stamped with the local date.
    ///
    /// `YYMMDD` ‖ 7-digit sequence ‖ 2-digit worker id, e.g.
    /// `240420 0000042 01` is read as `240420000004201`.
    ShortOrderId,
    calendar: 6,
    sequence: 7,
    worker: 2
);

define_order_id!(
    /// An 18-digit order id stamped with the local date and minute.
    ///
    /// `YYMMDDhhmm` ‖ 6-digit sequence ‖ 2-digit worker id, e.g.
    /// `2404201530 000042 01` is read as `240420153000004201`.
    LongOrderId,
    calendar: 10,
    sequence: 6,
    worker: 2
);
