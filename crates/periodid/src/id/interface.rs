use core::fmt;
use core::hash::Hash;

/// The decoded fields of an identifier.
///
/// `period` is the time component: elapsed units since the epoch for
/// Snowflake layouts, the calendar digits (`YYMMDD` or `YYMMDDhhmm`) for
/// order ids, and always zero for sequence ids.
///
/// Decoding a malformed order id yields [`Components::default`], i.e. all
/// fields zero.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Components {
    pub period: u64,
    pub worker_id: u16,
    pub sequence: u64,
}

/// A trait for identifier layouts produced by a generator.
///
/// Every layout is a fixed composition of a period component, a worker id
/// and a per-period sequence. Generators build ids by adding a sequence to
/// a precomputed baseline (see [`PeriodId::from_baseline`]), and callers
/// decode them statelessly with [`PeriodId::components`].
pub trait PeriodId:
    Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash + Send + Sync + 'static
{
    /// Scalar type backing the id (`u64` or `u32`).
    type Ty: Copy + fmt::Debug + fmt::Display + Ord + Hash + Send + Sync + Into<u64>;

    /// Largest worker id the layout can hold.
    fn max_worker_id() -> u16;

    /// Largest sequence value the layout can hold within one period.
    fn max_sequence() -> u64;

    /// Largest period component the layout can hold.
    fn max_period() -> u64;

    /// Constructs an id from its components.
    fn from_components(period: u64, worker_id: u16, sequence: u64) -> Self;

    /// Combines a baseline (an id with a zero sequence, as a raw `u64`) with
    /// a sequence value.
    fn from_baseline(baseline: u64, sequence: u64) -> Self;

    /// Splits the id back into its components.
    fn components(&self) -> Components;

    /// Converts this type into its raw type representation
    fn to_raw(&self) -> Self::Ty;

    /// Converts a raw type into this type
    fn from_raw(raw: Self::Ty) -> Self;
}
