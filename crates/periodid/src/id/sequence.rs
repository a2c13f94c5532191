use crate::{Components, PeriodId};
use core::fmt;

/// A 64-bit id with no time component: a worker id and an ever-growing
/// sequence.
///
/// - 1 bit reserved
/// - 10 bits worker id
/// - 53 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            53 52             0
///              +--------------+----------------+---------------+
///  Field:      | reserved (1) | worker id (10) | sequence (53) |
///              +--------------+----------------+---------------+
///              |<------- MSB ------- 64 bits ------ LSB ------>|
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceId {
    id: u64,
}

impl SequenceId {
    pub const WORKER_ID_BITS: u32 = 10;
    pub const SEQUENCE_BITS: u32 = 63 - Self::WORKER_ID_BITS;

    pub const WORKER_ID_SHIFT: u32 = Self::SEQUENCE_BITS;

    pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    pub const fn from(worker_id: u64, sequence: u64) -> Self {
        let w = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let s = sequence & Self::SEQUENCE_MASK;
        Self { id: w | s }
    }

    /// Extracts the worker id.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u64 {
        self.id & Self::SEQUENCE_MASK
    }
}

impl PeriodId for SequenceId {
    type Ty = u64;

    fn max_worker_id() -> u16 {
        Self::WORKER_ID_MASK as u16
    }

    fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    fn max_period() -> u64 {
        0
    }

    fn from_components(_period: u64, worker_id: u16, sequence: u64) -> Self {
        debug_assert!(u64::from(worker_id) <= Self::WORKER_ID_MASK, "worker_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(u64::from(worker_id), sequence)
    }

    fn from_baseline(baseline: u64, sequence: u64) -> Self {
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self {
            id: baseline | (sequence & Self::SEQUENCE_MASK),
        }
    }

    fn components(&self) -> Components {
        Components {
            period: 0,
            worker_id: self.worker_id() as u16,
            sequence: self.sequence(),
        }
    }

    fn to_raw(&self) -> u64 {
        self.id
    }

    fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }
}

impl From<SequenceId> for u64 {
    fn from(id: SequenceId) -> Self {
        id.id
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceId")
            .field("id", &format_args!("{} (0x{:x})", self.id, self.id))
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
