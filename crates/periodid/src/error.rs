use thiserror::Error;

/// A result type defaulting to this crate's [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `periodid` can produce.
///
/// Construction errors are returned before any background task is spawned,
/// so a failed constructor never leaves a partially running generator
/// behind.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The worker id does not fit the scheme's worker field.
    #[error("worker id {worker_id} exceeds the scheme maximum of {max}")]
    WorkerIdOutOfRange { worker_id: u16, max: u16 },

    /// The starting sequence of a sequence generator is not below the
    /// maximum sequence value.
    #[error("start sequence {start} must be below {max}")]
    StartSequenceOutOfRange { start: u64, max: u64 },

    /// A Snowflake epoch lies after the current time. Both values are
    /// seconds since the Unix epoch.
    #[error("epoch {epoch}s is after the current time {now}s")]
    EpochInFuture { epoch: u64, now: i64 },

    /// A Snowflake epoch lies so far in the past that the elapsed time no
    /// longer fits the layout's time field.
    #[error("{elapsed} elapsed units since the epoch exceed the layout maximum of {max}")]
    EpochOutOfRange { elapsed: u64, max: u64 },

    /// The generator was shut down before the request could be answered.
    #[error("generator is closed")]
    Closed,

    /// The counter space is used up and the scheme has no period rollover
    /// that could ever refill it.
    #[error("sequence space exhausted")]
    Exhausted,

    /// The generator was constructed outside of a tokio runtime.
    #[error("no tokio runtime available to drive the generator")]
    NoRuntime,
}
