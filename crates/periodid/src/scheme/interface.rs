use crate::{Components, Error, PeriodId, Result};
use chrono::{DateTime, Utc};
use core::time::Duration;

/// The value contribution fixed for one period.
///
/// A baseline is computed by the period clock and never mutated after it
/// has been published; the serializer combines it with its own counter,
/// which starts at `initial_counter` whenever a fresh baseline goes live.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Baseline {
    /// Period key. Newer periods always have larger keys.
    pub period: u64,
    /// Raw id with a zero sequence (period and worker fields only).
    pub value: u64,
    /// Counter value the first id of this period uses.
    pub initial_counter: u64,
}

/// An identifier scheme: the constants and behavior one generator variant
/// runs with.
///
/// Each implementation is a closed, statically selected variant (sequence,
/// short/long order id, second/day Snowflake). The generator engine is
/// generic over this trait and knows nothing about calendars or bit
/// layouts.
pub trait Scheme: Send + Sync + 'static {
    /// The identifier layout this scheme mints.
    type Id: PeriodId;

    /// The worker id encoded into every identifier.
    fn worker_id(&self) -> u16;

    /// Largest counter value usable within one period.
    fn max_counter(&self) -> u64 {
        Self::Id::max_sequence()
    }

    /// How often the period clock samples time, or `None` if the baseline
    /// never rotates.
    fn tick(&self) -> Option<Duration>;

    /// Period key of the instant `now`.
    fn period_of(&self, now: DateTime<Utc>) -> u64;

    /// Returns `true` if both instants fall into the same period.
    fn same_period(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.period_of(a) == self.period_of(b)
    }

    /// Computes the baseline of the period containing `now`, as published
    /// on a rollover.
    fn baseline(&self, now: DateTime<Utc>) -> Baseline;

    /// Computes the baseline a generator starts with at `now`. Defaults to
    /// [`Scheme::baseline`]; schemes that start a fresh generator partway
    /// into its period override this.
    fn initial_baseline(&self, now: DateTime<Utc>) -> Baseline {
        self.baseline(now)
    }

    /// Combines a baseline with a counter value.
    fn encode(&self, baseline: &Baseline, counter: u64) -> Self::Id {
        Self::Id::from_baseline(baseline.value, counter)
    }

    /// Splits an identifier back into its components.
    fn decompose(&self, id: Self::Id) -> Components {
        id.components()
    }

    /// Checks time-dependent parameters against the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme cannot mint ids at `now`, e.g. a
    /// Snowflake epoch in the future.
    fn validate(&self, _now: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}

/// Rejects worker ids that do not fit the layout's worker field.
pub(crate) fn check_worker_id<ID: PeriodId>(worker_id: u16) -> Result<u16> {
    let max = ID::max_worker_id();
    if worker_id > max {
        return Err(Error::WorkerIdOutOfRange { worker_id, max });
    }
    Ok(worker_id)
}
