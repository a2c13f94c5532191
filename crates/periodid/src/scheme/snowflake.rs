use crate::{
    Baseline, Error, PeriodId, Result, Scheme, SnowflakeDayId, SnowflakeSecondId,
    scheme::interface::check_worker_id,
};
use chrono::{DateTime, Utc};
use core::{marker::PhantomData, time::Duration};

const SECS_PER_DAY: u64 = 86_400;

/// A Snowflake layout whose time field counts fixed-length units since an
/// epoch.
pub trait ElapsedLayout: PeriodId {
    /// Length of one time unit in seconds.
    const UNIT_SECS: u64;

    /// Counter value a freshly started generator begins at, given the
    /// seconds already elapsed within the current unit. Periods reached by
    /// a rollover always begin at zero.
    fn offset(secs_into_unit: u64) -> u64;
}

impl ElapsedLayout for SnowflakeSecondId {
    const UNIT_SECS: u64 = 1;

    fn offset(_secs_into_unit: u64) -> u64 {
        0
    }
}

impl ElapsedLayout for SnowflakeDayId {
    const UNIT_SECS: u64 = SECS_PER_DAY;

    fn offset(secs_into_unit: u64) -> u64 {
        secs_into_unit
    }
}

/// A Snowflake scheme: `elapsed units ‖ worker id ‖ sequence`, where the
/// period is one elapsed unit (a second or a UTC day) since the epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnowflakeScheme<ID: ElapsedLayout> {
    worker_id: u16,
    epoch: Duration,
    _id: PhantomData<fn() -> ID>,
}

/// 64-bit Snowflake ids with a per-second period.
pub type SnowflakeSecondScheme = SnowflakeScheme<SnowflakeSecondId>;

/// 32-bit Snowflake ids with a per-day period.
pub type SnowflakeDayScheme = SnowflakeScheme<SnowflakeDayId>;

impl<ID: ElapsedLayout> SnowflakeScheme<ID> {
    /// Creates a Snowflake scheme counting from `epoch`, given as a
    /// [`Duration`] since 1970-01-01 UTC (see [`DEFAULT_EPOCH`]).
    ///
    /// The epoch is checked against the generator's clock when the
    /// generator starts (see [`Scheme::validate`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerIdOutOfRange`] if `worker_id` does not fit
    /// the layout's worker field.
    ///
    /// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
    pub fn new(worker_id: u16, epoch: Duration) -> Result<Self> {
        Ok(Self {
            worker_id: check_worker_id::<ID>(worker_id)?,
            epoch,
            _id: PhantomData,
        })
    }

    /// The epoch as a [`Duration`] since the Unix epoch.
    pub fn epoch(&self) -> Duration {
        self.epoch
    }

    /// Whole units elapsed since the epoch at `now`, and the seconds already
    /// spent in the current unit. Instants before the epoch count as zero.
    fn elapsed(&self, now: DateTime<Utc>) -> (u64, u64) {
        let now_secs = u64::try_from(now.timestamp()).unwrap_or(0);
        let units = now_secs / ID::UNIT_SECS;
        let epoch_units = self.epoch.as_secs() / ID::UNIT_SECS;
        (units.saturating_sub(epoch_units), now_secs % ID::UNIT_SECS)
    }
}

impl<ID: ElapsedLayout> Scheme for SnowflakeScheme<ID> {
    type Id = ID;

    fn worker_id(&self) -> u16 {
        self.worker_id
    }

    fn tick(&self) -> Option<Duration> {
        Some(Duration::from_secs(ID::UNIT_SECS))
    }

    fn period_of(&self, now: DateTime<Utc>) -> u64 {
        // Saturate rather than wrap: a wrapped time field would sort before
        // every id issued so far.
        self.elapsed(now).0.min(ID::max_period())
    }

    fn baseline(&self, now: DateTime<Utc>) -> Baseline {
        let period = self.period_of(now);
        Baseline {
            period,
            value: ID::from_components(period, self.worker_id, 0).to_raw().into(),
            initial_counter: 0,
        }
    }

    fn initial_baseline(&self, now: DateTime<Utc>) -> Baseline {
        let (_, into_unit) = self.elapsed(now);
        Baseline {
            initial_counter: ID::offset(into_unit),
            ..self.baseline(now)
        }
    }

    fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        let epoch = self.epoch.as_secs();
        if i64::try_from(epoch).map_or(true, |epoch| epoch > now.timestamp()) {
            return Err(Error::EpochInFuture {
                epoch,
                now: now.timestamp(),
            });
        }
        let (elapsed, _) = self.elapsed(now);
        let max = ID::max_period();
        if elapsed > max {
            return Err(Error::EpochOutOfRange { elapsed, max });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Components, DEFAULT_EPOCH, UNIX_EPOCH};
    use chrono::TimeZone;

    #[test]
    fn worker_bounds_follow_layout() {
        assert!(SnowflakeSecondScheme::new(1023, DEFAULT_EPOCH).is_ok());
        assert_eq!(
            SnowflakeSecondScheme::new(1024, DEFAULT_EPOCH),
            Err(Error::WorkerIdOutOfRange {
                worker_id: 1024,
                max: 1023,
            })
        );
        assert!(SnowflakeDayScheme::new(3, DEFAULT_EPOCH).is_ok());
        assert_eq!(
            SnowflakeDayScheme::new(4, DEFAULT_EPOCH),
            Err(Error::WorkerIdOutOfRange {
                worker_id: 4,
                max: 3,
            })
        );
    }

    #[test]
    fn epoch_in_future_is_rejected() {
        let scheme = SnowflakeSecondScheme::new(1, DEFAULT_EPOCH).unwrap();
        let before_epoch = Utc.with_ymd_and_hms(2020, 4, 19, 23, 59, 59).unwrap();
        assert_eq!(
            scheme.validate(before_epoch),
            Err(Error::EpochInFuture {
                epoch: 1_587_340_800,
                now: 1_587_340_799,
            })
        );
        assert_eq!(scheme.validate(Utc.timestamp_opt(1_587_340_800, 0).unwrap()), Ok(()));
    }

    #[test]
    fn ancient_epoch_overflows_day_layout() {
        let scheme = SnowflakeDayScheme::new(1, UNIX_EPOCH).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 20, 0, 0, 0).unwrap();
        assert_eq!(
            scheme.validate(now),
            Err(Error::EpochOutOfRange {
                elapsed: 19_833,
                max: 8191,
            })
        );
        assert_eq!(scheme.period_of(now), 8191);
    }

    #[test]
    fn second_baseline_packs_elapsed_and_worker() {
        let scheme = SnowflakeSecondScheme::new(5, DEFAULT_EPOCH).unwrap();
        let now = Utc.timestamp_opt(1_587_340_800 + 1_000, 0).unwrap();
        let baseline = scheme.baseline(now);
        assert_eq!(baseline.period, 1_000);
        assert_eq!(baseline.initial_counter, 0);
        assert_eq!(baseline.value, (1_000 << 32) | (5 << 22));

        let id = scheme.encode(&baseline, 9);
        assert_eq!(
            scheme.decompose(id),
            Components {
                period: 1_000,
                worker_id: 5,
                sequence: 9,
            }
        );
    }

    #[test]
    fn day_start_counter_is_seconds_into_day() {
        let scheme = SnowflakeDayScheme::new(2, DEFAULT_EPOCH).unwrap();
        // 2024-04-20 is 1461 days after 2020-04-20
        let now = Utc.with_ymd_and_hms(2024, 4, 20, 1, 0, 5).unwrap();
        let baseline = scheme.initial_baseline(now);
        assert_eq!(baseline.period, 1461);
        assert_eq!(baseline.initial_counter, 3605);
        assert_eq!(scheme.tick(), Some(Duration::from_secs(86_400)));

        let id = scheme.encode(&baseline, baseline.initial_counter);
        let raw: u32 = id.to_raw();
        assert_eq!(raw, (1461 << 19) | (2 << 17) | 3605);
    }

    #[test]
    fn day_period_is_the_utc_day() {
        let scheme = SnowflakeDayScheme::new(0, DEFAULT_EPOCH).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 4, 20, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 4, 20, 0, 0, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 4, 21, 0, 0, 0).unwrap();
        assert!(scheme.same_period(early, late));
        assert_eq!(scheme.period_of(next), scheme.period_of(late) + 1);
    }

    #[test]
    fn day_rollover_counter_starts_at_zero() {
        let scheme = SnowflakeDayScheme::new(1, DEFAULT_EPOCH).unwrap();
        let midday = Utc.with_ymd_and_hms(2024, 4, 21, 12, 0, 0).unwrap();

        let rolled = scheme.baseline(midday);
        assert_eq!(rolled.period, 1462);
        assert_eq!(rolled.initial_counter, 0);
        assert_eq!(scheme.initial_baseline(midday).initial_counter, 43_200);
        assert_eq!(scheme.initial_baseline(midday).value, rolled.value);
    }

    #[test]
    fn second_start_and_rollover_agree() {
        let scheme = SnowflakeSecondScheme::new(3, DEFAULT_EPOCH).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap();
        assert_eq!(scheme.initial_baseline(now), scheme.baseline(now));
    }
}
