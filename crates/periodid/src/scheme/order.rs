use crate::{
    Baseline, LongOrderId, PeriodId, Result, Scheme, ShortOrderId, Zone,
    scheme::interface::check_worker_id,
};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use core::{marker::PhantomData, time::Duration};

/// An order id layout stamped with local calendar digits.
pub trait CalendarLayout: PeriodId {
    /// Calendar digits of `local`; this is also the period key.
    fn calendar(local: &NaiveDateTime) -> u64;

    /// Counter value the first id of the period containing `local` starts
    /// at.
    fn offset(local: &NaiveDateTime) -> u64;
}

fn yymmdd(local: &NaiveDateTime) -> u64 {
    let yy = local.year().rem_euclid(100) as u64;
    yy * 10_000 + u64::from(local.month()) * 100 + u64::from(local.day())
}

impl CalendarLayout for ShortOrderId {
    /// `YYMMDD`
    fn calendar(local: &NaiveDateTime) -> u64 {
        yymmdd(local)
    }

    /// Seconds since local midnight, so that a generator restarted later
    /// in the day does not replay the low counters of its predecessor.
    fn offset(local: &NaiveDateTime) -> u64 {
        u64::from(local.num_seconds_from_midnight())
    }
}

impl CalendarLayout for LongOrderId {
    /// `YYMMDDhhmm`
    fn calendar(local: &NaiveDateTime) -> u64 {
        yymmdd(local) * 10_000 + u64::from(local.hour()) * 100 + u64::from(local.minute())
    }

    /// Second within the minute.
    fn offset(local: &NaiveDateTime) -> u64 {
        u64::from(local.second())
    }
}

/// A decimal order id scheme. The period is one local calendar day for
/// [`ShortOrderId`] and one local calendar minute for [`LongOrderId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderScheme<ID: CalendarLayout> {
    worker_id: u16,
    zone: Zone,
    _id: PhantomData<fn() -> ID>,
}

/// Order ids of the form `YYMMDD`‖sequence‖worker.
pub type ShortOrderScheme = OrderScheme<ShortOrderId>;

/// Order ids of the form `YYMMDDhhmm`‖sequence‖worker.
pub type LongOrderScheme = OrderScheme<LongOrderId>;

impl<ID: CalendarLayout> OrderScheme<ID> {
    /// Creates an order scheme stamping dates in `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerIdOutOfRange`] if `worker_id` exceeds 99.
    ///
    /// [`Error::WorkerIdOutOfRange`]: crate::Error::WorkerIdOutOfRange
    pub fn new(worker_id: u16, zone: Zone) -> Result<Self> {
        Ok(Self {
            worker_id: check_worker_id::<ID>(worker_id)?,
            zone,
            _id: PhantomData,
        })
    }

    /// The zone calendar digits are taken in.
    pub fn zone(&self) -> Zone {
        self.zone
    }
}

impl<ID: CalendarLayout> Scheme for OrderScheme<ID> {
    type Id = ID;

    fn worker_id(&self) -> u16 {
        self.worker_id
    }

    fn tick(&self) -> Option<Duration> {
        Some(Duration::from_secs(1))
    }

    fn period_of(&self, now: DateTime<Utc>) -> u64 {
        ID::calendar(&self.zone.local(now))
    }

    fn baseline(&self, now: DateTime<Utc>) -> Baseline {
        let local = self.zone.local(now);
        let period = ID::calendar(&local);
        Baseline {
            period,
            value: ID::from_components(period, self.worker_id, 0).to_raw().into(),
            initial_counter: ID::offset(&local),
        }
    }
}
