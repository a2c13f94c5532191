use crate::{
    Baseline, Error, PeriodId, Result, Scheme, SequenceId, scheme::interface::check_worker_id,
};
use chrono::{DateTime, Utc};
use core::time::Duration;

/// A scheme without a time component: one static baseline and a counter
/// that grows until the 53-bit sequence space is used up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceScheme {
    worker_id: u16,
    start: u64,
}

impl SequenceScheme {
    /// Creates a sequence scheme whose first id carries sequence `start`.
    ///
    /// # Errors
    ///
    /// - [`Error::WorkerIdOutOfRange`] if `worker_id` exceeds 1023.
    /// - [`Error::StartSequenceOutOfRange`] if `start` is not below the
    ///   maximum sequence.
    pub fn new(worker_id: u16, start: u64) -> Result<Self> {
        let worker_id = check_worker_id::<SequenceId>(worker_id)?;
        let max = SequenceId::max_sequence();
        if start >= max {
            return Err(Error::StartSequenceOutOfRange { start, max });
        }
        Ok(Self { worker_id, start })
    }

    /// The sequence the first id is minted with.
    pub fn start(&self) -> u64 {
        self.start
    }
}

impl Scheme for SequenceScheme {
    type Id = SequenceId;

    fn worker_id(&self) -> u16 {
        self.worker_id
    }

    fn tick(&self) -> Option<Duration> {
        None
    }

    fn period_of(&self, _now: DateTime<Utc>) -> u64 {
        0
    }

    fn baseline(&self, _now: DateTime<Utc>) -> Baseline {
        Baseline {
            period: 0,
            value: SequenceId::from_components(0, self.worker_id, 0).to_raw(),
            initial_counter: self.start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Components;
    use chrono::TimeZone;

    #[test]
    fn rejects_out_of_range_parameters() {
        assert_eq!(
            SequenceScheme::new(1024, 0),
            Err(Error::WorkerIdOutOfRange {
                worker_id: 1024,
                max: 1023,
            })
        );
        let max = SequenceId::max_sequence();
        assert_eq!(
            SequenceScheme::new(0, max),
            Err(Error::StartSequenceOutOfRange { start: max, max })
        );
        assert!(SequenceScheme::new(1023, max - 1).is_ok());
    }

    #[test]
    fn every_instant_is_the_same_period() {
        let scheme = SequenceScheme::new(1, 0).unwrap();
        assert!(scheme.same_period(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(), Utc::now()));
        assert_eq!(scheme.tick(), None);
    }

    #[test]
    fn encodes_worker_and_counter() {
        let scheme = SequenceScheme::new(1, 0).unwrap();
        let baseline = scheme.baseline(Utc::now());
        assert_eq!(baseline.initial_counter, 0);

        let first = scheme.encode(&baseline, 0);
        let second = scheme.encode(&baseline, 1);
        assert_eq!(
            scheme.decompose(first),
            Components {
                period: 0,
                worker_id: 1,
                sequence: 0,
            }
        );
        assert_eq!(scheme.decompose(second).sequence, 1);
    }
}
