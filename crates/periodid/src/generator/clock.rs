use crate::{Scheme, TimeSource, generator::DoubleBuffer};
use core::{cmp::Ordering, time::Duration};
use std::sync::Arc;
use tokio::{
    sync::Notify,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

/// Background task deciding the current period and publishing its baseline.
///
/// On every tick the clock samples its [`TimeSource`]. When the sample falls
/// into a newer period than the live baseline, it writes a fresh baseline
/// into the inactive buffer slot, flips the active index, and wakes a
/// serializer stalled on an exhausted counter.
///
/// Periods only move forward: a sample that maps to an older period (the
/// wall clock was stepped back) is ignored, and the live baseline stays in
/// place until time catches up with it.
pub(crate) struct PeriodClock<S, T>
where
    S: Scheme,
    T: TimeSource,
{
    scheme: Arc<S>,
    time: T,
    buffer: Arc<DoubleBuffer>,
    rollover: Arc<Notify>,
    current: u64,
}

impl<S, T> PeriodClock<S, T>
where
    S: Scheme,
    T: TimeSource,
{
    pub(crate) fn new(
        scheme: Arc<S>,
        time: T,
        buffer: Arc<DoubleBuffer>,
        rollover: Arc<Notify>,
    ) -> Self {
        let current = buffer.load().baseline.period;
        Self {
            scheme,
            time,
            buffer,
            rollover,
            current,
        }
    }

    /// Ticks every `tick` until `shutdown` is cancelled.
    pub(crate) async fn run(mut self, tick: Duration, shutdown: CancellationToken) {
        #[cfg(feature = "tracing")]
        tracing::debug!(?tick, period = self.current, "period clock started");

        let mut interval = time::interval_at(Instant::now() + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    self.on_tick();
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(period = self.current, "period clock stopped");
    }

    /// Samples the time source once and rotates if a newer period began.
    /// Returns `true` if a new baseline was published.
    pub(crate) fn on_tick(&mut self) -> bool {
        let now = self.time.now();
        let period = self.scheme.period_of(now);
        match period.cmp(&self.current) {
            Ordering::Equal => false,
            Ordering::Greater => {
                let baseline = self.scheme.baseline(now);
                let _snapshot = self.buffer.publish(baseline);
                self.current = baseline.period;
                // Wakes a stalled serializer; with nobody waiting this is a
                // no-op and stores no permit.
                self.rollover.notify_waiters();

                #[cfg(feature = "tracing")]
                tracing::trace!(
                    period = baseline.period,
                    generation = _snapshot.generation,
                    "published baseline"
                );
                true
            }
            Ordering::Less => {
                self.cold_clock_behind(period);
                false
            }
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, _period: u64) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            sampled = _period,
            current = self.current,
            "wall clock moved backwards; keeping current period"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ShortOrderScheme, Zone};
    use chrono::{DateTime, TimeZone, Utc};
    use parking_lot::Mutex;

    #[derive(Clone)]
    struct StepTime(Arc<Mutex<DateTime<Utc>>>);

    impl TimeSource for StepTime {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    fn setup() -> (PeriodClock<ShortOrderScheme, StepTime>, StepTime, Arc<DoubleBuffer>) {
        let scheme = Arc::new(ShortOrderScheme::new(1, Zone::from(chrono_tz::Tz::UTC)).unwrap());
        let time = StepTime(Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap(),
        )));
        let buffer = Arc::new(DoubleBuffer::new(scheme.initial_baseline(time.now())));
        let clock = PeriodClock::new(
            scheme,
            time.clone(),
            Arc::clone(&buffer),
            Arc::new(Notify::new()),
        );
        (clock, time, buffer)
    }

    #[test]
    fn same_period_is_a_no_op() {
        let (mut clock, time, buffer) = setup();
        *time.0.lock() = Utc.with_ymd_and_hms(2024, 4, 20, 23, 59, 59).unwrap();
        assert!(!clock.on_tick());
        assert_eq!(buffer.load().generation, 0);
        assert_eq!(buffer.active_index(), 0);
    }

    #[test]
    fn new_period_publishes_into_inactive_slot() {
        let (mut clock, time, buffer) = setup();
        *time.0.lock() = Utc.with_ymd_and_hms(2024, 4, 21, 0, 0, 1).unwrap();
        assert!(clock.on_tick());

        let snapshot = buffer.load();
        assert_eq!(buffer.active_index(), 1);
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.baseline.period, 240_421);
        assert_eq!(snapshot.baseline.initial_counter, 1);
        assert!(!clock.on_tick());
    }

    #[test]
    fn clock_regression_never_rotates_backwards() {
        let (mut clock, time, buffer) = setup();
        *time.0.lock() = Utc.with_ymd_and_hms(2024, 4, 21, 0, 0, 0).unwrap();
        assert!(clock.on_tick());

        *time.0.lock() = Utc.with_ymd_and_hms(2024, 4, 20, 23, 59, 58).unwrap();
        assert!(!clock.on_tick());
        assert_eq!(buffer.load().baseline.period, 240_421);

        *time.0.lock() = Utc.with_ymd_and_hms(2024, 4, 22, 0, 0, 0).unwrap();
        assert!(clock.on_tick());
        assert_eq!(buffer.load().generation, 2);
        assert_eq!(buffer.active_index(), 0);
    }
}
