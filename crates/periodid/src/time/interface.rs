use chrono::{DateTime, Utc};
use core::time::Duration;

/// Default Snowflake epoch: Monday, April 20, 2020 00:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_secs(1_587_340_800);

/// Unix epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_EPOCH: Duration = Duration::from_secs(0);

/// A source of wall-clock time for the period clock.
///
/// Generators only sample time through this trait, which lets tests drive
/// period rollovers with a manual clock.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, TimeZone, Utc};
/// use periodid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now(&self) -> DateTime<Utc> {
///         Utc.with_ymd_and_hms(2024, 4, 20, 0, 0, 0).unwrap()
///     }
/// }
///
/// assert_eq!(FixedTime.now().timestamp(), 1_713_571_200);
/// ```
pub trait TimeSource: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
