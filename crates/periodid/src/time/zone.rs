use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use chrono_tz::Tz;
use core::fmt;

/// Environment variable consulted by [`Zone::resolve`].
pub const TZ_ENV: &str = "TZ";

/// Offset used when neither an override nor `TZ` names a usable zone.
const DEFAULT_OFFSET_SECS: i32 = 8 * 60 * 60;

/// The timezone calendar schemes stamp their ids in.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// An IANA zone such as `Asia/Shanghai`.
    Named(Tz),
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl Zone {
    /// Resolves the zone to use: a non-empty `name`, else the `TZ`
    /// environment variable. A name that does not parse yields the fixed
    /// `UTC+8` default; an unusable `name` does not fall back to `TZ`.
    pub fn resolve(name: Option<&str>) -> Self {
        Self::resolve_from(name, std::env::var(TZ_ENV).ok().as_deref())
    }

    fn resolve_from(name: Option<&str>, env: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or(env);
        name.and_then(Self::parse).unwrap_or_default()
    }

    /// Parses an IANA zone name. `UTC` is accepted as well.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        match name.parse::<Tz>() {
            Ok(tz) => Some(Self::Named(tz)),
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("ignoring unknown timezone {:?}", name);
                None
            }
        }
    }

    /// Converts `utc` into this zone's local date and time.
    pub fn local(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Named(tz) => utc.with_timezone(tz).naive_local(),
            Self::Fixed(offset) => utc.with_timezone(offset).naive_local(),
        }
    }
}

impl Default for Zone {
    fn default() -> Self {
        FixedOffset::east_opt(DEFAULT_OFFSET_SECS)
            .map_or(Self::Named(Tz::Asia__Shanghai), Self::Fixed)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tz) => write!(f, "{}", tz.name()),
            Self::Fixed(offset) => write!(f, "UTC{offset}"),
        }
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zone({self})")
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Self::Named(tz)
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Self::Fixed(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn named_override_wins() {
        let zone = Zone::resolve(Some("Europe/Paris"));
        assert_eq!(zone, Zone::Named(Tz::Europe__Paris));
        assert_eq!(zone.to_string(), "Europe/Paris");
    }

    #[test]
    fn environment_is_used_only_without_override() {
        let paris = Zone::Named(Tz::Europe__Paris);
        assert_eq!(Zone::resolve_from(None, Some("Europe/Paris")), paris);
        assert_eq!(Zone::resolve_from(Some("  "), Some("Europe/Paris")), paris);
        assert_eq!(Zone::resolve_from(Some("UTC"), Some("Europe/Paris")), Zone::Named(Tz::UTC));
        assert_eq!(Zone::resolve_from(None, Some("Not/AZone")), Zone::default());
        assert_eq!(Zone::resolve_from(None, None), Zone::default());
    }

    #[test]
    fn bad_override_skips_environment() {
        assert_eq!(
            Zone::resolve_from(Some("Not/AZone"), Some("Europe/Paris")),
            Zone::default()
        );
        assert_eq!(Zone::resolve(Some("Not/AZone")), Zone::default());
    }

    #[test]
    fn unknown_names_do_not_parse() {
        assert_eq!(Zone::parse("Not/AZone"), None);
        assert_eq!(Zone::parse("   "), None);
    }

    #[test]
    fn default_is_utc_plus_eight() {
        let zone = Zone::default();
        let utc = Utc.with_ymd_and_hms(2024, 4, 19, 20, 30, 0).unwrap();
        let local = zone.local(utc);
        assert_eq!(local.date().to_string(), "2024-04-20");
        assert_eq!(local.hour(), 4);
        assert_eq!(zone.to_string(), "UTC+08:00");
    }

    #[test]
    fn local_follows_named_zone() {
        let zone = Zone::from(Tz::UTC);
        let utc = Utc.with_ymd_and_hms(2024, 4, 19, 23, 59, 59).unwrap();
        assert_eq!(zone.local(utc), utc.naive_utc());
    }
}
