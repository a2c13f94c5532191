use anyhow::{Context, anyhow, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use core::time::Duration;
use periodid::{
    DEFAULT_EPOCH, DEFAULT_REQUEST_CAPACITY, GeneratorConfig, LongOrderScheme, Scheme,
    SequenceScheme, ShortOrderScheme, SnowflakeDayScheme, SnowflakeSecondScheme, Zone,
};

/// Identifier variants the binary can mint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SchemeKind {
    /// 64-bit worker ‖ sequence, no time component.
    Sequence,
    /// 15-digit `YYMMDD` order ids.
    ShortOrder,
    /// 18-digit `YYMMDDhhmm` order ids.
    LongOrder,
    /// 64-bit Snowflake ids with a per-second period.
    Snowflake,
    /// 32-bit Snowflake ids with a per-day period.
    SnowflakeDay,
}

/// Runtime configuration for the `periodid` binary.
///
/// Every option can also be supplied through the environment (or a `.env`
/// file), which is how a fleet of workers is usually told its worker id.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "periodid",
    version,
    about = "Mint and decode ordered, collision-free numeric IDs"
)]
pub struct CliArgs {
    /// Identifier scheme to use.
    ///
    /// Environment variable: `PERIODID_SCHEME`
    #[arg(long, global = true, env = "PERIODID_SCHEME", value_enum, default_value_t = SchemeKind::ShortOrder)]
    pub scheme: SchemeKind,

    /// Worker id stamped into every identifier. Must be unique among
    /// concurrently running generators of the same scheme.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, global = true, env = "WORKER_ID", default_value_t = 0)]
    pub worker_id: u16,

    /// IANA timezone for the order-id schemes, e.g. `Asia/Shanghai`.
    /// Falls back to `UTC+8` when unset or unknown.
    ///
    /// Environment variable: `TZ`
    #[arg(long, global = true, env = "TZ")]
    pub tz: Option<String>,

    /// Epoch of the Snowflake schemes: Unix seconds, a `YYYY-MM-DD` date
    /// (UTC midnight) or an RFC 3339 timestamp. Defaults to 2020-04-20.
    ///
    /// Environment variable: `EPOCH`
    #[arg(long, global = true, env = "EPOCH")]
    pub epoch: Option<String>,

    /// First sequence value of the sequence scheme.
    ///
    /// Environment variable: `SEQUENCE_START`
    #[arg(long, global = true, env = "SEQUENCE_START", default_value_t = 0)]
    pub start: u64,

    /// Bound of the generator's request queue.
    ///
    /// Environment variable: `REQUEST_CAPACITY`
    #[arg(long, global = true, env = "REQUEST_CAPACITY", default_value_t = DEFAULT_REQUEST_CAPACITY)]
    pub request_capacity: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate identifiers and print one JSON object per line.
    Next {
        /// Number of identifiers to generate.
        ///
        /// Environment variable: `COUNT`
        #[arg(short = 'n', long, env = "COUNT", default_value_t = 1)]
        count: u64,
    },
    /// Decode raw identifiers of the selected scheme.
    Decompose {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

/// A validated scheme, ready to be handed to a generator.
#[derive(Clone, Debug)]
pub enum SchemeConfig {
    Sequence(SequenceScheme),
    ShortOrder(ShortOrderScheme),
    LongOrder(LongOrderScheme),
    Snowflake(SnowflakeSecondScheme),
    SnowflakeDay(SnowflakeDayScheme),
}

impl SchemeConfig {
    fn validate(&self, now: DateTime<Utc>) -> periodid::Result<()> {
        match self {
            Self::Sequence(scheme) => scheme.validate(now),
            Self::ShortOrder(scheme) => scheme.validate(now),
            Self::LongOrder(scheme) => scheme.validate(now),
            Self::Snowflake(scheme) => scheme.validate(now),
            Self::SnowflakeDay(scheme) => scheme.validate(now),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub scheme: SchemeConfig,
    pub request_capacity: usize,
    pub command: Command,
}

impl CliConfig {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            request_capacity: self.request_capacity,
            ..GeneratorConfig::default()
        }
    }
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.request_capacity == 0 {
            bail!("REQUEST_CAPACITY must be greater than 0");
        }

        if let Command::Next { count: 0 } = args.command {
            bail!("COUNT must be greater than 0");
        }

        if args.start != 0 && args.scheme != SchemeKind::Sequence {
            bail!(
                "SEQUENCE_START only applies to the sequence scheme, not {:?}",
                args.scheme
            );
        }

        let epoch = match args.epoch.as_deref() {
            Some(value) => parse_epoch(value)?,
            None => DEFAULT_EPOCH,
        };
        let zone = Zone::resolve(args.tz.as_deref());

        let scheme = match args.scheme {
            SchemeKind::Sequence => {
                SchemeConfig::Sequence(SequenceScheme::new(args.worker_id, args.start)?)
            }
            SchemeKind::ShortOrder => {
                SchemeConfig::ShortOrder(ShortOrderScheme::new(args.worker_id, zone)?)
            }
            SchemeKind::LongOrder => {
                SchemeConfig::LongOrder(LongOrderScheme::new(args.worker_id, zone)?)
            }
            SchemeKind::Snowflake => {
                SchemeConfig::Snowflake(SnowflakeSecondScheme::new(args.worker_id, epoch)?)
            }
            SchemeKind::SnowflakeDay => {
                SchemeConfig::SnowflakeDay(SnowflakeDayScheme::new(args.worker_id, epoch)?)
            }
        };
        scheme
            .validate(Utc::now())
            .with_context(|| format!("invalid EPOCH for the {:?} scheme", args.scheme))?;

        Ok(Self {
            scheme,
            request_capacity: args.request_capacity,
            command: args.command,
        })
    }
}

/// Parses Unix seconds, a `YYYY-MM-DD` date or an RFC 3339 timestamp into a
/// [`Duration`] since the Unix epoch.
fn parse_epoch(value: &str) -> anyhow::Result<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let timestamp = if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp())
            .ok_or_else(|| anyhow!("EPOCH {value:?} has no midnight"))?
    } else {
        DateTime::parse_from_rfc3339(value)
            .with_context(|| {
                format!("EPOCH {value:?} is not Unix seconds, a date or an RFC 3339 timestamp")
            })?
            .timestamp()
    };

    let secs = u64::try_from(timestamp)
        .map_err(|_| anyhow!("EPOCH {value:?} lies before 1970-01-01"))?;
    Ok(Duration::from_secs(secs))
}
