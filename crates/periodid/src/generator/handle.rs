use crate::{
    Components, Error, LongOrderScheme, Result, Scheme, SequenceScheme, ShortOrderScheme,
    SnowflakeDayScheme, SnowflakeSecondScheme, SystemClock, TimeSource, Zone,
    generator::{DoubleBuffer, PeriodClock, Reply, Serializer},
};
use core::{fmt, time::Duration};
use std::sync::Arc;
use tokio::{
    runtime::Handle,
    sync::{Notify, mpsc},
};
use tokio_util::sync::CancellationToken;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Default bound of the request channel.
pub const DEFAULT_REQUEST_CAPACITY: usize = 1024;

/// Tunables of a running generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of requests that may queue for the serializer before callers
    /// wait for room.
    pub request_capacity: usize,
    /// Overrides the scheme's clock tick. Ignored for schemes whose
    /// baseline never rotates.
    pub tick: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            request_capacity: DEFAULT_REQUEST_CAPACITY,
            tick: None,
        }
    }
}

struct Inner<S: Scheme> {
    requests: mpsc::Sender<Reply<S::Id>>,
    shutdown: CancellationToken,
    scheme: Arc<S>,
}

impl<S: Scheme> Drop for Inner<S> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A running identifier generator.
///
/// Spawning a generator starts two tokio tasks: a period clock (omitted for
/// schemes that never rotate) and a serializer that owns the counter. The
/// handle is cheap to clone; every clone talks to the same serializer, so
/// any number of concurrent callers receive distinct, non-decreasing ids.
///
/// Dropping the last handle shuts the tasks down, as does
/// [`Generator::shutdown`].
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> periodid::Result<()> {
/// use periodid::{PeriodId, SequenceGenerator};
///
/// let generator = SequenceGenerator::new(1, 0)?;
/// let first = generator.next_id().await?;
/// let second = generator.next_id().await?;
/// assert_eq!(first.components().worker_id, 1);
/// assert_eq!(first.components().sequence, 0);
/// assert_eq!(second.components().sequence, 1);
///
/// generator.shutdown();
/// assert!(generator.next_id().await.is_err());
/// # Ok(())
/// # }
/// ```
pub struct Generator<S: Scheme> {
    inner: Arc<Inner<S>>,
}

/// Generator of [`SequenceId`](crate::SequenceId)s.
pub type SequenceGenerator = Generator<SequenceScheme>;
/// Generator of [`ShortOrderId`](crate::ShortOrderId)s.
pub type ShortOrderGenerator = Generator<ShortOrderScheme>;
/// Generator of [`LongOrderId`](crate::LongOrderId)s.
pub type LongOrderGenerator = Generator<LongOrderScheme>;
/// Generator of [`SnowflakeSecondId`](crate::SnowflakeSecondId)s.
pub type SnowflakeGenerator = Generator<SnowflakeSecondScheme>;
/// Generator of [`SnowflakeDayId`](crate::SnowflakeDayId)s.
pub type SnowflakeDayGenerator = Generator<SnowflakeDayScheme>;

impl<S: Scheme> Generator<S> {
    /// Starts a generator for `scheme` on the current tokio runtime, reading
    /// the system clock.
    ///
    /// # Errors
    ///
    /// See [`Generator::spawn_with`].
    pub fn spawn(scheme: S) -> Result<Self> {
        Self::spawn_with(scheme, SystemClock, GeneratorConfig::default())
    }

    /// Starts a generator for `scheme` on the current tokio runtime.
    ///
    /// The initial baseline is computed from `time` before this returns, so
    /// the first request never waits for a tick.
    ///
    /// # Errors
    ///
    /// - [`Error::NoRuntime`] if called outside a tokio runtime.
    /// - Any error from [`Scheme::validate`], e.g. an epoch in the future.
    pub fn spawn_with<T: TimeSource>(scheme: S, time: T, config: GeneratorConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let now = time.now();
        scheme.validate(now)?;

        let scheme = Arc::new(scheme);
        let buffer = Arc::new(DoubleBuffer::new(scheme.initial_baseline(now)));
        let rollover = Arc::new(Notify::new());
        let shutdown = CancellationToken::new();

        let tick = scheme.tick().map(|tick| config.tick.unwrap_or(tick));
        if let Some(tick) = tick {
            let clock = PeriodClock::new(
                Arc::clone(&scheme),
                time,
                Arc::clone(&buffer),
                Arc::clone(&rollover),
            );
            runtime.spawn(clock.run(tick, shutdown.clone()));
        }

        let (requests, receiver) = mpsc::channel(config.request_capacity.max(1));
        let serializer = Serializer::new(Arc::clone(&scheme), buffer, rollover, tick.is_some());
        runtime.spawn(serializer.run(receiver, shutdown.clone()));

        #[cfg(feature = "tracing")]
        tracing::info!(
            worker_id = scheme.worker_id(),
            ?tick,
            capacity = config.request_capacity,
            "generator started"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                requests,
                shutdown,
                scheme,
            }),
        })
    }

    /// Returns the next identifier.
    ///
    /// Waits while the current period's counter is exhausted. There is no
    /// built-in timeout; wrap the call in one if bounded latency matters.
    ///
    /// # Errors
    ///
    /// - [`Error::Closed`] if the generator was shut down before or while
    ///   the request was served.
    /// - [`Error::Exhausted`] if a non-rotating scheme ran out of sequence
    ///   space.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub async fn next_id(&self) -> Result<S::Id> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        let (reply, response) = tokio::sync::oneshot::channel();
        self.inner
            .requests
            .send(reply)
            .await
            .map_err(|_| Error::Closed)?;
        response.await.map_err(|_| Error::Closed)?
    }

    /// Blocking counterpart of [`Generator::next_id`] for synchronous
    /// callers.
    ///
    /// # Errors
    ///
    /// Same as [`Generator::next_id`].
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context, like
    /// every blocking tokio channel operation.
    pub fn blocking_next_id(&self) -> Result<S::Id> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        let (reply, response) = tokio::sync::oneshot::channel();
        self.inner
            .requests
            .blocking_send(reply)
            .map_err(|_| Error::Closed)?;
        response.blocking_recv().map_err(|_| Error::Closed)?
    }

    /// Stops the background tasks. Pending and future requests fail with
    /// [`Error::Closed`]. Calling this more than once has no further effect.
    pub fn shutdown(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        self.inner.shutdown.cancel();

        #[cfg(feature = "tracing")]
        tracing::info!(worker_id = self.inner.scheme.worker_id(), "generator shut down");
    }

    /// Returns `true` once [`Generator::shutdown`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// The scheme this generator mints ids with.
    pub fn scheme(&self) -> &S {
        &self.inner.scheme
    }

    /// Splits an id of this generator's layout into its components.
    pub fn decompose(&self, id: S::Id) -> Components {
        self.inner.scheme.decompose(id)
    }
}

impl SequenceGenerator {
    /// Starts a sequence generator whose first id has sequence `start`.
    ///
    /// # Errors
    ///
    /// Fails if `worker_id > 1023`, `start` is not below the maximum
    /// sequence, or no tokio runtime is running.
    pub fn new(worker_id: u16, start: u64) -> Result<Self> {
        Self::spawn(SequenceScheme::new(worker_id, start)?)
    }
}

impl ShortOrderGenerator {
    /// Starts a `YYMMDD` order id generator stamping dates in `zone`.
    ///
    /// # Errors
    ///
    /// Fails if `worker_id > 99` or no tokio runtime is running.
    pub fn new(worker_id: u16, zone: Zone) -> Result<Self> {
        Self::spawn(ShortOrderScheme::new(worker_id, zone)?)
    }
}

impl LongOrderGenerator {
    /// Starts a `YYMMDDhhmm` order id generator stamping dates in `zone`.
    ///
    /// # Errors
    ///
    /// Fails if `worker_id > 99` or no tokio runtime is running.
    pub fn new(worker_id: u16, zone: Zone) -> Result<Self> {
        Self::spawn(LongOrderScheme::new(worker_id, zone)?)
    }
}

impl SnowflakeGenerator {
    /// Starts a 64-bit, per-second Snowflake generator counting from
    /// `epoch` (a [`Duration`] since the Unix epoch).
    ///
    /// # Errors
    ///
    /// Fails if `worker_id > 1023`, the epoch is in the future or too old
    /// for the layout, or no tokio runtime is running.
    pub fn new(worker_id: u16, epoch: Duration) -> Result<Self> {
        Self::spawn(SnowflakeSecondScheme::new(worker_id, epoch)?)
    }
}

impl SnowflakeDayGenerator {
    /// Starts a 32-bit, per-day Snowflake generator counting from `epoch`
    /// (a [`Duration`] since the Unix epoch).
    ///
    /// # Errors
    ///
    /// Fails if `worker_id > 3`, the epoch is in the future or too old for
    /// the layout, or no tokio runtime is running.
    pub fn new(worker_id: u16, epoch: Duration) -> Result<Self> {
        Self::spawn(SnowflakeDayScheme::new(worker_id, epoch)?)
    }
}

impl<S: Scheme> Clone for Generator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Scheme + fmt::Debug> fmt::Debug for Generator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("scheme", &self.inner.scheme)
            .field("closed", &self.is_closed())
            .finish()
    }
}
