use crate::{Baseline, Error, Result, Scheme, generator::DoubleBuffer};
use std::sync::Arc;
use tokio::sync::{Notify, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Reply half of a single id request.
pub(crate) type Reply<ID> = oneshot::Sender<Result<ID>>;

/// The single owner of the live counter.
///
/// Requests arrive one at a time over an MPSC channel; each is answered with
/// `encode(baseline, counter)` before the counter advances. Whenever the
/// period clock has published a newer baseline, the serializer switches to
/// it and restarts the counter at the baseline's initial value.
///
/// When the counter passes the scheme's maximum, the next request stalls
/// until the clock publishes a new period. Schemes without a clock have no
/// such period to wait for and answer [`Error::Exhausted`] instead.
pub(crate) struct Serializer<S: Scheme> {
    scheme: Arc<S>,
    buffer: Arc<DoubleBuffer>,
    rollover: Arc<Notify>,
    rotates: bool,
    generation: u64,
    baseline: Baseline,
    counter: u64,
}

impl<S: Scheme> Serializer<S> {
    pub(crate) fn new(
        scheme: Arc<S>,
        buffer: Arc<DoubleBuffer>,
        rollover: Arc<Notify>,
        rotates: bool,
    ) -> Self {
        let snapshot = buffer.load();
        Self {
            scheme,
            buffer,
            rollover,
            rotates,
            generation: snapshot.generation,
            baseline: snapshot.baseline,
            counter: snapshot.baseline.initial_counter,
        }
    }

    /// Answers requests until the channel closes or `shutdown` is cancelled.
    ///
    /// Requests still queued when the loop exits are dropped with the
    /// receiver, which their callers observe as [`Error::Closed`].
    pub(crate) async fn run(
        mut self,
        mut requests: mpsc::Receiver<Reply<S::Id>>,
        shutdown: CancellationToken,
    ) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            worker_id = self.scheme.worker_id(),
            period = self.baseline.period,
            "serializer started"
        );

        loop {
            let reply = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                reply = requests.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
            };

            let Some(result) = self.next(&shutdown).await else {
                // Shut down while stalled; dropping `reply` reports it.
                break;
            };
            // The caller may have given up waiting.
            let _ = reply.send(result);
        }

        requests.close();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            worker_id = self.scheme.worker_id(),
            counter = self.counter,
            "serializer stopped"
        );
    }

    /// Produces the next id, or `None` if shutdown interrupted a stall.
    async fn next(&mut self, shutdown: &CancellationToken) -> Option<Result<S::Id>> {
        self.refresh();

        if self.counter > self.scheme.max_counter() {
            if !self.rotates {
                return Some(Err(Error::Exhausted));
            }
            self.stall(shutdown).await?;
        }

        let id = self.scheme.encode(&self.baseline, self.counter);
        self.counter += 1;
        Some(Ok(id))
    }

    /// Switches to a newer published baseline, if there is one.
    fn refresh(&mut self) -> bool {
        if self.buffer.generation() <= self.generation {
            return false;
        }
        let snapshot = self.buffer.load();
        // A reader racing two flips may see a slot that is about to go live;
        // it is complete and newer, so taking it early is fine. Older
        // snapshots are never taken.
        if snapshot.generation <= self.generation {
            return false;
        }
        self.generation = snapshot.generation;
        self.baseline = snapshot.baseline;
        self.counter = snapshot.baseline.initial_counter;
        true
    }

    /// Waits until the clock publishes a newer baseline. Returns `None` if
    /// `shutdown` fires first.
    async fn stall(&mut self, shutdown: &CancellationToken) -> Option<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            period = self.baseline.period,
            max = self.scheme.max_counter(),
            "counter exhausted; waiting for the next period"
        );

        let rollover = Arc::clone(&self.rollover);
        loop {
            let notified = rollover.notified();
            tokio::pin!(notified);
            // Register before re-checking so a flip in between is not missed.
            notified.as_mut().enable();

            if self.refresh() {
                return Some(());
            }

            tokio::select! {
                biased;
                () = shutdown.cancelled() => return None,
                () = &mut notified => {}
            }
        }
    }
}
