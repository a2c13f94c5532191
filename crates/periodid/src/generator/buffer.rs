use crate::Baseline;
use parking_lot::Mutex;
use portable_atomic::{AtomicU64, AtomicUsize, Ordering};

/// A published baseline together with the order it was published in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) generation: u64,
    pub(crate) baseline: Baseline,
}

#[cfg(feature = "cache-padded")]
type Slot = crossbeam_utils::CachePadded<Mutex<Snapshot>>;
#[cfg(not(feature = "cache-padded"))]
type Slot = Mutex<Snapshot>;

fn slot(snapshot: Snapshot) -> Slot {
    #[cfg(feature = "cache-padded")]
    {
        crossbeam_utils::CachePadded::new(Mutex::new(snapshot))
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        Mutex::new(snapshot)
    }
}

/// Two baseline slots and an index selecting the live one.
///
/// The period clock is the only writer: it fills the inactive slot and only
/// then flips the index (`Release`). Readers load the index (`Acquire`) and
/// copy the slot out. Each slot sits behind its own lock, so a reader that
/// raced a flip gets either the retired or the fresh snapshot, never a torn
/// one; `generation` tells them apart.
///
/// The latest generation is also mirrored in an atomic, so a reader that
/// already holds the newest snapshot can find out without locking a slot.
pub(crate) struct DoubleBuffer {
    slots: [Slot; 2],
    active: AtomicUsize,
    generation: AtomicU64,
}

impl DoubleBuffer {
    /// Publishes `initial` into both slots with slot 0 active, so reads are
    /// valid from the start.
    pub(crate) fn new(initial: Baseline) -> Self {
        let snapshot = Snapshot {
            generation: 0,
            baseline: initial,
        };
        Self {
            slots: [slot(snapshot), slot(snapshot)],
            active: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// Index of the slot reads are currently served from.
    pub(crate) fn active_index(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Generation of the most recent publish. Once this is observed, a
    /// following [`DoubleBuffer::load`] returns that generation or a newer
    /// one.
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Copies out the live snapshot.
    pub(crate) fn load(&self) -> Snapshot {
        *self.slots[self.active_index()].lock()
    }

    /// Writes `baseline` into the inactive slot, then makes it live.
    ///
    /// Must only be called from a single writer.
    pub(crate) fn publish(&self, baseline: Baseline) -> Snapshot {
        let current = self.active.load(Ordering::Acquire);
        let inactive = 1 - current;
        let snapshot = Snapshot {
            generation: self.slots[current].lock().generation + 1,
            baseline,
        };
        *self.slots[inactive].lock() = snapshot;
        self.active.store(inactive, Ordering::Release);
        self.generation.store(snapshot.generation, Ordering::Release);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::scope;

    fn baseline(period: u64) -> Baseline {
        Baseline {
            period,
            value: period << 32,
            initial_counter: 0,
        }
    }

    #[test]
    fn starts_with_both_slots_holding_the_initial_baseline() {
        let buffer = DoubleBuffer::new(baseline(7));
        assert_eq!(buffer.active_index(), 0);
        assert_eq!(*buffer.slots[0].lock(), *buffer.slots[1].lock());
        assert_eq!(buffer.load().baseline.period, 7);
        assert_eq!(buffer.load().generation, 0);
        assert_eq!(buffer.generation(), 0);
    }

    #[test]
    fn publish_writes_inactive_slot_then_flips() {
        let buffer = DoubleBuffer::new(baseline(7));

        let first = buffer.publish(baseline(8));
        assert_eq!(first.generation, 1);
        assert_eq!(buffer.active_index(), 1);
        assert_eq!(buffer.slots[0].lock().baseline.period, 7);
        assert_eq!(buffer.load(), first);

        let second = buffer.publish(baseline(9));
        assert_eq!(second.generation, 2);
        assert_eq!(buffer.active_index(), 0);
        assert_eq!(buffer.slots[1].lock().baseline.period, 8);
        assert_eq!(buffer.load(), second);
        assert_eq!(buffer.generation(), 2);
    }

    #[test]
    fn concurrent_readers_never_observe_torn_snapshots() {
        const PUBLISHES: u64 = 50_000;
        let buffer = Arc::new(DoubleBuffer::new(baseline(0)));

        scope(|s| {
            for _ in 0..4 {
                let buffer = Arc::clone(&buffer);
                s.spawn(move || {
                    loop {
                        let seen = buffer.generation();
                        let snapshot = buffer.load();
                        assert!(snapshot.generation >= seen);
                        // Every baseline is published with period == generation.
                        assert_eq!(snapshot.baseline, baseline(snapshot.generation));
                        if snapshot.generation == PUBLISHES {
                            break;
                        }
                    }
                });
            }

            for period in 1..=PUBLISHES {
                buffer.publish(baseline(period));
            }
        });
    }
}
