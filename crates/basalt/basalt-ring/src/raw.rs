//! Unsynchronized ring core.
//!
//! [`RingCore`] owns the indices and borrows the storage; its methods are the
//! transfers every strategy delegates to once it has established its own
//! exclusion. Nothing in here takes a lock or masks an interrupt.
//!
//! # Memory ordering
//!
//! The producer owns `write_index`, the consumer owns `read_index`:
//! - a side loads its **own** index `Relaxed` (only it ever stores it)
//! - it loads the **other** side's index `Acquire`, pairing with that side's
//!   `Release` store, so bytes written before the other index moved are visible
//! - it publishes its own index `Release` **after** touching the bytes
//!
//! That is exactly enough for one producer and one consumer running without
//! any lock. The locking strategies add a full happens-before between every
//! pair of operations on top of it.
//!
//! Storage bytes are accessed as `AtomicU8` with `Relaxed` ordering. On every
//! target this crate supports that compiles to plain byte loads and stores,
//! and it keeps a broken single-producer/single-consumer contract from being
//! a data race: the bytes may be garbage, memory safety is unaffected.

use crate::ring::{RingConfig, advance, free_space, occupied, segments};
use crate::stats::{Counters, RingStats};
use core::sync::atomic::{AtomicU8, AtomicU16, Ordering};

/// Indices, borrowed storage and counters of one ring buffer.
pub struct RingCore<'a> {
    storage: &'a [AtomicU8],
    capacity: u16,
    /// Next slot to write. Stored only by the producer.
    write_index: AtomicU16,
    /// Next slot to read. Stored only by the consumer (and `clear`).
    read_index: AtomicU16,
    counters: Counters,
}

/// Re-views an exclusively borrowed byte slice as atomic bytes.
fn as_atomic(bytes: &mut [u8]) -> &[AtomicU8] {
    // SAFETY: `AtomicU8` has the same size, alignment and bit validity as `u8`.
    // The exclusive borrow is held for the returned lifetime, so no non-atomic
    // access can overlap the atomic ones.
    unsafe { &*(bytes as *mut [u8] as *const [AtomicU8]) }
}

#[inline(always)]
fn store_bytes(dst: &[AtomicU8], src: &[u8]) {
    for (slot, &byte) in dst.iter().zip(src) {
        slot.store(byte, Ordering::Relaxed);
    }
}

#[inline(always)]
fn load_bytes(src: &[AtomicU8], dst: &mut [u8]) {
    for (byte, slot) in dst.iter_mut().zip(src) {
        *byte = slot.load(Ordering::Relaxed);
    }
}

impl<'a> RingCore<'a> {
    pub(crate) fn new(storage: &'a mut [u8], config: RingConfig) -> Self {
        debug_assert_eq!(storage.len(), config.capacity() as usize);
        Self {
            storage: as_atomic(storage),
            capacity: config.capacity(),
            write_index: AtomicU16::new(0),
            read_index: AtomicU16::new(0),
            counters: Counters::new(),
        }
    }

    /// The zeroed state of a destroyed buffer: no storage, capacity 0.
    pub(crate) const fn detached() -> Self {
        Self {
            storage: &[],
            capacity: 0,
            write_index: AtomicU16::new(0),
            read_index: AtomicU16::new(0),
            counters: Counters::new(),
        }
    }

    /// `false` once the owning buffer has been destroyed.
    #[inline(always)]
    pub fn is_attached(&self) -> bool {
        self.capacity != 0
    }

    /// Total slot count (usable capacity is one less).
    #[inline(always)]
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    #[inline(always)]
    pub fn write_index(&self) -> u16 {
        self.write_index.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn read_index(&self) -> u16 {
        self.read_index.load(Ordering::Acquire)
    }

    /// Stores one byte. Returns `false` without touching the ring if it is full.
    ///
    /// Producer side.
    pub fn write_one(&self, byte: u8) -> bool {
        let write = self.write_index.load(Ordering::Relaxed);
        let read = self.read_index.load(Ordering::Acquire);
        let next = advance(write, 1, self.capacity);

        if next == read {
            self.counters.record_overflow();
            return false;
        }

        self.storage[write as usize].store(byte, Ordering::Relaxed);
        self.write_index.store(next, Ordering::Release);
        self.counters.record_write(1);
        true
    }

    /// Takes one byte, or `None` if the ring is empty.
    ///
    /// Consumer side.
    pub fn read_one(&self) -> Option<u8> {
        let read = self.read_index.load(Ordering::Relaxed);
        let write = self.write_index.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let byte = self.storage[read as usize].load(Ordering::Relaxed);
        self.read_index
            .store(advance(read, 1, self.capacity), Ordering::Release);
        self.counters.record_read(1);
        Some(byte)
    }

    /// Copies as much of `data` as fits and returns the number of bytes stored.
    ///
    /// A short count is a partial write, not an error: the first `n` bytes of
    /// `data` are in the ring, the rest were not taken. The copy is one
    /// segment when it fits before the end of storage, otherwise the tail of
    /// storage is filled first and the remainder goes to slot 0.
    ///
    /// Producer side.
    pub fn write_many(&self, data: &[u8]) -> usize {
        let write = self.write_index.load(Ordering::Relaxed);
        let read = self.read_index.load(Ordering::Acquire);
        let free = free_space(write, read, self.capacity) as usize;
        let to_write = data.len().min(free);

        if to_write < data.len() {
            self.counters.record_overflow();
        }
        if to_write == 0 {
            return 0;
        }

        let start = write as usize;
        let (first, second) = segments(write, to_write, self.capacity);
        store_bytes(&self.storage[start..start + first], &data[..first]);
        store_bytes(&self.storage[..second], &data[first..to_write]);

        self.write_index
            .store(advance(write, to_write, self.capacity), Ordering::Release);
        self.counters.record_write(to_write);

        if to_write < data.len() {
            tracing::trace!(
                requested = data.len(),
                written = to_write,
                free,
                "partial ring write"
            );
        }
        to_write
    }

    /// Fills `out` with as many bytes as are available and returns the count.
    ///
    /// Consumer side.
    pub fn read_many(&self, out: &mut [u8]) -> usize {
        let read = self.read_index.load(Ordering::Relaxed);
        let write = self.write_index.load(Ordering::Acquire);
        let available = occupied(write, read, self.capacity) as usize;
        let to_read = out.len().min(available);

        if to_read == 0 {
            return 0;
        }

        let start = read as usize;
        let (first, second) = segments(read, to_read, self.capacity);
        load_bytes(&self.storage[start..start + first], &mut out[..first]);
        load_bytes(&self.storage[..second], &mut out[first..to_read]);

        self.read_index
            .store(advance(read, to_read, self.capacity), Ordering::Release);
        self.counters.record_read(to_read);

        if to_read < out.len() {
            tracing::trace!(
                requested = out.len(),
                read = to_read,
                available,
                "partial ring read"
            );
        }
        to_read
    }

    /// Bytes currently stored.
    #[inline]
    pub fn occupied(&self) -> u16 {
        occupied(self.write_index(), self.read_index(), self.capacity)
    }

    /// Bytes that can still be written.
    #[inline]
    pub fn free_space(&self) -> u16 {
        free_space(self.write_index(), self.read_index(), self.capacity)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write_index() == self.read_index()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        advance(self.write_index(), 1, self.capacity) == self.read_index()
    }

    /// Drops everything stored by moving the read index onto the write index,
    /// and zeroes the counters. The bytes themselves are left in place.
    ///
    /// Consumer side.
    pub fn clear(&self) {
        let write = self.write_index.load(Ordering::Acquire);
        self.read_index.store(write, Ordering::Release);
        self.counters.reset();
        tracing::trace!(capacity = self.capacity, "ring cleared");
    }

    /// Current counter values (all zero without the `stats` feature).
    pub fn stats(&self) -> RingStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(storage: &mut [u8]) -> RingCore<'_> {
        let cfg = RingConfig::new(storage.len()).unwrap();
        RingCore::new(storage, cfg)
    }

    #[test]
    fn fresh_ring_is_empty_for_every_capacity() {
        for cap in [2usize, 3, 8, 64, 1000] {
            let mut storage = vec![0u8; cap];
            let ring = core(&mut storage);
            assert!(ring.is_empty());
            assert!(!ring.is_full());
            assert_eq!(ring.occupied(), 0);
            assert_eq!(ring.free_space() as usize, cap - 1);
        }
    }

    #[test]
    fn capacity_two_holds_exactly_one_byte() {
        let mut storage = [0u8; 2];
        let ring = core(&mut storage);
        assert!(ring.write_one(1));
        assert!(ring.is_full());
        assert!(!ring.write_one(2));
        assert_eq!(ring.read_one(), Some(1));
        assert_eq!(ring.read_one(), None);
    }

    #[test]
    fn fill_drain_refill_across_the_wrap() {
        let mut storage = [0u8; 8];
        let ring = core(&mut storage);

        for b in 0..7u8 {
            assert!(ring.write_one(b));
        }
        assert!(ring.is_full());

        for expected in 0..3u8 {
            assert_eq!(ring.read_one(), Some(expected));
        }
        assert_eq!(ring.occupied(), 4);
        assert_eq!(ring.free_space(), 3);

        assert_eq!(ring.write_many(&[100, 101, 102]), 3);
        assert!(ring.is_full());
        assert_eq!(ring.occupied(), 7);

        assert!(!ring.write_one(103));
        assert_eq!(ring.write_many(&[103]), 0);

        let mut out = [0u8; 7];
        assert_eq!(ring.read_many(&mut out), 7);
        assert_eq!(out, [3, 4, 5, 6, 100, 101, 102]);
    }

    #[test]
    fn batch_write_is_truncated_to_free_space() {
        let mut storage = [0u8; 8];
        let ring = core(&mut storage);
        let data: Vec<u8> = (0..10).collect();

        assert_eq!(ring.write_many(&data), 7);
        assert!(ring.is_full());

        let mut out = [0u8; 10];
        assert_eq!(ring.read_many(&mut out), 7);
        assert_eq!(&out[..7], &data[..7]);
        assert!(ring.is_empty());
    }

    #[test]
    fn two_segment_copies_preserve_order() {
        let mut storage = [0u8; 8];
        let ring = core(&mut storage);

        // Park both indices at 5 so the next batch crosses the end of storage.
        assert_eq!(ring.write_many(&[0; 5]), 5);
        let mut sink = [0u8; 5];
        assert_eq!(ring.read_many(&mut sink), 5);
        assert_eq!(ring.write_index(), 5);

        assert_eq!(ring.write_many(&[1, 2, 3, 4, 5, 6]), 6);
        assert_eq!(ring.write_index(), 3);

        let mut out = [0u8; 6];
        assert_eq!(ring.read_many(&mut out), 6);
        assert_eq!(out, [1, 2, 3, 4, 5, 6]);
        assert_eq!(ring.read_index(), 3);
    }

    #[test]
    fn read_many_returns_what_is_available() {
        let mut storage = [0u8; 16];
        let ring = core(&mut storage);
        assert_eq!(ring.read_many(&mut [0u8; 4]), 0);

        ring.write_many(&[9, 8]);
        let mut out = [0u8; 4];
        assert_eq!(ring.read_many(&mut out), 2);
        assert_eq!(&out[..2], &[9, 8]);
    }

    #[test]
    fn clear_keeps_indices_in_range_and_is_idempotent() {
        let mut storage = [0u8; 8];
        let ring = core(&mut storage);
        ring.clear();
        assert!(ring.is_empty());

        ring.write_many(&[1, 2, 3]);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.read_index(), 3);
        assert_eq!(ring.read_one(), None);

        ring.clear();
        assert_eq!(ring.occupied(), 0);
    }

    #[test]
    fn interleaved_single_byte_ops_keep_the_invariants() {
        let mut storage = [0u8; 13];
        let ring = core(&mut storage);
        let mut next_in = 0u8;
        let mut next_out = 0u8;
        // Small LCG so the interleaving is irregular but reproducible.
        let mut state = 0x2545_f491_u32;

        for _ in 0..10_000 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if (state >> 16) % 3 != 0 {
                if ring.write_one(next_in) {
                    next_in = next_in.wrapping_add(1);
                }
            } else if let Some(b) = ring.read_one() {
                assert_eq!(b, next_out);
                next_out = next_out.wrapping_add(1);
            }

            assert_eq!(ring.occupied() + ring.free_space(), 12);
            assert_eq!(ring.is_full(), ring.occupied() == 12);
            assert_eq!(ring.is_empty(), ring.occupied() == 0);
            assert!(ring.write_index() < 13 && ring.read_index() < 13);
        }
    }

    #[cfg(feature = "std")]
    #[test]
    fn partial_transfers_stay_below_warn() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicUsize;
        use tracing::{Event, Level, Subscriber};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        #[derive(Default)]
        struct Tally {
            loud: AtomicUsize,
            quiet: AtomicUsize,
        }

        struct Count(Arc<Tally>);

        impl<S: Subscriber> Layer<S> for Count {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                let slot = match *event.metadata().level() {
                    Level::WARN | Level::ERROR => &self.0.loud,
                    _ => &self.0.quiet,
                };
                slot.fetch_add(1, Ordering::Relaxed);
            }
        }

        let tally = Arc::new(Tally::default());
        let subscriber = tracing_subscriber::registry().with(Count(Arc::clone(&tally)));

        tracing::subscriber::with_default(subscriber, || {
            let mut storage = [0u8; 8];
            let ring = core(&mut storage);
            assert_eq!(ring.write_many(&[5; 12]), 7);
            assert_eq!(ring.write_many(&[5; 3]), 0);
            let mut out = [0u8; 12];
            assert_eq!(ring.read_many(&mut out), 7);
            ring.write_many(&[1, 2]);
            assert_eq!(ring.read_many(&mut out), 2);
        });

        assert_eq!(tally.loud.load(Ordering::Relaxed), 0);
        // The short batch write and both short reads are still reported.
        assert_eq!(tally.quiet.load(Ordering::Relaxed), 3);
    }

    #[cfg(feature = "stats")]
    #[test]
    fn overflow_on_full_counts_once_and_leaves_indices() {
        let mut storage = [0u8; 4];
        let ring = core(&mut storage);
        ring.write_many(&[1, 2, 3]);
        let before = (ring.write_index(), ring.read_index());
        let overflows = ring.stats().overflows;

        assert!(!ring.write_one(4));

        assert_eq!(ring.stats().overflows, overflows + 1);
        assert_eq!((ring.write_index(), ring.read_index()), before);
    }

    #[cfg(feature = "stats")]
    #[test]
    fn counters_track_transfers_and_reset_on_clear() {
        let mut storage = [0u8; 8];
        let ring = core(&mut storage);

        ring.write_many(&[0; 10]);
        ring.write_one(1);
        ring.read_one();
        ring.read_many(&mut [0u8; 3]);

        assert_eq!(
            ring.stats(),
            RingStats {
                writes: 7,
                reads: 4,
                overflows: 2,
            }
        );

        ring.clear();
        assert_eq!(ring.stats(), RingStats::default());
    }
}
