//! Advisory write / read / overflow counters.
//!
//! With the `stats` feature **off**, `Counters` is a zero-sized type and every
//! method is an `#[inline(always)]` no-op, so a buffer carries no extra state.
//!
//! Each counter is only ever bumped by one role (writes and overflows by the
//! producer, reads by the consumer), so updates are a relaxed load + store
//! rather than a read-modify-write. That keeps them usable on cores without
//! atomic RMW instructions. Nothing in the crate reads them for correctness.

/// Point-in-time copy of a buffer's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingStats {
    /// Bytes successfully written.
    pub writes: u32,
    /// Bytes successfully read.
    pub reads: u32,
    /// Writes that could not store everything they were given.
    pub overflows: u32,
}

#[cfg(feature = "stats")]
mod inner {
    use super::RingStats;
    use core::sync::atomic::{AtomicU32, Ordering};

    #[inline(always)]
    fn bump(counter: &AtomicU32, n: u32) {
        let v = counter.load(Ordering::Relaxed);
        counter.store(v.wrapping_add(n), Ordering::Relaxed);
    }

    #[derive(Debug, Default)]
    pub struct Counters {
        writes: AtomicU32,
        reads: AtomicU32,
        overflows: AtomicU32,
    }

    impl Counters {
        pub const fn new() -> Self {
            Self {
                writes: AtomicU32::new(0),
                reads: AtomicU32::new(0),
                overflows: AtomicU32::new(0),
            }
        }

        #[inline(always)]
        pub fn record_write(&self, n: usize) {
            bump(&self.writes, n as u32);
        }

        #[inline(always)]
        pub fn record_read(&self, n: usize) {
            bump(&self.reads, n as u32);
        }

        #[inline(always)]
        pub fn record_overflow(&self) {
            bump(&self.overflows, 1);
        }

        pub fn reset(&self) {
            self.writes.store(0, Ordering::Relaxed);
            self.reads.store(0, Ordering::Relaxed);
            self.overflows.store(0, Ordering::Relaxed);
        }

        pub fn snapshot(&self) -> RingStats {
            RingStats {
                writes: self.writes.load(Ordering::Relaxed),
                reads: self.reads.load(Ordering::Relaxed),
                overflows: self.overflows.load(Ordering::Relaxed),
            }
        }
    }
}

#[cfg(not(feature = "stats"))]
mod inner {
    use super::RingStats;

    #[derive(Debug, Default)]
    pub struct Counters;

    impl Counters {
        pub const fn new() -> Self {
            Self
        }

        #[inline(always)]
        pub fn record_write(&self, _n: usize) {}

        #[inline(always)]
        pub fn record_read(&self, _n: usize) {}

        #[inline(always)]
        pub fn record_overflow(&self) {}

        #[inline(always)]
        pub fn reset(&self) {}

        #[inline(always)]
        pub fn snapshot(&self) -> RingStats {
            RingStats::default()
        }
    }
}

pub(crate) use inner::Counters;
