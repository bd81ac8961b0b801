//! A custom strategy: interrupt masking plus a running count of bytes
//! accepted by the buffer.

use basalt_platform::HostMask;
use basalt_ring::{InterruptMasking, RingCore, RingOps, Strategy};
use std::sync::atomic::{AtomicU64, Ordering};

pub const TAP_ID: u16 = Strategy::CUSTOM_BASE;

pub static TAP: Tap = Tap::new();

pub struct Tap {
    inner: InterruptMasking<HostMask>,
    accepted: AtomicU64,
}

impl Tap {
    pub const fn new() -> Self {
        Self {
            inner: InterruptMasking::new(),
            accepted: AtomicU64::new(0),
        }
    }

    /// Bytes the buffer has taken through this strategy so far.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }
}

impl Default for Tap {
    fn default() -> Self {
        Self::new()
    }
}

impl RingOps for Tap {
    fn write_one(&self, core: &RingCore<'_>, byte: u8) -> bool {
        let ok = self.inner.write_one(core, byte);
        self.accepted.fetch_add(u64::from(ok), Ordering::Relaxed);
        ok
    }

    fn read_one(&self, core: &RingCore<'_>) -> Option<u8> {
        self.inner.read_one(core)
    }

    fn write_many(&self, core: &RingCore<'_>, data: &[u8]) -> usize {
        let n = self.inner.write_many(core, data);
        self.accepted.fetch_add(n as u64, Ordering::Relaxed);
        n
    }

    fn read_many(&self, core: &RingCore<'_>, out: &mut [u8]) -> usize {
        self.inner.read_many(core, out)
    }

    fn occupied(&self, core: &RingCore<'_>) -> u16 {
        self.inner.occupied(core)
    }

    fn free_space(&self, core: &RingCore<'_>) -> u16 {
        self.inner.free_space(core)
    }

    fn is_empty(&self, core: &RingCore<'_>) -> bool {
        self.inner.is_empty(core)
    }

    fn is_full(&self, core: &RingCore<'_>) -> bool {
        self.inner.is_full(core)
    }

    fn clear(&self, core: &RingCore<'_>) {
        self.inner.clear(core)
    }
}
