//! Hosted (`std`) implementations of the platform primitives.
//!
//! A hosted process has no interrupts to mask, so [`HostMask`] emulates a
//! uniprocessor: one process-wide "interrupts disabled" flag that a thread
//! must own to enter a critical section. Sections nest per thread, exactly
//! like saving PRIMASK inside an already-masked region.

use crate::{InterruptMask, Platform, RawMutex};
use parking_lot::lock_api::RawMutex as _;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while some thread is inside a host critical section.
static MASKED: AtomicBool = AtomicBool::new(false);

thread_local! {
    /// Critical-section nesting depth of the current thread.
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Emulated interrupt mask for hosted targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMask;

impl HostMask {
    /// Returns `true` if the calling thread is inside a critical section.
    pub fn is_masked() -> bool {
        DEPTH.with(Cell::get) > 0
    }
}

impl InterruptMask for HostMask {
    /// `true` if this call took the mask (outermost section).
    type State = bool;

    fn save_and_disable() -> bool {
        let depth = DEPTH.with(Cell::get);
        if depth > 0 {
            DEPTH.with(|d| d.set(depth + 1));
            return false;
        }

        loop {
            if MASKED
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
            while MASKED.load(Ordering::Relaxed) {
                std::hint::spin_loop();
            }
        }
        DEPTH.with(|d| d.set(1));
        true
    }

    unsafe fn restore(outermost: bool) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
        if outermost {
            MASKED.store(false, Ordering::Release);
        }
    }
}

/// Blocking mutex backed by `parking_lot`'s raw mutex.
pub struct HostMutex {
    raw: parking_lot::RawMutex,
}

impl HostMutex {
    /// Returns `true` if some thread currently holds the mutex.
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl RawMutex for HostMutex {
    fn create() -> Option<Self> {
        Some(Self {
            raw: parking_lot::RawMutex::INIT,
        })
    }

    fn lock(&self) {
        self.raw.lock();
    }

    unsafe fn unlock(&self) {
        // SAFETY: forwarded caller contract: the mutex is held by this thread.
        unsafe { self.raw.unlock() }
    }
}

/// [`Platform`] for hosted targets: emulated mask, `parking_lot` mutex.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    type Mask = HostMask;
    type Mutex = HostMutex;
}
