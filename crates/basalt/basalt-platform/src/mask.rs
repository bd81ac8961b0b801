//! Interrupt-mask capability and its scoped critical section.

use core::marker::PhantomData;

/// Saves and disables the local interrupt state, and restores it later.
///
/// `State` is an opaque token: whatever the hardware needs to put the mask
/// back exactly as it was (PRIMASK, DAIF, a nesting marker on hosts).
pub trait InterruptMask {
    /// Opaque saved interrupt state.
    type State: Copy;

    /// Records the current interrupt state and disables interrupts.
    fn save_and_disable() -> Self::State;

    /// Restores a state previously returned by [`save_and_disable`](Self::save_and_disable).
    ///
    /// # Safety
    ///
    /// `state` must come from a `save_and_disable` call on the same core /
    /// thread, and nested sections must be restored in LIFO order. Restoring a
    /// state that was never saved can re-enable interrupts inside someone
    /// else's critical section.
    unsafe fn restore(state: Self::State);
}

/// RAII critical section: interrupts are masked for the guard's lifetime.
///
/// The saved state is restored on drop, on every exit path. The guard is
/// `!Send` since interrupt state belongs to the core that saved it.
#[must_use = "interrupts are re-enabled as soon as the critical section is dropped"]
pub struct CriticalSection<M: InterruptMask> {
    state: M::State,
    _not_send: PhantomData<*const ()>,
}

impl<M: InterruptMask> CriticalSection<M> {
    /// Masks interrupts and returns the guard that will restore them.
    #[inline]
    pub fn enter() -> Self {
        Self {
            state: M::save_and_disable(),
            _not_send: PhantomData,
        }
    }

    /// Runs `f` with interrupts masked.
    #[inline]
    pub fn with<R>(f: impl FnOnce() -> R) -> R {
        let _cs = Self::enter();
        f()
    }
}

impl<M: InterruptMask> Drop for CriticalSection<M> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: `state` was produced by `save_and_disable` in `enter`, on this
        // thread (the guard is !Send), and guards drop in LIFO order.
        unsafe { M::restore(self.state) }
    }
}
