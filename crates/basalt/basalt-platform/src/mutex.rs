//! Blocking mutex capability.
//!
//! Mirrors the shape of an RTOS mutex API: creation can fail (the kernel may
//! be out of control blocks), locking blocks without timeout, destruction is
//! `Drop`.

use core::marker::PhantomData;

/// An opaque blocking mutex owned by one ring buffer.
pub trait RawMutex: Sized {
    /// Creates a new unlocked mutex, or `None` if the platform is out of resources.
    fn create() -> Option<Self>;

    /// Blocks until the mutex is acquired. No timeout.
    fn lock(&self);

    /// Releases the mutex.
    ///
    /// # Safety
    ///
    /// The mutex must be held by the current thread-of-control.
    unsafe fn unlock(&self);

    /// Returns `false` if the handle no longer refers to a live mutex.
    fn is_valid(&self) -> bool {
        true
    }
}

/// RAII guard releasing a [`RawMutex`] on drop.
#[must_use = "the mutex is released as soon as the guard is dropped"]
pub struct MutexGuard<'a, M: RawMutex> {
    mutex: &'a M,
    _not_send: PhantomData<*const ()>,
}

impl<'a, M: RawMutex> MutexGuard<'a, M> {
    /// Blocks until `mutex` is held and returns the guard.
    #[inline]
    pub fn acquire(mutex: &'a M) -> Self {
        mutex.lock();
        Self {
            mutex,
            _not_send: PhantomData,
        }
    }
}

impl<M: RawMutex> Drop for MutexGuard<'_, M> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: the guard only exists after `lock` returned on this thread.
        unsafe { self.mutex.unlock() }
    }
}
