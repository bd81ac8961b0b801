//! The ring buffer handle.

use crate::error::{RingError, clear_last_error, set_last_error};
use crate::raw::RingCore;
use crate::registry::{self, Registry};
use crate::ring::RingConfig;
use crate::stats::RingStats;
use crate::strategy::{RingOps, Strategy};
use basalt_platform::{CriticalSection, MutexGuard, Platform, RawMutex};

/// A byte ring buffer over caller-provided storage, bound to one strategy.
///
/// All operations take `&self`; which threads may call which operations is
/// decided by the strategy:
/// - [`Strategy::LockFree`]: one thread may call the producer side
///   (`write_*`) while one other thread calls the consumer side
///   (`read_*`, `clear`). Queries are safe anywhere but only approximate.
/// - [`Strategy::InterruptMask`] and [`Strategy::Mutex`]: any number of
///   callers; every operation is serialized.
///
/// Breaking the lock-free contract garbles data but is never undefined
/// behavior.
pub struct RingBuffer<'a, P: Platform> {
    core: RingCore<'a>,
    binding: Binding<P>,
}

/// Ring buffer on the hosted platform.
///
/// # Example
///
/// ```
/// use basalt_ring::{HostRingBuffer, Strategy};
///
/// let mut storage = [0u8; 8];
/// let rb = HostRingBuffer::create(&mut storage, Strategy::LockFree).unwrap();
///
/// assert_eq!(rb.write_many(b"hello world"), 7);
/// assert!(rb.is_full());
///
/// let mut out = [0u8; 7];
/// assert_eq!(rb.read_many(&mut out), 7);
/// assert_eq!(&out, b"hello w");
/// ```
#[cfg(feature = "std")]
pub type HostRingBuffer<'a> = RingBuffer<'a, basalt_platform::HostPlatform>;

enum Binding<P: Platform> {
    /// Destroyed: every operation fails with `NullPointer`.
    Detached,
    LockFree,
    InterruptMask,
    Mutex(P::Mutex),
    Custom {
        id: u16,
        ops: &'static dyn RingOps,
    },
}

#[cold]
fn misuse(op: &'static str, err: RingError) {
    set_last_error(err);
    tracing::error!(op, %err, "ring buffer misuse");
}

impl<'a, P: Platform> RingBuffer<'a, P> {
    /// Creates a buffer over `storage` (capacity = `storage.len()`), resolving
    /// custom strategies in the global registry.
    ///
    /// # Errors
    ///
    /// - [`RingError::InvalidSize`]: `storage.len()` outside `2..=65535`
    /// - [`RingError::InvalidType`]: custom identifier not registered
    /// - [`RingError::MutexCreateFailed`]: the platform refused a mutex
    pub fn create(storage: &'a mut [u8], strategy: Strategy) -> Result<Self, RingError> {
        Self::create_in(registry::global(), storage, strategy)
    }

    /// Like [`create`](Self::create), resolving custom strategies in `registry`.
    pub fn create_in(
        registry: &Registry,
        storage: &'a mut [u8],
        strategy: Strategy,
    ) -> Result<Self, RingError> {
        let capacity = storage.len();
        let result = Self::build(registry, storage, strategy);
        match &result {
            Ok(_) => {
                clear_last_error();
                tracing::debug!(%strategy, capacity, "ring buffer created");
            }
            Err(err) => {
                set_last_error(*err);
                tracing::error!(%strategy, capacity, %err, "ring buffer creation failed");
            }
        }
        result
    }

    fn build(
        registry: &Registry,
        storage: &'a mut [u8],
        strategy: Strategy,
    ) -> Result<Self, RingError> {
        let config = RingConfig::new(storage.len())?;

        let binding = match strategy {
            Strategy::LockFree => Binding::LockFree,
            Strategy::InterruptMask => Binding::InterruptMask,
            Strategy::Mutex => {
                let mutex = P::Mutex::create()
                    .filter(|m| m.is_valid())
                    .ok_or(RingError::MutexCreateFailed)?;
                Binding::Mutex(mutex)
            }
            Strategy::Custom(id) => Binding::Custom {
                id,
                ops: registry.lookup(id).ok_or(RingError::InvalidType)?,
            },
        };

        Ok(Self {
            core: RingCore::new(storage, config),
            binding,
        })
    }

    /// Runs one operation under the bound strategy.
    ///
    /// `builtin` is called on the core once the built-in exclusion is held;
    /// `custom` is handed the registered ops. Exactly one of them receives
    /// `arg`. Returns `None` (after recording the error) when the handle
    /// cannot run anything.
    #[inline]
    fn run<A, R>(
        &self,
        op: &'static str,
        arg: A,
        builtin: impl FnOnce(&RingCore<'a>, A) -> R,
        custom: impl FnOnce(&dyn RingOps, &RingCore<'a>, A) -> R,
    ) -> Option<R> {
        match &self.binding {
            Binding::Detached => {
                misuse(op, RingError::NullPointer);
                None
            }
            Binding::LockFree => Some(builtin(&self.core, arg)),
            Binding::InterruptMask => Some(CriticalSection::<P::Mask>::with(|| {
                builtin(&self.core, arg)
            })),
            Binding::Mutex(mutex) => {
                if !mutex.is_valid() {
                    misuse(op, RingError::MutexLockFailed);
                    return None;
                }
                let _guard = MutexGuard::acquire(mutex);
                Some(builtin(&self.core, arg))
            }
            Binding::Custom { ops, .. } => Some(custom(*ops, &self.core, arg)),
        }
    }

    /// Stores one byte. `false` if the buffer is full (not an error) or the
    /// handle was destroyed.
    pub fn write_one(&self, byte: u8) -> bool {
        self.run(
            "write_one",
            byte,
            |core, b| core.write_one(b),
            |ops, core, b| ops.write_one(core, b),
        )
        .unwrap_or(false)
    }

    /// Takes one byte. `None` if the buffer is empty or the handle was destroyed.
    pub fn read_one(&self) -> Option<u8> {
        self.run(
            "read_one",
            (),
            |core, ()| core.read_one(),
            |ops, core, ()| ops.read_one(core),
        )
        .flatten()
    }

    /// Writes as much of `data` as fits and returns how much that was.
    ///
    /// An empty `data` is a caller error: it returns 0, records
    /// [`RingError::NullPointer`], and never touches the strategy's lock.
    pub fn write_many(&self, data: &[u8]) -> usize {
        if data.is_empty() {
            misuse("write_many", RingError::NullPointer);
            return 0;
        }
        self.run(
            "write_many",
            data,
            |core, data| core.write_many(data),
            |ops, core, data| ops.write_many(core, data),
        )
        .unwrap_or(0)
    }

    /// Reads up to `out.len()` bytes and returns how many were read.
    ///
    /// An empty `out` is rejected like an empty write.
    pub fn read_many(&self, out: &mut [u8]) -> usize {
        if out.is_empty() {
            misuse("read_many", RingError::NullPointer);
            return 0;
        }
        self.run(
            "read_many",
            out,
            |core, out| core.read_many(out),
            |ops, core, out| ops.read_many(core, out),
        )
        .unwrap_or(0)
    }

    /// Bytes currently stored (0 on a destroyed handle).
    pub fn occupied(&self) -> u16 {
        self.run(
            "occupied",
            (),
            |core, ()| core.occupied(),
            |ops, core, ()| ops.occupied(core),
        )
        .unwrap_or(0)
    }

    /// Bytes that can still be written (0 on a destroyed handle).
    pub fn free_space(&self) -> u16 {
        self.run(
            "free_space",
            (),
            |core, ()| core.free_space(),
            |ops, core, ()| ops.free_space(core),
        )
        .unwrap_or(0)
    }

    /// `true` on a destroyed handle.
    pub fn is_empty(&self) -> bool {
        self.run(
            "is_empty",
            (),
            |core, ()| core.is_empty(),
            |ops, core, ()| ops.is_empty(core),
        )
        .unwrap_or(true)
    }

    pub fn is_full(&self) -> bool {
        self.run(
            "is_full",
            (),
            |core, ()| core.is_full(),
            |ops, core, ()| ops.is_full(core),
        )
        .unwrap_or(false)
    }

    /// Discards all stored bytes and resets the counters. Consumer side.
    pub fn clear(&self) {
        self.run(
            "clear",
            (),
            |core, ()| core.clear(),
            |ops, core, ()| ops.clear(core),
        );
    }

    /// The strategy this buffer was created with; `None` once destroyed.
    pub fn strategy(&self) -> Option<Strategy> {
        match self.binding {
            Binding::Detached => None,
            Binding::LockFree => Some(Strategy::LockFree),
            Binding::InterruptMask => Some(Strategy::InterruptMask),
            Binding::Mutex(_) => Some(Strategy::Mutex),
            Binding::Custom { id, .. } => Some(Strategy::Custom(id)),
        }
    }

    /// Total slot count; 0 once destroyed.
    pub fn capacity(&self) -> u16 {
        self.core.capacity()
    }

    pub fn is_attached(&self) -> bool {
        !matches!(self.binding, Binding::Detached)
    }

    /// `(write_index, read_index)`.
    pub fn indices(&self) -> (u16, u16) {
        (self.core.write_index(), self.core.read_index())
    }

    /// Counter snapshot. All zero without the `stats` feature.
    pub fn stats(&self) -> RingStats {
        self.core.stats()
    }

    /// Releases the strategy's resources (the mutex, if any) and detaches the
    /// storage. Later operations fail with [`RingError::NullPointer`].
    ///
    /// Calling it again is a no-op. Dropping the buffer does the same.
    pub fn destroy(&mut self) {
        clear_last_error();
        if !self.is_attached() {
            return;
        }
        let strategy = self.strategy();
        let capacity = self.core.capacity();

        // Dropping the old binding destroys the mutex.
        self.binding = Binding::Detached;
        self.core = RingCore::detached();

        if let Some(strategy) = strategy {
            tracing::debug!(%strategy, capacity, "ring buffer destroyed");
        }
    }
}

impl<P: Platform> Drop for RingBuffer<'_, P> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<P: Platform> core::fmt::Debug for RingBuffer<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (write, read) = self.indices();
        f.debug_struct("RingBuffer")
            .field("strategy", &self.strategy())
            .field("capacity", &self.capacity())
            .field("write_index", &write)
            .field("read_index", &read)
            .finish()
    }
}
