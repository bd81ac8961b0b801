//! Custom strategy registry.
//!
//! An append-only table of `(identifier, &'static dyn RingOps)` pairs with a
//! fixed number of slots. Registration is expected to happen during
//! initialization, before buffers are created from other threads; the spin
//! lock keeps the table sound if that is not the case.
//!
//! A process-wide instance backs [`register`] and
//! [`RingBuffer::create`](crate::RingBuffer::create). Tests and embedders that
//! want isolation can own a [`Registry`] and go through
//! [`Registry::create`] instead.

use crate::buffer::RingBuffer;
use crate::config::MAX_CUSTOM_STRATEGIES;
use crate::error::{RingError, clear_last_error, set_last_error};
use crate::strategy::{RingOps, Strategy};
use basalt_platform::{Platform, SpinLock};

#[derive(Clone, Copy)]
struct Entry {
    id: u16,
    ops: &'static dyn RingOps,
}

struct Table {
    entries: [Option<Entry>; MAX_CUSTOM_STRATEGIES],
    len: usize,
}

/// Fixed-capacity table of custom strategies.
pub struct Registry {
    table: SpinLock<Table>,
}

static GLOBAL: Registry = Registry::new();

/// The process-wide registry.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Registers `ops` under `id` in the process-wide registry.
pub fn register(id: u16, ops: &'static dyn RingOps) -> Result<(), RingError> {
    GLOBAL.register(id, ops)
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            table: SpinLock::new(Table {
                entries: [None; MAX_CUSTOM_STRATEGIES],
                len: 0,
            }),
        }
    }

    /// Adds a custom strategy.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`RingError::CustomTypeInvalid`] if `id < Strategy::CUSTOM_BASE`
    /// - [`RingError::RegistryFull`] if all slots are taken
    /// - [`RingError::AlreadyRegistered`] if `id` is already present
    pub fn register(&self, id: u16, ops: &'static dyn RingOps) -> Result<(), RingError> {
        let result = self.insert(id, ops);
        match result {
            Ok(()) => {
                clear_last_error();
                tracing::debug!(id, "custom strategy registered");
            }
            Err(err) => {
                set_last_error(err);
                tracing::error!(id, %err, "custom strategy registration rejected");
            }
        }
        result
    }

    fn insert(&self, id: u16, ops: &'static dyn RingOps) -> Result<(), RingError> {
        if id < Strategy::CUSTOM_BASE {
            return Err(RingError::CustomTypeInvalid);
        }

        let mut table = self.table.lock();
        if table.len == MAX_CUSTOM_STRATEGIES {
            return Err(RingError::RegistryFull);
        }
        if table.entries.iter().flatten().any(|e| e.id == id) {
            return Err(RingError::AlreadyRegistered);
        }

        let slot = table.len;
        table.entries[slot] = Some(Entry { id, ops });
        table.len += 1;
        Ok(())
    }

    /// The strategy registered under `id`, if any.
    pub fn lookup(&self, id: u16) -> Option<&'static dyn RingOps> {
        self.table
            .lock()
            .entries
            .iter()
            .flatten()
            .find(|e| e.id == id)
            .map(|e| e.ops)
    }

    pub fn len(&self) -> usize {
        self.table.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == MAX_CUSTOM_STRATEGIES
    }

    /// Creates a buffer over `storage`, resolving custom strategies in this
    /// registry rather than the global one.
    pub fn create<'a, P: Platform>(
        &self,
        storage: &'a mut [u8],
        strategy: Strategy,
    ) -> Result<RingBuffer<'a, P>, RingError> {
        RingBuffer::create_in(self, storage, strategy)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
