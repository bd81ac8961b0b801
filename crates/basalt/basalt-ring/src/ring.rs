//! Ring buffer configuration and index arithmetic.
//!
//! Everything here is pure arithmetic on `(write, read, capacity)` triples:
//! - capacity validation
//! - occupied / free slot counts
//! - index advancement modulo capacity
//! - splitting a transfer into the tail segment and the wrapped head segment
//!
//! One slot is always left unused, so `write == read` means "empty" and
//! `(write + 1) % capacity == read` means "full".

use crate::config::{MAX_CAPACITY, MIN_CAPACITY};
use crate::error::RingError;

/// Validated ring capacity.
///
/// The capacity is the number of storage slots; the buffer can hold at most
/// `capacity - 1` bytes at once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RingConfig {
    capacity: u16,
}

impl RingConfig {
    /// Validates `capacity` against `MIN_CAPACITY..=MAX_CAPACITY`.
    ///
    /// # Example
    /// ```
    /// use basalt_ring::RingConfig;
    /// let cfg = RingConfig::new(8).unwrap();
    /// assert_eq!(cfg.usable(), 7);
    /// assert!(RingConfig::new(1).is_err());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(RingError::InvalidSize);
        }
        Ok(Self {
            capacity: capacity as u16,
        })
    }

    /// Total slot count.
    #[inline(always)]
    pub const fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Maximum number of bytes the ring can hold (`capacity - 1`).
    #[inline(always)]
    pub const fn usable(&self) -> u16 {
        self.capacity - 1
    }
}

/// Number of occupied slots.
///
/// Computed as `(write - read + capacity) mod capacity` in unsigned
/// arithmetic, widened to `u32` so the intermediate sum cannot overflow.
///
/// ```text
/// capacity = 8
/// write = 5, read = 2  →  (5 - 2 + 8) % 8 = 3
/// write = 1, read = 6  →  (1 - 6 + 8) % 8 = 3   (writer wrapped)
/// write = 4, read = 4  →  0                       (empty)
/// ```
#[inline(always)]
pub const fn occupied(write: u16, read: u16, capacity: u16) -> u16 {
    let cap = capacity as u32;
    ((write as u32 + cap - read as u32) % cap) as u16
}

/// Number of free slots: `capacity - 1 - occupied`.
#[inline(always)]
pub const fn free_space(write: u16, read: u16, capacity: u16) -> u16 {
    capacity - 1 - occupied(write, read, capacity)
}

/// Moves `index` forward by `n` slots, wrapping at `capacity`.
#[inline(always)]
pub const fn advance(index: u16, n: usize, capacity: u16) -> u16 {
    ((index as usize + n) % capacity as usize) as u16
}

/// Splits a transfer of `len` slots starting at `start` into the part that
/// fits before the end of storage and the part that wraps to slot 0.
///
/// ```text
/// capacity = 8, start = 6, len = 5
///
///   slot: 0 1 2 3 4 5 6 7
///         ^^^^^       ^^^
///         second      first
///
/// → (2, 3)
/// ```
#[inline(always)]
pub const fn segments(start: u16, len: usize, capacity: u16) -> (usize, usize) {
    let tail = capacity as usize - start as usize;
    if len <= tail { (len, 0) } else { (tail, len - tail) }
}
