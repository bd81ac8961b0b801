//! Concurrency strategies.
//!
//! A strategy decides what exclusion wraps each ring operation. The three
//! built-ins are dispatched by a closed `match` inside
//! [`RingBuffer`](crate::RingBuffer); anything else is a [`RingOps`]
//! implementation registered under an identifier `>= CUSTOM_BASE`.
//!
//! | Strategy        | Exclusion                          | Usable from          |
//! |-----------------|------------------------------------|----------------------|
//! | `LockFree`      | none (acquire/release on indices)  | one producer + one consumer |
//! | `InterruptMask` | save-and-disable / restore         | ISRs and tasks, single core |
//! | `Mutex`         | per-buffer blocking mutex          | tasks only, never ISRs |

use crate::raw::RingCore;
use basalt_platform::{CriticalSection, InterruptMask};
use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;

/// Identifier of the strategy bound to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Single producer / single consumer, no locking.
    LockFree,
    /// Every operation runs with local interrupts masked.
    InterruptMask,
    /// Every operation runs under the buffer's own mutex.
    Mutex,
    /// A strategy registered in a [`Registry`](crate::Registry).
    Custom(u16),
}

impl Strategy {
    /// First identifier available to custom strategies.
    pub const CUSTOM_BASE: u16 = 3;

    /// Numeric identifier (`0`, `1`, `2` for the built-ins).
    pub const fn id(self) -> u16 {
        match self {
            Self::LockFree => 0,
            Self::InterruptMask => 1,
            Self::Mutex => 2,
            Self::Custom(id) => id,
        }
    }

    pub const fn from_id(id: u16) -> Self {
        match id {
            0 => Self::LockFree,
            1 => Self::InterruptMask,
            2 => Self::Mutex,
            id => Self::Custom(id),
        }
    }

    pub const fn is_builtin(self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockFree => f.write_str("lockfree"),
            Self::InterruptMask => f.write_str("irq"),
            Self::Mutex => f.write_str("mutex"),
            Self::Custom(id) => write!(f, "custom:{id}"),
        }
    }
}

/// Returned when a string names no strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy (expected lockfree, irq, mutex, custom:<id> or a numeric id)")]
pub struct ParseStrategyError;

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    /// Accepts the [`Display`](fmt::Display) names, a few aliases, and bare
    /// numeric identifiers.
    ///
    /// ```
    /// use basalt_ring::Strategy;
    /// assert_eq!("spsc".parse(), Ok(Strategy::LockFree));
    /// assert_eq!("custom:7".parse(), Ok(Strategy::Custom(7)));
    /// assert_eq!("2".parse(), Ok(Strategy::Mutex));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "lockfree" | "lock_free" | "lock-free" | "spsc" => return Ok(Self::LockFree),
            "irq" | "interrupt_mask" | "disable_irq" => return Ok(Self::InterruptMask),
            "mutex" => return Ok(Self::Mutex),
            _ => {}
        }

        if let Some(id) = s.strip_prefix("custom:") {
            let id: u16 = id.parse().map_err(|_| ParseStrategyError)?;
            return if id >= Self::CUSTOM_BASE {
                Ok(Self::Custom(id))
            } else {
                Err(ParseStrategyError)
            };
        }

        s.parse::<u16>()
            .map(Self::from_id)
            .map_err(|_| ParseStrategyError)
    }
}

/// The nine ring operations as seen by a strategy.
///
/// Every method receives the unsynchronized core; the default bodies call it
/// directly, i.e. the defaults are the lock-free strategy. A custom strategy
/// overrides what it needs to wrap, usually by establishing its exclusion and
/// delegating to [`LockFree`] or [`InterruptMasking`].
///
/// Argument checks (destroyed handle, empty batch) have already been done by
/// the caller when these run.
pub trait RingOps: Sync {
    fn write_one(&self, core: &RingCore<'_>, byte: u8) -> bool {
        core.write_one(byte)
    }

    fn read_one(&self, core: &RingCore<'_>) -> Option<u8> {
        core.read_one()
    }

    fn write_many(&self, core: &RingCore<'_>, data: &[u8]) -> usize {
        core.write_many(data)
    }

    fn read_many(&self, core: &RingCore<'_>, out: &mut [u8]) -> usize {
        core.read_many(out)
    }

    fn occupied(&self, core: &RingCore<'_>) -> u16 {
        core.occupied()
    }

    fn free_space(&self, core: &RingCore<'_>) -> u16 {
        core.free_space()
    }

    fn is_empty(&self, core: &RingCore<'_>) -> bool {
        core.is_empty()
    }

    fn is_full(&self, core: &RingCore<'_>) -> bool {
        core.is_full()
    }

    fn clear(&self, core: &RingCore<'_>) {
        core.clear()
    }
}

/// No exclusion. Sound for exactly one producer and one consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockFree;

impl RingOps for LockFree {}

/// Wraps every operation in a [`CriticalSection`] of `M`.
pub struct InterruptMasking<M>(PhantomData<fn() -> M>);

impl<M> InterruptMasking<M> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for InterruptMasking<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: InterruptMask> RingOps for InterruptMasking<M> {
    fn write_one(&self, core: &RingCore<'_>, byte: u8) -> bool {
        CriticalSection::<M>::with(|| core.write_one(byte))
    }

    fn read_one(&self, core: &RingCore<'_>) -> Option<u8> {
        CriticalSection::<M>::with(|| core.read_one())
    }

    fn write_many(&self, core: &RingCore<'_>, data: &[u8]) -> usize {
        CriticalSection::<M>::with(|| core.write_many(data))
    }

    fn read_many(&self, core: &RingCore<'_>, out: &mut [u8]) -> usize {
        CriticalSection::<M>::with(|| core.read_many(out))
    }

    fn occupied(&self, core: &RingCore<'_>) -> u16 {
        CriticalSection::<M>::with(|| core.occupied())
    }

    fn free_space(&self, core: &RingCore<'_>) -> u16 {
        CriticalSection::<M>::with(|| core.free_space())
    }

    fn is_empty(&self, core: &RingCore<'_>) -> bool {
        CriticalSection::<M>::with(|| core.is_empty())
    }

    fn is_full(&self, core: &RingCore<'_>) -> bool {
        CriticalSection::<M>::with(|| core.is_full())
    }

    fn clear(&self, core: &RingCore<'_>) {
        CriticalSection::<M>::with(|| core.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for s in [
            Strategy::LockFree,
            Strategy::InterruptMask,
            Strategy::Mutex,
            Strategy::Custom(3),
            Strategy::Custom(900),
        ] {
            assert_eq!(Strategy::from_id(s.id()), s);
        }
        assert!(Strategy::Mutex.is_builtin());
        assert!(!Strategy::Custom(3).is_builtin());
    }

    #[test]
    fn display_parses_back() {
        for s in [
            Strategy::LockFree,
            Strategy::InterruptMask,
            Strategy::Mutex,
            Strategy::Custom(12),
        ] {
            assert_eq!(s.to_string().parse::<Strategy>(), Ok(s));
        }
    }

    #[test]
    fn parse_aliases_and_rejects() {
        assert_eq!("  Lock-Free ".parse(), Ok(Strategy::LockFree));
        assert_eq!("disable_irq".parse(), Ok(Strategy::InterruptMask));
        assert_eq!("1".parse(), Ok(Strategy::InterruptMask));
        assert_eq!("40".parse(), Ok(Strategy::Custom(40)));

        assert_eq!("custom:2".parse::<Strategy>(), Err(ParseStrategyError));
        assert_eq!("custom:x".parse::<Strategy>(), Err(ParseStrategyError));
        assert_eq!("semaphore".parse::<Strategy>(), Err(ParseStrategyError));
        assert_eq!("70000".parse::<Strategy>(), Err(ParseStrategyError));
    }
}
