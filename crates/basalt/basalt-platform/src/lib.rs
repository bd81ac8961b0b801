//! Platform primitives consumed by the basalt ring buffer.
//!
//! The ring buffer never touches interrupt controllers or RTOS objects
//! directly. It asks a [`Platform`] for two opaque capabilities:
//!
//! - an [`InterruptMask`]: save-and-disable / restore of the local interrupt state
//! - a [`RawMutex`]: a blocking lock with explicit create / lock / unlock / destroy
//!
//! Both are wrapped in RAII guards ([`CriticalSection`], [`MutexGuard`]) so a
//! release is only ever paired with an acquisition that actually happened.
//!
//! With the `std` feature (default) [`HostPlatform`] provides implementations
//! usable in tests and on hosted targets. On bare-metal Cortex-M targets
//! [`CortexMMask`] masks interrupts through PRIMASK.

#![cfg_attr(not(feature = "std"), no_std)]

mod cortex_m;
#[cfg(feature = "std")]
mod host;
mod mask;
mod mutex;
mod spin;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use cortex_m::CortexMMask;
#[cfg(feature = "std")]
pub use host::{HostMask, HostMutex, HostPlatform};
pub use mask::{CriticalSection, InterruptMask};
pub use mutex::{MutexGuard, RawMutex};
pub use spin::{SpinLock, SpinLockGuard};

/// The set of exclusion primitives a target offers.
///
/// A ring buffer is generic over one `Platform`; the interrupt-masking
/// strategy uses [`Platform::Mask`] and the mutex strategy creates one
/// [`Platform::Mutex`] per buffer.
pub trait Platform {
    /// Interrupt save/restore primitive for the current core.
    type Mask: InterruptMask;
    /// Blocking mutex primitive. Must never be locked from interrupt context.
    type Mutex: RawMutex;
}
