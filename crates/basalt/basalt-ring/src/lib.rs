//! Fixed-capacity byte ring buffer with pluggable concurrency strategies.
//!
//! A [`RingBuffer`] borrows a caller-owned byte region and moves bytes
//! through it first-in first-out. How concurrent callers are kept apart is
//! chosen per buffer at creation:
//!
//! - [`Strategy::LockFree`]: single producer, single consumer, no locks
//! - [`Strategy::InterruptMask`]: operations run with interrupts masked
//! - [`Strategy::Mutex`]: operations run under a per-buffer blocking mutex
//! - [`Strategy::Custom`]: a [`RingOps`] implementation from a [`Registry`]
//!
//! The exclusion primitives come from a [`basalt_platform::Platform`], so the
//! same code runs on a hosted target ([`HostRingBuffer`]) and on bare metal.
//!
//! One storage slot is always left empty: a buffer over `N` bytes holds at
//! most `N - 1`.
//!
//! # Features
//!
//! - `std` (default): hosted platform, per-thread last error
//! - `stats` (default): write / read / overflow counters
//! - `errno` (default): last-error channel; without it [`last_error`] is always `None`

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod buffer;
pub mod config;
mod error;
mod raw;
pub mod registry;
mod ring;
mod stats;
mod strategy;

pub use buffer::RingBuffer;
#[cfg(feature = "std")]
pub use buffer::HostRingBuffer;
pub use error::{ErrorKind, RingError, clear_last_error, last_error, set_last_error};
pub use raw::RingCore;
pub use registry::{Registry, register};
pub use ring::{RingConfig, advance, free_space, occupied, segments};
pub use stats::RingStats;
pub use strategy::{InterruptMasking, LockFree, ParseStrategyError, RingOps, Strategy};
