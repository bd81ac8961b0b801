//! Compile-time limits.

/// Smallest storage region a buffer accepts: one usable slot plus the
/// slot kept empty to tell "full" from "empty".
pub const MIN_CAPACITY: usize = 2;

/// Largest storage region a buffer accepts. Indices are `u16`.
pub const MAX_CAPACITY: usize = u16::MAX as usize;

/// Number of custom strategies a [`Registry`](crate::Registry) can hold.
pub const MAX_CUSTOM_STRATEGIES: usize = 4;
