//! Error codes and the last-error channel.
//!
//! Factory and registry calls return `Result<_, RingError>`. Per-operation
//! calls (`write_one`, `read_many`, ...) keep their plain `bool` / count
//! returns and additionally record misuse in the last-error channel, which is
//! diagnostic only: nothing in this crate reads it back.
//!
//! Full and empty are steady-state flow-control signals. They have codes so
//! callers can report them, but the crate never records them as errors.

/// Failure reported by the ring buffer. Discriminants are stable numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[repr(u8)]
pub enum RingError {
    /// Operation on a destroyed handle, or an empty request slice.
    #[error("Null pointer")]
    NullPointer = 1,
    /// Storage length outside `MIN_CAPACITY..=MAX_CAPACITY`.
    #[error("Invalid buffer size")]
    InvalidSize = 2,
    /// Strategy identifier is neither built in nor registered.
    #[error("Unsupported strategy type")]
    InvalidType = 3,
    #[error("Invalid operations interface")]
    InvalidOps = 4,

    #[error("Buffer is full")]
    BufferFull = 20,
    #[error("Buffer is empty")]
    BufferEmpty = 21,

    /// The platform could not create the mutex for a mutex-strategy buffer.
    #[error("Mutex creation failed")]
    MutexCreateFailed = 40,
    #[error("Mutex lock failed")]
    MutexLockFailed = 41,

    #[error("Custom strategy registry full")]
    RegistryFull = 60,
    #[error("Strategy already registered")]
    AlreadyRegistered = 61,
    /// Custom strategy identifier below [`Strategy::CUSTOM_BASE`](crate::Strategy::CUSTOM_BASE).
    #[error("Invalid custom type value")]
    CustomTypeInvalid = 62,
}

/// Coarse classification of a [`RingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller bug: bad handle, bad size, bad identifier.
    InvalidArgument,
    /// Identifier not built in and not registered.
    UnsupportedStrategy,
    /// Registry full or platform out of mutexes.
    ResourceExhaustion,
    /// Full / empty. Expected under producer/consumer rate mismatch.
    SteadyState,
}

impl RingError {
    /// Stable numeric code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`code`](Self::code). `0` (success) and unknown codes map to `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::NullPointer,
            2 => Self::InvalidSize,
            3 => Self::InvalidType,
            4 => Self::InvalidOps,
            20 => Self::BufferFull,
            21 => Self::BufferEmpty,
            40 => Self::MutexCreateFailed,
            41 => Self::MutexLockFailed,
            60 => Self::RegistryFull,
            61 => Self::AlreadyRegistered,
            62 => Self::CustomTypeInvalid,
            _ => return None,
        })
    }

    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::NullPointer
            | Self::InvalidSize
            | Self::InvalidOps
            | Self::AlreadyRegistered
            | Self::CustomTypeInvalid => ErrorKind::InvalidArgument,
            Self::InvalidType => ErrorKind::UnsupportedStrategy,
            Self::MutexCreateFailed | Self::MutexLockFailed | Self::RegistryFull => {
                ErrorKind::ResourceExhaustion
            }
            Self::BufferFull | Self::BufferEmpty => ErrorKind::SteadyState,
        }
    }

    /// `true` for full / empty.
    pub const fn is_steady_state(self) -> bool {
        matches!(self.kind(), ErrorKind::SteadyState)
    }
}

// Per-thread on hosted targets so concurrent callers (and parallel tests) do
// not overwrite each other; one global slot on bare metal.
#[cfg(all(feature = "errno", any(feature = "std", test)))]
mod slot {
    use std::cell::Cell;

    thread_local! {
        static LAST: Cell<u8> = const { Cell::new(0) };
    }

    pub fn store(code: u8) {
        LAST.with(|c| c.set(code));
    }

    pub fn load() -> u8 {
        LAST.with(Cell::get)
    }
}

#[cfg(all(feature = "errno", not(feature = "std"), not(test)))]
mod slot {
    use core::sync::atomic::{AtomicU8, Ordering};

    static LAST: AtomicU8 = AtomicU8::new(0);

    pub fn store(code: u8) {
        LAST.store(code, Ordering::Relaxed);
    }

    pub fn load() -> u8 {
        LAST.load(Ordering::Relaxed)
    }
}

#[cfg(not(feature = "errno"))]
mod slot {
    #[inline(always)]
    pub fn store(_code: u8) {}

    #[inline(always)]
    pub fn load() -> u8 {
        0
    }
}

/// Records `err` as the most recent failure.
#[inline]
pub fn set_last_error(err: RingError) {
    slot::store(err.code());
}

/// Most recent failure, or `None` after a success / [`clear_last_error`].
///
/// Always `None` when the `errno` feature is disabled.
#[inline]
pub fn last_error() -> Option<RingError> {
    RingError::from_code(slot::load())
}

/// Resets the last-error channel.
#[inline]
pub fn clear_last_error() {
    slot::store(0);
}
