//! PRIMASK-based interrupt mask for bare-metal Cortex-M (ARMv6-M / ARMv7-M / ARMv8-M).

#[cfg(all(target_arch = "arm", target_os = "none"))]
use crate::InterruptMask;

/// Masks all configurable-priority interrupts via PRIMASK.
///
/// Single-core only: masking interrupts on one core does not stop another
/// core from touching the same buffer.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct CortexMMask;

#[cfg(all(target_arch = "arm", target_os = "none"))]
impl InterruptMask for CortexMMask {
    type State = u32;

    #[inline]
    fn save_and_disable() -> u32 {
        let primask: u32;
        // SAFETY: reading PRIMASK and setting it is permitted in privileged
        // thread and handler mode. No `nomem`: the asm must act as a compiler
        // barrier so buffer accesses stay inside the section.
        unsafe {
            core::arch::asm!(
                "mrs {}, PRIMASK",
                "cpsid i",
                out(reg) primask,
                options(nostack, preserves_flags),
            );
        }
        primask
    }

    #[inline]
    unsafe fn restore(primask: u32) {
        // SAFETY: writes back a value previously read from PRIMASK.
        unsafe {
            core::arch::asm!(
                "msr PRIMASK, {}",
                in(reg) primask,
                options(nostack, preserves_flags),
            );
        }
    }
}
