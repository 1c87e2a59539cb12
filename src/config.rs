//! Build-time configuration: the fault policy and the kernel switches the
//! hooks depend on.

use crate::error::{HookError, Result};
use crate::idle::STATIC_TASK_SIZE;

/// What a fatal fault does to the running image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Print the fault on the diagnostic sink, then spin forever so a
    /// debugger can inspect the wreckage.
    Diagnostic,
    /// Reset the chip without printing anything.
    Production,
}

impl FaultPolicy {
    /// The policy selected by the build: the `diagnostic` feature or a debug
    /// build halts for inspection, anything else resets.
    pub const fn from_build() -> Self {
        if cfg!(any(feature = "diagnostic", debug_assertions)) {
            FaultPolicy::Diagnostic
        } else {
            FaultPolicy::Production
        }
    }
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self::from_build()
    }
}

/// The `FreeRTOSConfig.h` switches that decide whether the kernel will ever
/// call our hooks, plus the size of the kernel's `StaticTask_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// `configCHECK_FOR_STACK_OVERFLOW`: 0 disables checking, 1 and 2 select
    /// the detection method.
    pub check_for_stack_overflow: u8,
    /// `configUSE_MALLOC_FAILED_HOOK`
    pub use_malloc_failed_hook: bool,
    /// `configSUPPORT_STATIC_ALLOCATION`
    pub support_static_allocation: bool,
    /// `configUSE_TICK_HOOK`
    pub use_tick_hook: bool,
    /// `sizeof(StaticTask_t)` in the kernel build.
    pub static_task_size: usize,
}

/// `xHookKernelConfig` as exported by `csrc/kernel_config.c`, compiled
/// against the kernel's own headers.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct RawKernelConfig {
    pub check_for_stack_overflow: u32,
    pub use_malloc_failed_hook: u32,
    pub support_static_allocation: u32,
    pub use_tick_hook: u32,
    pub static_task_size: u32,
}

impl From<RawKernelConfig> for KernelConfig {
    fn from(raw: RawKernelConfig) -> Self {
        KernelConfig {
            check_for_stack_overflow: u8::try_from(raw.check_for_stack_overflow)
                .unwrap_or(u8::MAX),
            use_malloc_failed_hook: raw.use_malloc_failed_hook != 0,
            support_static_allocation: raw.support_static_allocation != 0,
            use_tick_hook: raw.use_tick_hook != 0,
            static_task_size: raw.static_task_size as usize,
        }
    }
}

impl KernelConfig {
    /// Reject kernel builds in which a hook would silently never run, or
    /// whose task control block does not fit the idle task storage.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.check_for_stack_overflow, 1 | 2) {
            return Err(HookError::StackOverflowCheckDisabled(
                self.check_for_stack_overflow,
            ));
        }
        if !self.use_malloc_failed_hook {
            return Err(HookError::MallocFailedHookDisabled);
        }
        if !self.support_static_allocation {
            return Err(HookError::StaticAllocationDisabled);
        }
        if !self.use_tick_hook {
            return Err(HookError::TickHookDisabled);
        }
        if self.static_task_size > STATIC_TASK_SIZE {
            return Err(HookError::StaticTaskTooLarge {
                kernel: self.static_task_size,
                reserved: STATIC_TASK_SIZE,
            });
        }
        Ok(())
    }
}
