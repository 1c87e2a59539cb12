//! Application hooks for a FreeRTOS kernel on the RP2040.
//!
//! The kernel calls back into the application at four points: it asks for
//! the idle task's memory, reports a task stack overflow, reports a failed
//! heap allocation, and announces every tick. This crate answers those calls:
//!
//! - idle memory comes from a static control block and a 128-word stack;
//! - faults halt with a diagnostic line or reset the chip, depending on the
//!   build's [`FaultPolicy`];
//! - ticks are forwarded to a registered deadline-scheduling extension, if any.
//!
//! The C ABI symbols in [`ffi`] forward to whatever [`KernelHooks`] were
//! installed into [`HOOKS`].

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod fault;
pub mod ffi;
pub mod hooks;
pub mod idle;
pub mod tick;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod platform;

#[cfg(test)]
mod testing;

pub use config::{FaultPolicy, KernelConfig, RawKernelConfig};
pub use error::{Fault, HookError};
pub use fault::{FaultHandler, Platform};
pub use hooks::{ApplicationHooks, HookRegistry, KernelHooks, TaskHandle, HOOKS};
pub use idle::{IdleMemory, IdleTaskMemory, IDLE_STACK_SIZE, IDLE_STACK_WORDS, IDLE_TASK_MEMORY};
pub use tick::{TickEntry, TickHook, TICK_HOOK};
