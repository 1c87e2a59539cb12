//! C ABI entry points the kernel links against.
//!
//! Each one forwards to [`HOOKS`]; nothing here decides policy.

#![allow(non_snake_case)]

use core::ffi::{c_char, c_void, CStr};

use crate::hooks::{TaskHandle, HOOKS};
use crate::idle::{StackType, StaticTask};

/// Name shown when the kernel passes a null or non-UTF-8 task name.
const UNKNOWN_TASK: &str = "<unknown>";

/// # Safety
///
/// `task_name` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn vApplicationStackOverflowHook(
    task: *mut c_void,
    task_name: *mut c_char,
) -> ! {
    let name = task_name_str(task_name);
    HOOKS.stack_overflow(TaskHandle::from_raw(task), name)
}

#[no_mangle]
pub extern "C" fn vApplicationMallocFailedHook() -> ! {
    HOOKS.allocation_failure()
}

#[no_mangle]
pub extern "C" fn vApplicationTickHook() {
    HOOKS.tick();
}

/// # Safety
///
/// All three out-pointers must be valid for writes. The kernel counts the
/// stack size in `StackType_t` words.
#[no_mangle]
pub unsafe extern "C" fn vApplicationGetIdleTaskMemory(
    tcb_buffer: *mut *mut StaticTask,
    stack_buffer: *mut *mut StackType,
    stack_depth: *mut u32,
) {
    let memory = HOOKS.idle_task_memory();
    *tcb_buffer = memory.tcb.as_ptr();
    *stack_buffer = memory.stack.as_ptr();
    *stack_depth = memory.stack_depth() as u32;
}

/// Borrow the kernel's task name. The kernel keeps the name inside the TCB,
/// which outlives the (never-returning) hook call.
unsafe fn task_name_str<'a>(task_name: *const c_char) -> &'a str {
    if task_name.is_null() {
        return UNKNOWN_TASK;
    }
    CStr::from_ptr(task_name).to_str().unwrap_or(UNKNOWN_TASK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idle::{Stack, IDLE_STACK_WORDS, IDLE_TASK_MEMORY};
    use core::mem::size_of;
    use core::ptr;

    #[test]
    fn test_task_name_conversion() {
        let name = b"WorkerTask\0";
        let converted = unsafe { task_name_str(name.as_ptr().cast()) };
        assert_eq!(converted, "WorkerTask");
    }

    #[test]
    fn test_null_and_invalid_task_names() {
        assert_eq!(unsafe { task_name_str(ptr::null()) }, UNKNOWN_TASK);

        let invalid = [0xffu8, 0xfe, 0];
        assert_eq!(unsafe { task_name_str(invalid.as_ptr().cast()) }, UNKNOWN_TASK);
    }

    #[test]
    fn test_idle_memory_out_pointers() {
        let mut tcb: *mut StaticTask = ptr::null_mut();
        let mut stack: *mut StackType = ptr::null_mut();
        let mut size = 0u32;

        // Nothing is installed into the global registry by the unit tests, so
        // this takes the fallback path to the global idle memory.
        unsafe { vApplicationGetIdleTaskMemory(&mut tcb, &mut stack, &mut size) };

        let expected = IDLE_TASK_MEMORY.provide();
        assert_eq!(tcb, expected.tcb.as_ptr());
        assert_eq!(stack, expected.stack.as_ptr());
    }

    #[test]
    fn test_reported_stack_depth_fits_buffer() {
        let mut tcb: *mut StaticTask = ptr::null_mut();
        let mut stack: *mut StackType = ptr::null_mut();
        let mut depth = 0u32;

        unsafe { vApplicationGetIdleTaskMemory(&mut tcb, &mut stack, &mut depth) };

        // The kernel places the top of stack `depth` words above `stack`.
        let depth = depth as usize;
        assert_eq!(depth, IDLE_STACK_WORDS);
        assert!(depth * size_of::<StackType>() <= size_of::<Stack<IDLE_STACK_WORDS>>());
    }

    #[test]
    fn test_tick_before_install_is_noop() {
        vApplicationTickHook();
        vApplicationTickHook();
    }
}
