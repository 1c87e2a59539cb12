//! Statically allocated memory for the kernel's idle task.
//!
//! With static allocation enabled the kernel asks the application for the
//! idle task's control block and stack instead of taking them from its heap.
//! Both live in `.bss`, so they are zeroed by the startup code and never move.

use core::cell::UnsafeCell;
use core::mem::size_of;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, Ordering};

/// One stack slot, `StackType_t` on the kernel side.
pub type StackType = usize;

/// Depth of the idle task stack in words.
pub const IDLE_STACK_WORDS: usize = 128;

/// Size of the idle task stack in bytes.
pub const IDLE_STACK_SIZE: usize = IDLE_STACK_WORDS * size_of::<StackType>();

/// Bytes reserved for a task control block. Must be at least
/// `sizeof(StaticTask_t)` for the kernel build.
pub const STATIC_TASK_SIZE: usize = 128;

/// Opaque storage for a kernel task control block (`StaticTask_t`).
#[repr(C, align(8))]
pub struct StaticTask {
    _opaque: [u8; STATIC_TASK_SIZE],
}

impl StaticTask {
    pub const fn new() -> Self {
        StaticTask {
            _opaque: [0; STATIC_TASK_SIZE],
        }
    }
}

/// Data type for a properly aligned stack of SIZE words.
///
/// AAPCS wants 8-byte stack alignment at public interfaces.
#[repr(C, align(8))]
pub struct Stack<const SIZE: usize> {
    _mem: [StackType; SIZE],
}

impl<const SIZE: usize> Stack<SIZE> {
    /// Construct a stack of length SIZE, initialized to 0
    pub const fn new() -> Stack<SIZE> {
        Stack { _mem: [0; SIZE] }
    }
}

/// What the kernel receives from `vApplicationGetIdleTaskMemory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTaskMemory {
    pub tcb: NonNull<StaticTask>,
    pub stack: NonNull<StackType>,
    /// Stack size in bytes.
    pub stack_size: usize,
}

impl IdleTaskMemory {
    /// Stack size in words, the unit `xTaskCreateStatic` counts in.
    pub const fn stack_depth(&self) -> usize {
        self.stack_size / size_of::<StackType>()
    }
}

/// Control block and stack for the idle task.
///
/// Only the kernel touches the contents; this type hands out addresses and
/// never reads or writes through them.
pub struct IdleMemory<const WORDS: usize> {
    tcb: UnsafeCell<StaticTask>,
    stack: UnsafeCell<Stack<WORDS>>,
    handed_out: AtomicBool,
}

// Safety: the cells are never dereferenced here. The kernel is the single
// owner of the memory behind the pointers handed out by `provide`.
unsafe impl<const WORDS: usize> Sync for IdleMemory<WORDS> {}

impl<const WORDS: usize> IdleMemory<WORDS> {
    pub const fn new() -> Self {
        if WORDS == 0 {
            panic!("idle stack must not be empty");
        }
        IdleMemory {
            tcb: UnsafeCell::new(StaticTask::new()),
            stack: UnsafeCell::new(Stack::new()),
            handed_out: AtomicBool::new(false),
        }
    }

    /// Stack size in bytes.
    pub const fn stack_size(&self) -> usize {
        WORDS * size_of::<StackType>()
    }

    /// Hand the buffers to the kernel. Returns the same addresses and size on
    /// every call.
    ///
    /// The kernel asks once, before the scheduler starts. A repeat request
    /// means the kernel was restarted without a reset and would reuse a stack
    /// the previous run left dirty, so it is logged.
    pub fn provide(&'static self) -> IdleTaskMemory {
        // Load/store only: thumbv6m has no compare-and-swap, and no other
        // context exists yet.
        if self.handed_out.load(Ordering::Relaxed) {
            log::warn!("idle task memory requested again; reusing static buffers");
        } else {
            self.handed_out.store(true, Ordering::Relaxed);
        }

        let stack: *mut Stack<WORDS> = self.stack.get();
        let memory = IdleTaskMemory {
            // Pointers derived from a reference are never null.
            tcb: unsafe { NonNull::new_unchecked(self.tcb.get()) },
            stack: unsafe { NonNull::new_unchecked(stack.cast::<StackType>()) },
            stack_size: self.stack_size(),
        };
        log::debug!(
            "idle task memory: tcb {:p}, stack {:p} ({} bytes)",
            memory.tcb,
            memory.stack,
            memory.stack_size
        );
        memory
    }

    /// Whether `provide` has been called.
    pub fn is_handed_out(&self) -> bool {
        self.handed_out.load(Ordering::Relaxed)
    }
}

/// The idle task memory used by the kernel binding.
pub static IDLE_TASK_MEMORY: IdleMemory<IDLE_STACK_WORDS> = IdleMemory::new();
