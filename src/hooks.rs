//! The application side of the kernel's hook contract.

use core::cell::UnsafeCell;
use core::ffi::c_void;
use core::sync::atomic::{compiler_fence, AtomicBool, Ordering};

use crate::error::{Fault, HookError, Result};
use crate::fault::{FaultHandler, Platform};
use crate::idle::{IdleMemory, IdleTaskMemory, IDLE_STACK_WORDS, IDLE_TASK_MEMORY};
use crate::tick::TickHook;

/// Kernel task handle (`TaskHandle_t`). Opaque; never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct TaskHandle(*mut c_void);

impl TaskHandle {
    pub const fn from_raw(raw: *mut c_void) -> Self {
        TaskHandle(raw)
    }
}

/// Everything the kernel calls back into.
pub trait KernelHooks: Sync {
    /// A task ran past the end of its stack.
    fn on_stack_overflow(&self, task: TaskHandle, task_name: &str) -> !;

    /// The kernel heap could not satisfy an allocation.
    fn on_allocation_failure(&self) -> !;

    /// One kernel tick elapsed. Runs in interrupt context.
    fn on_tick(&self);

    /// Backing storage for the idle task.
    fn idle_task_memory(&self) -> IdleTaskMemory;
}

/// The stock hooks: faults go through a [`FaultHandler`], ticks through a
/// [`TickHook`], idle memory comes from a static [`IdleMemory`].
pub struct ApplicationHooks<P: 'static> {
    faults: FaultHandler<P>,
    idle: &'static IdleMemory<IDLE_STACK_WORDS>,
    tick: &'static TickHook,
}

impl<P: Platform> ApplicationHooks<P> {
    pub const fn with_parts(
        faults: FaultHandler<P>,
        idle: &'static IdleMemory<IDLE_STACK_WORDS>,
        tick: &'static TickHook,
    ) -> Self {
        ApplicationHooks { faults, idle, tick }
    }

    pub fn faults(&self) -> &FaultHandler<P> {
        &self.faults
    }

    pub fn tick_hook(&self) -> &'static TickHook {
        self.tick
    }
}

impl<P: Platform> KernelHooks for ApplicationHooks<P> {
    fn on_stack_overflow(&self, _task: TaskHandle, task_name: &str) -> ! {
        self.faults.handle(Fault::StackOverflow { task_name })
    }

    fn on_allocation_failure(&self) -> ! {
        self.faults.handle(Fault::AllocationFailure)
    }

    fn on_tick(&self) {
        self.tick.on_tick();
    }

    fn idle_task_memory(&self) -> IdleTaskMemory {
        self.idle.provide()
    }
}

/// Where the kernel binding finds the installed hooks.
///
/// Installed once, before the scheduler starts; read-only afterwards.
pub struct HookRegistry {
    hooks: UnsafeCell<Option<&'static dyn KernelHooks>>,
    installed: AtomicBool,
}

// Safety: `hooks` is written only by `install`, which runs before the
// scheduler starts and refuses a second call. Readers check `installed`
// first.
unsafe impl Sync for HookRegistry {}

impl HookRegistry {
    pub const fn new() -> Self {
        HookRegistry {
            hooks: UnsafeCell::new(None),
            installed: AtomicBool::new(false),
        }
    }

    /// Install `hooks`. Must be called before the scheduler starts.
    pub fn install(&self, hooks: &'static dyn KernelHooks) -> Result<()> {
        if self.installed.load(Ordering::Acquire) {
            return Err(HookError::AlreadyInstalled);
        }
        unsafe { *self.hooks.get() = Some(hooks) };
        self.installed.store(true, Ordering::Release);
        log::info!("kernel hooks installed");
        Ok(())
    }

    fn installed(&self) -> Option<&'static dyn KernelHooks> {
        if self.installed.load(Ordering::Acquire) {
            unsafe { *self.hooks.get() }
        } else {
            None
        }
    }

    pub fn stack_overflow(&self, task: TaskHandle, task_name: &str) -> ! {
        match self.installed() {
            Some(hooks) => hooks.on_stack_overflow(task, task_name),
            None => halt_uninstalled(),
        }
    }

    pub fn allocation_failure(&self) -> ! {
        match self.installed() {
            Some(hooks) => hooks.on_allocation_failure(),
            None => halt_uninstalled(),
        }
    }

    pub fn tick(&self) {
        if let Some(hooks) = self.installed() {
            hooks.on_tick();
        }
    }

    /// The idle task needs memory even if nothing was installed.
    pub fn idle_task_memory(&self) -> IdleTaskMemory {
        match self.installed() {
            Some(hooks) => hooks.idle_task_memory(),
            None => IDLE_TASK_MEMORY.provide(),
        }
    }
}

// A fault before installation has no platform to report to or reset with.
fn halt_uninstalled() -> ! {
    loop {
        compiler_fence(Ordering::SeqCst);
    }
}

/// The registry the C ABI entry points forward to.
pub static HOOKS: HookRegistry = HookRegistry::new();
