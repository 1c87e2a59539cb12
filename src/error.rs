use thiserror::Error;

/// A fatal condition reported by the kernel.
///
/// Neither kind is recoverable: by the time the kernel notices, memory or
/// scheduler state may already be corrupt. The `Display` form is the exact
/// line written to the diagnostic sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault<'a> {
    #[error("STACK OVERFLOW ON TASK {task_name}")]
    StackOverflow { task_name: &'a str },

    #[error("MALLOC FAIL!")]
    AllocationFailure,
}

/// Errors raised while wiring the hooks up, before the scheduler starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("kernel hooks already installed")]
    AlreadyInstalled,

    #[error("kernel stack overflow checking is disabled (configCHECK_FOR_STACK_OVERFLOW = {0})")]
    StackOverflowCheckDisabled(u8),

    #[error("kernel malloc failed hook is disabled")]
    MallocFailedHookDisabled,

    #[error("kernel static allocation support is disabled")]
    StaticAllocationDisabled,

    #[error("kernel tick hook is disabled")]
    TickHookDisabled,

    #[error("kernel StaticTask_t is {kernel} bytes, only {reserved} reserved")]
    StaticTaskTooLarge { kernel: usize, reserved: usize },

    #[error("a logger is already set")]
    LoggerAlreadySet,
}

pub type Result<T> = core::result::Result<T, HookError>;
