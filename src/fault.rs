//! Fault containment: the one place that decides between halting and
//! resetting.

use core::fmt;
use core::sync::atomic::{compiler_fence, Ordering};

use crate::config::FaultPolicy;
use crate::error::Fault;

/// What the board provides to the fault hooks.
pub trait Platform: Sync {
    /// Write one line of text to the diagnostic sink. The sink adds the line
    /// terminator.
    fn write_line(&self, line: fmt::Arguments<'_>);

    /// Restart the chip. Never returns.
    fn system_reset(&self) -> !;

    /// Stop making progress, leaving state intact for a debugger.
    fn halt(&self) -> ! {
        loop {
            compiler_fence(Ordering::SeqCst);
        }
    }
}

/// Applies a [`FaultPolicy`] to fatal faults.
pub struct FaultHandler<P> {
    policy: FaultPolicy,
    platform: P,
}

impl<P: Platform> FaultHandler<P> {
    pub const fn new(policy: FaultPolicy, platform: P) -> Self {
        FaultHandler { policy, platform }
    }

    pub fn policy(&self) -> FaultPolicy {
        self.policy
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Terminal handling of a kernel fault.
    pub fn handle(&self, fault: Fault<'_>) -> ! {
        self.terminate(format_args!("{}", fault))
    }

    /// Terminal handling of any fatal condition, kernel fault or not.
    ///
    /// `Diagnostic` prints `message` and halts; `Production` resets without
    /// printing.
    pub fn terminate(&self, message: fmt::Arguments<'_>) -> ! {
        match self.policy {
            FaultPolicy::Diagnostic => {
                self.platform.write_line(message);
                self.platform.halt()
            }
            FaultPolicy::Production => self.platform.system_reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_to_terminal, RecordingPlatform, Terminal};

    #[test]
    fn test_diagnostic_stack_overflow_prints_and_halts() {
        let handler = FaultHandler::new(FaultPolicy::Diagnostic, RecordingPlatform::new());

        let terminal = run_to_terminal(|| {
            handler.handle(Fault::StackOverflow {
                task_name: "WorkerTask",
            })
        });

        assert_eq!(terminal, Terminal::Halted);
        assert_eq!(
            handler.platform().lines(),
            vec!["STACK OVERFLOW ON TASK WorkerTask".to_string()]
        );
        assert_eq!(handler.platform().resets(), 0);
    }

    #[test]
    fn test_task_name_appears_exactly_once() {
        let handler = FaultHandler::new(FaultPolicy::Diagnostic, RecordingPlatform::new());

        run_to_terminal(|| {
            handler.handle(Fault::StackOverflow {
                task_name: "sensor_poll",
            })
        });

        let output = handler.platform().lines().concat();
        assert_eq!(output.matches("sensor_poll").count(), 1);
    }

    #[test]
    fn test_production_stack_overflow_resets_silently() {
        let handler = FaultHandler::new(FaultPolicy::Production, RecordingPlatform::new());

        let terminal = run_to_terminal(|| {
            handler.handle(Fault::StackOverflow {
                task_name: "WorkerTask",
            })
        });

        assert_eq!(terminal, Terminal::Reset);
        assert_eq!(handler.platform().resets(), 1);
        assert!(handler.platform().lines().is_empty());
    }

    #[test]
    fn test_diagnostic_allocation_failure_prints_and_halts() {
        let handler = FaultHandler::new(FaultPolicy::Diagnostic, RecordingPlatform::new());

        let terminal = run_to_terminal(|| handler.handle(Fault::AllocationFailure));

        assert_eq!(terminal, Terminal::Halted);
        assert_eq!(handler.platform().lines(), vec!["MALLOC FAIL!".to_string()]);
        assert_eq!(handler.platform().resets(), 0);
    }

    #[test]
    fn test_production_allocation_failure_resets_once() {
        let handler = FaultHandler::new(FaultPolicy::Production, RecordingPlatform::new());

        let terminal = run_to_terminal(|| handler.handle(Fault::AllocationFailure));

        assert_eq!(terminal, Terminal::Reset);
        assert_eq!(handler.platform().resets(), 1);
        assert!(handler.platform().lines().is_empty());
    }

    #[test]
    fn test_terminate_follows_policy_for_arbitrary_messages() {
        let handler = FaultHandler::new(FaultPolicy::Diagnostic, RecordingPlatform::new());
        let terminal = run_to_terminal(|| handler.terminate(format_args!("PANIC: {}", 42)));
        assert_eq!(terminal, Terminal::Halted);
        assert_eq!(handler.platform().lines(), vec!["PANIC: 42".to_string()]);

        let handler = FaultHandler::new(FaultPolicy::Production, RecordingPlatform::new());
        let terminal = run_to_terminal(|| handler.terminate(format_args!("PANIC: {}", 42)));
        assert_eq!(terminal, Terminal::Reset);
        assert!(handler.platform().lines().is_empty());
    }
}
