//! Host-side stand-ins for the board, used by the unit tests.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::fault::Platform;

/// How a terminal operation ended. Carried as the unwind payload so a test
/// can observe a `-> !` call without the process actually stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Halted,
    Reset,
}

/// Records sink output and reset requests.
pub struct RecordingPlatform {
    lines: Mutex<Vec<String>>,
    resets: AtomicUsize,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        RecordingPlatform {
            lines: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl Platform for RecordingPlatform {
    fn write_line(&self, line: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn system_reset(&self) -> ! {
        self.resets.fetch_add(1, Ordering::SeqCst);
        panic::panic_any(Terminal::Reset)
    }

    fn halt(&self) -> ! {
        panic::panic_any(Terminal::Halted)
    }
}

/// Run a diverging call and report how it terminated.
pub fn run_to_terminal<F, R>(f: F) -> Terminal
where
    F: FnOnce() -> R,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => panic!("terminal operation returned to its caller"),
        Err(payload) => match payload.downcast_ref::<Terminal>() {
            Some(terminal) => *terminal,
            None => panic::resume_unwind(payload),
        },
    }
}
