//! RP2040 board support for the fault hooks.

use core::fmt::{self, Write};

use cortex_m::peripheral::SCB;
use log::{LevelFilter, Log, Metadata, Record};

use crate::error::{HookError, Result};
use crate::fault::Platform;

mod uart;

pub use uart::Uart0;

/// The RP2040 as seen by the fault hooks: UART0 is the diagnostic sink,
/// AIRCR.SYSRESETREQ the reset.
pub struct Rp2040;

impl Platform for Rp2040 {
    fn write_line(&self, line: fmt::Arguments<'_>) {
        cortex_m::interrupt::free(|_| {
            let mut uart = Uart0;
            let _ = uart.write_fmt(line);
            let _ = uart.write_str("\r\n");
        });
    }

    fn system_reset(&self) -> ! {
        SCB::sys_reset()
    }

    fn halt(&self) -> ! {
        // Keep the scheduler from running anything else on top of corrupt state.
        cortex_m::interrupt::disable();
        loop {
            cortex_m::asm::nop();
        }
    }
}

/// `log` backend writing to UART0.
pub struct UartLogger;

impl Log for UartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        cortex_m::interrupt::free(|_| {
            let mut uart = Uart0;
            let _ = write!(
                uart,
                "[{} {}] {}\r\n",
                record.level(),
                record.target(),
                record.args()
            );
        });
    }

    fn flush(&self) {}
}

static LOGGER: UartLogger = UartLogger;

/// Route `log` output to UART0. UART0 must already be initialised.
pub fn init_logger(level: LevelFilter) -> Result<()> {
    // Safety: called once from `main` before interrupts or the scheduler are
    // running. thumbv6m has no compare-and-swap for `set_logger`.
    unsafe {
        log::set_logger_racy(&LOGGER).map_err(|_| HookError::LoggerAlreadySet)?;
        log::set_max_level_racy(level);
    }
    Ok(())
}
