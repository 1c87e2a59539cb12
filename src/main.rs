#![no_std]
#![no_main]

use core::panic::PanicInfo;

use cortex_m_rt::{entry, exception, ExceptionFrame};
use log::LevelFilter;
use rtos_hooks::platform::{init_logger, Rp2040, Uart0};
use rtos_hooks::{
    ApplicationHooks, FaultHandler, FaultPolicy, HookError, KernelConfig, KernelHooks,
    RawKernelConfig, HOOKS, IDLE_TASK_MEMORY, TICK_HOOK,
};

/// Must match `configCPU_CLOCK_HZ`; clk_peri runs from clk_sys.
const CLK_PERI_HZ: u32 = 125_000_000;
const BAUD: u32 = 115_200;

static APP_HOOKS: ApplicationHooks<Rp2040> = ApplicationHooks::with_parts(
    FaultHandler::new(FaultPolicy::from_build(), Rp2040),
    &IDLE_TASK_MEMORY,
    &TICK_HOOK,
);

extern "C" {
    /// Built from `csrc/kernel_config.c` against the kernel headers.
    static xHookKernelConfig: RawKernelConfig;
    fn vTaskStartScheduler();
    fn xPortSysTickHandler();
    #[cfg(feature = "edf")]
    fn edf_tick_FromISR();
}

#[cfg(feature = "edf")]
fn edf_tick() {
    unsafe { edf_tick_FromISR() }
}

#[entry]
fn main() -> ! {
    Uart0::init(CLK_PERI_HZ, BAUD);
    if let Err(err) = setup() {
        APP_HOOKS
            .faults()
            .terminate(format_args!("SETUP FAILED: {}", err))
    }

    unsafe { vTaskStartScheduler() };

    // The scheduler only returns if it could not create the idle or timer task.
    APP_HOOKS.on_allocation_failure()
}

fn setup() -> Result<(), HookError> {
    init_logger(LevelFilter::Info)?;
    KernelConfig::from(unsafe { xHookKernelConfig }).validate()?;
    HOOKS.install(&APP_HOOKS)?;

    #[cfg(feature = "edf")]
    TICK_HOOK.register(edf_tick);

    log::info!(
        "starting scheduler, {:?} fault policy",
        APP_HOOKS.faults().policy()
    );
    Ok(())
}

// SVCall and PendSV go straight to the kernel port in memory.x; SysTick is a
// plain function in the port and can be called from here.
#[exception]
fn SysTick() {
    unsafe { xPortSysTickHandler() }
}

#[exception]
unsafe fn HardFault(ef: &ExceptionFrame) -> ! {
    APP_HOOKS
        .faults()
        .terminate(format_args!("HARD FAULT AT PC {:#010x}", ef.pc()))
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    APP_HOOKS.faults().terminate(format_args!("PANIC: {}", info))
}
