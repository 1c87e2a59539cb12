//! Tick forwarding to an optional deadline-scheduling extension.
//!
//! The kernel calls the tick hook from the SysTick interrupt. An extension
//! (an EDF scheduler layered on top of the kernel) registers its
//! interrupt-safe tick entry point once at startup; until it does, ticks are
//! dropped.

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

/// Interrupt-safe tick entry point of a scheduling extension.
pub type TickEntry = fn();

pub struct TickHook {
    // A `TickEntry` cast to a data pointer; null when nothing is registered.
    entry: AtomicPtr<()>,
}

impl TickHook {
    pub const fn new() -> Self {
        TickHook {
            entry: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Route ticks to `entry`, replacing any previous registration.
    pub fn register(&self, entry: TickEntry) {
        self.entry.store(entry as *mut (), Ordering::Release);
        log::info!("tick extension registered");
    }

    pub fn unregister(&self) {
        self.entry.store(ptr::null_mut(), Ordering::Release);
        log::info!("tick extension unregistered");
    }

    pub fn is_registered(&self) -> bool {
        !self.entry.load(Ordering::Acquire).is_null()
    }

    /// Called on every kernel tick, in interrupt context.
    #[inline]
    pub fn on_tick(&self) {
        let entry = self.entry.load(Ordering::Acquire);
        if entry.is_null() {
            return;
        }
        // Safety: the only non-null values stored are `TickEntry` pointers.
        let entry = unsafe { core::mem::transmute::<*mut (), TickEntry>(entry) };
        entry();
    }
}

/// The tick hook used by the kernel binding.
pub static TICK_HOOK: TickHook = TickHook::new();
