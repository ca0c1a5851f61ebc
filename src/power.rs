//! Low-power sleep and watchdog primitives for the scheduler loop.
//!
//! The scheduler masks interrupts with PRIMASK before executing `WFI`. A
//! pending interrupt still wakes the core, but its handler only runs once
//! the mask is lifted, so no wake-up can slip in between the decision to
//! sleep and the sleep itself.
//!
//! # Wake Sources
//!
//! - Time driver (TIM22) overflow/half-overflow, roughly once per second
//! - TIM21 tick interrupt, only while a pulse is running
//!
//! # Watchdog
//!
//! The IWDG runs from the LSI and resets the MCU if the loop stops feeding
//! it, which is the only recovery from a tick timer that stopped firing.

use embassy_stm32::{peripherals::IWDG, wdg::IndependentWatchdog};
use firefly::scheduler::{Platform, Watchdog};

/// Cortex-M sleep primitives plus the independent watchdog.
pub struct LowPowerPlatform {
    /// Independent watchdog, already started
    watchdog: IndependentWatchdog<'static, IWDG>,
}

impl LowPowerPlatform {
    /// Starts the watchdog and takes ownership of it.
    ///
    /// Once unleashed the IWDG cannot be stopped, so this should be
    /// called after any debugger attach delay.
    pub fn new(mut watchdog: IndependentWatchdog<'static, IWDG>) -> Self {
        watchdog.unleash();
        Self { watchdog }
    }
}

impl Watchdog for LowPowerPlatform {
    fn feed(&mut self) {
        self.watchdog.pet();
    }
}

impl Platform for LowPowerPlatform {
    fn mask_interrupts(&mut self) {
        cortex_m::interrupt::disable();
    }

    fn enter_sleep(&mut self) {
        cortex_m::asm::wfi();
    }

    fn unmask_interrupts(&mut self) {
        // SAFETY: only called by the scheduler loop after `mask_interrupts`,
        // outside of any critical section.
        unsafe {
            cortex_m::interrupt::enable();
        }
    }
}
