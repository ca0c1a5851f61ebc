//! TIM21 tick timer driving the pulse engine.
//!
//! TIM21 counts at 8.192 kHz and overflows [`TICK_HZ`] times per second.
//! Each update interrupt raises the shared [`TICK`] flag. The timer only
//! runs while a pulse is in progress so that idle sleep is not interrupted
//! every tick.
//!
//! # Timer Operation
//!
//! - Clock: APB2 timer clock (MSI, no prescaler on the bus)
//! - PSC: divides the timer clock down to [`COUNTER_HZ`]
//! - ARR: `COUNTER_HZ / TICK_HZ - 1`, one update event per tick
//! - DIER.UIE: update interrupt routed to NVIC line TIM21

use embassy_stm32::pac;
use firefly::config::TICK_HZ;
use firefly::tick::{TICK, TickSource};
use pac::interrupt;

/// Timer input clock, equal to the MSI system clock.
#[cfg(feature = "debug-mode")]
const TIMER_CLOCK_HZ: u32 = 2_097_152;
#[cfg(not(feature = "debug-mode"))]
const TIMER_CLOCK_HZ: u32 = 65_536;

/// Counter rate after the prescaler.
const COUNTER_HZ: u32 = 8_192;

const PRESCALER: u16 = (TIMER_CLOCK_HZ / COUNTER_HZ - 1) as u16;
const AUTO_RELOAD: u16 = (COUNTER_HZ / TICK_HZ - 1) as u16;

/// Tick source backed by TIM21.
///
/// TIM21 is reserved for this driver; nothing else may touch it.
pub struct TickTimer {
    _private: (),
}

impl TickTimer {
    /// Configures TIM21 and unmasks its interrupt. The counter stays
    /// stopped until the first [`TickSource::reload`].
    pub fn new() -> Self {
        let tim = pac::TIM21;

        pac::RCC.apb2enr().modify(|w| w.set_tim21en(true));

        tim.cr1().modify(|w| w.set_cen(false));
        tim.psc().write_value(PRESCALER);
        tim.arr().write(|w| w.set_arr(AUTO_RELOAD));

        // Latch PSC/ARR, then drop the update flag that latching sets
        tim.egr().write(|w| w.set_ug(true));
        tim.sr().modify(|w| w.set_uif(false));
        tim.dier().modify(|w| w.set_uie(true));

        TICK.clear();

        unsafe {
            cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::TIM21);
        };

        Self { _private: () }
    }
}

impl TickSource for TickTimer {
    fn reload(&mut self) {
        let tim = pac::TIM21;

        tim.cr1().modify(|w| w.set_cen(false));
        tim.cnt().write(|w| w.set_cnt(0));
        TICK.clear();
        tim.cr1().modify(|w| w.set_cen(true));
    }

    fn halt(&mut self) {
        pac::TIM21.cr1().modify(|w| w.set_cen(false));
        TICK.clear();
    }

    async fn next_tick(&mut self) {
        TICK.wait().await;
    }
}

/// TIM21 update interrupt handler.
///
/// Acknowledges the update event and raises the tick flag. Ticks that
/// arrive before the previous one was consumed are merged into it.
#[interrupt]
fn TIM21() {
    pac::TIM21.sr().modify(|w| w.set_uif(false));
    TICK.raise();
}
