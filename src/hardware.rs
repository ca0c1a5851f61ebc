//! Hardware abstraction and peripheral initialization.
//!
//! This module defines the pin mappings and peripheral initialization
//! for the firefly board.
//!
//! # Pin Assignments
//!
//! ## LED
//! - **PA5**: TIM2_CH1 - PWM output driving the LED through its resistor
//!
//! ## Timers
//! - **TIM2**: LED PWM carrier
//! - **TIM21**: Tick Source for the pulse engine
//! - **TIM22**: embassy time driver (also the idle wake-up source)
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK

use embassy_stm32::{
    gpio::OutputType,
    peripherals::TIM2,
    time::hz,
    timer::simple_pwm::{PwmPin, SimplePwm, SimplePwmChannel},
    wdg::IndependentWatchdog,
};
use firefly::config::{PWM_HZ, WATCHDOG_TIMEOUT_US};

use crate::power::LowPowerPlatform;
use crate::tick_timer::TickTimer;

/// Top-level peripheral container for the firefly.
///
/// Owns everything the scheduler loop drives.
pub struct Peripherals {
    /// PWM channel the pulse engine writes duty levels to
    pub led: SimplePwmChannel<'static, TIM2>,
    /// Tick Source (TIM21)
    pub ticks: TickTimer,
    /// Sleep and watchdog primitives
    pub platform: LowPowerPlatform,
}

impl Peripherals {
    /// Initializes all peripherals from STM32 peripheral singleton.
    ///
    /// # Initial States
    ///
    /// - PA5 (TIM2_CH1): PWM enabled at [`PWM_HZ`]
    /// - TIM21: configured, counter stopped, update interrupt unmasked
    /// - IWDG: running with [`WATCHDOG_TIMEOUT_US`] timeout
    ///
    /// # Arguments
    ///
    /// * `p` - STM32 peripheral singleton from embassy_stm32::init()
    pub fn new(p: embassy_stm32::Peripherals) -> Self {
        let pwm = SimplePwm::new(
            p.TIM2,
            Some(PwmPin::new(p.PA5, OutputType::PushPull)),
            None,
            None,
            None,
            hz(PWM_HZ),
            Default::default(),
        );

        let mut led = pwm.split().ch1;
        led.enable();

        Self {
            led,
            ticks: TickTimer::new(),
            platform: LowPowerPlatform::new(IndependentWatchdog::new(
                p.IWDG,
                WATCHDOG_TIMEOUT_US,
            )),
        }
    }
}
