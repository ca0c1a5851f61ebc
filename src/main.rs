//! Firmware for a battery-powered firefly simulator.
//!
//! # Overview
//!
//! A single LED sits dark most of the time. The MCU sleeps, wakes on any
//! interrupt, and with a 50% chance plays one "firefly" flash: a quick
//! ramp up, a short hold at full brightness, and a slower fade out. Every
//! flash is slightly different because its timing is jittered.
//!
//! # Hardware
//!
//! - **MCU**: STM32L031G6U6 (Cortex-M0+, ultra-low-power)
//! - **LED**: one LED on PA5, driven by TIM2 PWM
//! - **Tick timer**: TIM21 at [`TICK_HZ`](firefly::config::TICK_HZ)
//! - **Watchdog**: IWDG, fed on every wake-up and every tick
//!
//! # Determinism
//!
//! The RNG is seeded with the constant
//! [`RNG_SEED`](firefly::config::RNG_SEED). The sequence of flashes is
//! therefore identical after every power cycle.
//!
//! # Module Organization
//!
//! - [`power`] - Sleep primitives and independent watchdog
//! - [`tick_timer`] - TIM21 tick source and its interrupt handler
//! - [`hardware`] - Pin mappings and peripheral initialization

#![no_std]
#![no_main]

mod hardware;
mod power;
mod tick_timer;

use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    rcc::{LsConfig, mux::ClockMux},
};
use embassy_time::Timer;
use firefly::config::{BOOT_DELAY_SECS, PulseConfig, RNG_SEED};
use firefly::{PulseEngine, Scheduler};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use {defmt_rtt as _, panic_probe as _};

use hardware::Peripherals;

/// Creates a low-power clock configuration for STM32L031.
///
/// # Clock Settings
///
/// - **MSI**: 65.536 kHz in normal mode, 2.097 MHz in debug mode (for reliable debugging)
/// - **System clock**: MSI (no PLL)
/// - **Bus prescalers**: all DIV1, so timer clocks equal the MSI frequency
/// - **LSE/RTC**: off, the IWDG starts the LSI on its own
///
/// The tick timer prescaler in [`tick_timer`] assumes these frequencies.
fn create_low_power_config() -> embassy_stm32::rcc::Config {
    embassy_stm32::rcc::Config {
        #[cfg(feature = "debug-mode")]
        msi: Some(embassy_stm32::rcc::MSIRange::RANGE2M),
        #[cfg(not(feature = "debug-mode"))]
        msi: Some(embassy_stm32::rcc::MSIRange::RANGE66K),
        hsi: false,
        hse: None,
        pll: None,
        sys: embassy_stm32::rcc::Sysclk::MSI,
        ahb_pre: embassy_stm32::rcc::AHBPrescaler::DIV1,
        apb1_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        apb2_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        ls: LsConfig::off(),
        voltage_scale: embassy_stm32::rcc::VoltageScale::RANGE1,
        mux: ClockMux::default(),
    }
}

/// Main entry point for the firefly firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks for low power operation
/// 2. Initialize STM32 peripherals
/// 3. Wait for a possible debugger connection
/// 4. Bring up PWM, tick timer and watchdog
/// 5. Force the LED off
/// 6. Hand everything to the scheduler loop, which never returns
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_low_power_config();

    let p = embassy_stm32::init(config);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Firefly firmware starting...");

    // Wait after boot to allow debugger connection before the watchdog
    // starts and the core spends its time in WFI.
    #[cfg(feature = "debug-mode")]
    defmt::info!("Waiting {} seconds for debugger connection...", BOOT_DELAY_SECS);

    Timer::after_secs(BOOT_DELAY_SECS).await;

    #[cfg(feature = "debug-mode")]
    defmt::info!("Initializing peripherals...");

    let peripherals = Peripherals::new(p);

    let mut engine = PulseEngine::new(peripherals.led, PulseConfig::FIREFLY);
    let Ok(()) = engine.off();

    let mut scheduler = Scheduler::new(
        peripherals.platform,
        peripherals.ticks,
        engine,
        ChaCha8Rng::seed_from_u64(RNG_SEED),
    );

    #[cfg(feature = "debug-mode")]
    defmt::info!("Entering scheduler loop...");

    let Ok(never) = scheduler.run().await;
    match never {}
}
