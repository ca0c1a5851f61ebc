//! Compile-time configuration for the firefly pulse.
//!
//! Nothing here is adjustable at runtime. The pulse shape lives in
//! [`PulseConfig::FIREFLY`]; the remaining constants describe timing of the
//! hardware services the firmware binary sets up.

/// Shape of a single pulse before jitter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseConfig {
    /// Number of ticks to hold the LED at `dc_max`.
    pub sustain: u16,
    /// Duty cycle increase per tick while ramping up.
    pub ramp_up: u16,
    /// Duty cycle decrease per tick while ramping down.
    pub ramp_down: u16,
    /// Duty cycle floor (LED off).
    pub dc_min: u16,
    /// Duty cycle ceiling (LED fully lit).
    pub dc_max: u16,
}

impl PulseConfig {
    /// The stock firefly flash.
    pub const FIREFLY: Self = Self {
        sustain: 18,
        ramp_up: 11,
        ramp_down: 5,
        dc_min: 0x00,
        dc_max: 0x7F,
    };

    /// Distance between the floor and the ceiling.
    pub const fn span(&self) -> u16 {
        self.dc_max - self.dc_min
    }
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self::FIREFLY
    }
}

/// Seed for the process-wide RNG.
///
/// Deliberately constant: there is no entropy source on the board, and a
/// fixed seed makes the flash pattern repeat identically after every
/// power cycle.
pub const RNG_SEED: u64 = 0;

/// Tick Source rate. One tick is one unit of pulse work.
pub const TICK_HZ: u32 = 64;

/// LED PWM carrier frequency.
pub const PWM_HZ: u32 = 500;

/// Independent watchdog timeout in microseconds.
///
/// Must comfortably exceed the longest idle sleep between wake-ups.
pub const WATCHDOG_TIMEOUT_US: u32 = 4_000_000;

/// Delay after boot before entering low power, so a probe can attach.
pub const BOOT_DELAY_SECS: u64 = 3;
