//! Pulse engine: one firefly flash on a single PWM channel.
//!
//! A pulse is a three-phase state machine driven by Tick Source ticks:
//!
//! ```text
//! RampUp ──duty == dc_max──▶ Sustain ──countdown == 0──▶ RampDown ──duty == dc_min──▶ Done
//! ```
//!
//! Every tick performs exactly one unit of work in the current phase.
//! Moving between phases never consumes a tick. Ramp steps are clamped so
//! the duty cycle lands exactly on the ceiling and the floor.
//!
//! The shape of each pulse is jittered: sustain length and both ramp steps
//! are drawn once when the pulse starts and stay fixed until it ends.

use core::num::NonZeroU16;

use embedded_hal::pwm::SetDutyCycle;
use rand_core::RngCore;

use crate::config::PulseConfig;
use crate::random;
use crate::scheduler::Watchdog;
use crate::tick::TickSource;

/// Per-pulse shape, derived from [`PulseConfig`] plus jitter.
///
/// Every value is at least one, so a ramp always makes progress and the
/// sustain phase always lasts at least one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseParameters {
    /// Ticks spent holding the ceiling.
    pub sustain: NonZeroU16,
    /// Duty increase per ramp-up tick.
    pub ramp_up: NonZeroU16,
    /// Duty decrease per ramp-down tick.
    pub ramp_down: NonZeroU16,
}

impl PulseParameters {
    /// Parameters with no jitter applied.
    pub fn nominal(config: &PulseConfig) -> Self {
        Self {
            sustain: Self::jittered(config.sustain, 0),
            ramp_up: Self::jittered(config.ramp_up, 0),
            ramp_down: Self::jittered(config.ramp_down, 0),
        }
    }

    /// Draws jittered parameters for a new pulse.
    ///
    /// Consumes six RNG draws, two per value, in the order sustain,
    /// ramp-up, ramp-down.
    pub fn draw<R: RngCore>(config: &PulseConfig, rng: &mut R) -> Self {
        let sustain = Self::jittered(config.sustain, random::jitter(rng));
        let ramp_up = Self::jittered(config.ramp_up, random::jitter(rng));
        let ramp_down = Self::jittered(config.ramp_down, random::jitter(rng));

        Self {
            sustain,
            ramp_up,
            ramp_down,
        }
    }

    /// Applies `jitter` to `base`, clamping the result to `1..=u16::MAX`.
    pub fn jittered(base: u16, jitter: i8) -> NonZeroU16 {
        let value = (i32::from(base) + i32::from(jitter)).clamp(1, i32::from(u16::MAX));
        // `value` is in 1..=u16::MAX after the clamp.
        NonZeroU16::new(value as u16).unwrap_or(NonZeroU16::MIN)
    }
}

/// Current stage of a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Duty cycle climbing towards the ceiling.
    RampUp,
    /// Holding the ceiling for the remaining number of ticks.
    Sustain { remaining: u16 },
    /// Duty cycle falling towards the floor.
    RampDown,
    /// Pulse finished, duty cycle is at the floor.
    Done,
}

/// Tick-by-tick pulse state machine, independent of any hardware.
#[derive(Debug, Clone)]
pub struct Pulse {
    config: PulseConfig,
    params: PulseParameters,
    duty: u16,
    phase: Phase,
}

impl Pulse {
    /// Starts a pulse at `config.dc_min`.
    ///
    /// `config.dc_min` must not exceed `config.dc_max`.
    pub fn new(config: PulseConfig, params: PulseParameters) -> Self {
        debug_assert!(config.dc_min <= config.dc_max);

        let mut pulse = Self {
            config,
            params,
            duty: config.dc_min,
            phase: Phase::RampUp,
        };
        pulse.settle();
        pulse
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn params(&self) -> PulseParameters {
        self.params
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Performs the work of one tick.
    ///
    /// Returns the new duty level when it has to be pushed to the LED.
    /// The sustain phase never produces a write. Calling this after the
    /// pulse is done is a no-op.
    pub fn advance(&mut self) -> Option<u16> {
        let write = match self.phase {
            Phase::RampUp => {
                let headroom = self.config.dc_max - self.duty;
                self.duty += headroom.min(self.params.ramp_up.get());
                Some(self.duty)
            }
            Phase::Sustain { remaining } => {
                self.phase = Phase::Sustain {
                    remaining: remaining.saturating_sub(1),
                };
                None
            }
            Phase::RampDown => {
                let room = self.duty - self.config.dc_min;
                self.duty -= room.min(self.params.ramp_down.get());
                Some(self.duty)
            }
            Phase::Done => None,
        };

        self.settle();
        write
    }

    /// Moves through every phase whose exit condition already holds.
    fn settle(&mut self) {
        loop {
            self.phase = match self.phase {
                Phase::RampUp if self.duty >= self.config.dc_max => Phase::Sustain {
                    remaining: self.params.sustain.get(),
                },
                Phase::Sustain { remaining: 0 } => Phase::RampDown,
                Phase::RampDown if self.duty <= self.config.dc_min => Phase::Done,
                _ => return,
            };
        }
    }
}

/// What a finished pulse looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSummary {
    pub params: PulseParameters,
    pub ramp_up_ticks: u32,
    pub sustain_ticks: u32,
    pub ramp_down_ticks: u32,
}

impl PulseSummary {
    fn new(params: PulseParameters) -> Self {
        Self {
            params,
            ramp_up_ticks: 0,
            sustain_ticks: 0,
            ramp_down_ticks: 0,
        }
    }

    fn record(&mut self, phase: Phase) {
        match phase {
            Phase::RampUp => self.ramp_up_ticks += 1,
            Phase::Sustain { .. } => self.sustain_ticks += 1,
            Phase::RampDown => self.ramp_down_ticks += 1,
            Phase::Done => {}
        }
    }

    /// Ticks consumed by the whole pulse.
    pub fn total_ticks(&self) -> u32 {
        self.ramp_up_ticks + self.sustain_ticks + self.ramp_down_ticks
    }
}

/// Drives [`Pulse`]s onto a PWM channel.
///
/// Duty levels are written as the fraction `level / dc_max` of the
/// channel's range, so `dc_max` always means fully lit.
pub struct PulseEngine<S> {
    led: S,
    config: PulseConfig,
}

impl<S: SetDutyCycle> PulseEngine<S> {
    /// Creates an engine for `led`. `config.dc_min` must be below `config.dc_max`.
    pub fn new(led: S, config: PulseConfig) -> Self {
        debug_assert!(config.dc_min < config.dc_max);
        Self { led, config }
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    /// Forces the LED to the floor level.
    pub fn off(&mut self) -> Result<(), S::Error> {
        self.write(self.config.dc_min)
    }

    /// Runs one complete pulse, returning once the LED is back at the floor.
    ///
    /// The tick source must already be running: this waits on it for every
    /// unit of work and has no timeout. The watchdog is fed on every tick.
    pub async fn run<T, W, R>(
        &mut self,
        ticks: &mut T,
        watchdog: &mut W,
        rng: &mut R,
    ) -> Result<PulseSummary, S::Error>
    where
        T: TickSource,
        W: Watchdog,
        R: RngCore,
    {
        let params = PulseParameters::draw(&self.config, rng);
        let mut pulse = Pulse::new(self.config, params);
        let mut summary = PulseSummary::new(params);

        #[cfg(feature = "debug-mode")]
        defmt::debug!("Pulse starting: {}", params);

        self.write(pulse.duty())?;

        while !pulse.is_done() {
            ticks.next_tick().await;
            watchdog.feed();

            summary.record(pulse.phase());
            if let Some(level) = pulse.advance() {
                self.write(level)?;
            }
        }

        // Explicit final write so the LED is guaranteed off.
        self.write(self.config.dc_min)?;

        #[cfg(feature = "debug-mode")]
        defmt::debug!("Pulse finished after {} ticks", summary.total_ticks());

        Ok(summary)
    }

    fn write(&mut self, level: u16) -> Result<(), S::Error> {
        self.led.set_duty_cycle_fraction(level, self.config.dc_max)
    }
}
