//! Scheduler loop: sleep, wake, and occasionally flash.
//!
//! Each iteration parks the core until any interrupt arrives, services the
//! watchdog, then flips a coin. On heads the tick source is reloaded and a
//! full pulse runs to completion before the loop goes back to sleep.

use core::convert::Infallible;

use embedded_hal::pwm::SetDutyCycle;
use rand_core::RngCore;

use crate::pulse::{PulseEngine, PulseSummary};
use crate::random;
use crate::tick::TickSource;

/// Watchdog servicing primitive.
pub trait Watchdog {
    /// Restarts the watchdog countdown.
    fn feed(&mut self);
}

/// Power primitives used by the scheduler loop, in this order:
/// [`mask_interrupts`](Platform::mask_interrupts),
/// [`enter_sleep`](Platform::enter_sleep),
/// [`unmask_interrupts`](Platform::unmask_interrupts),
/// [`Watchdog::feed`].
pub trait Platform: Watchdog {
    /// Stops interrupt handlers from running. Wake-ups still latch.
    fn mask_interrupts(&mut self);

    /// Enters low-power sleep until any interrupt becomes pending.
    fn enter_sleep(&mut self);

    /// Lets pending interrupt handlers run again.
    fn unmask_interrupts(&mut self);
}

/// Result of one scheduler iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Woke up and went straight back to sleep.
    Idle,
    /// Woke up and ran one pulse.
    Pulsed(PulseSummary),
}

/// Owns everything the loop touches.
pub struct Scheduler<P, T, S, R> {
    platform: P,
    ticks: T,
    engine: PulseEngine<S>,
    rng: R,
}

impl<P, T, S, R> Scheduler<P, T, S, R>
where
    P: Platform,
    T: TickSource,
    S: SetDutyCycle,
    R: RngCore,
{
    pub fn new(platform: P, ticks: T, engine: PulseEngine<S>, rng: R) -> Self {
        Self {
            platform,
            ticks,
            engine,
            rng,
        }
    }

    /// Sleeps once, then decides whether to pulse.
    pub async fn run_once(&mut self) -> Result<Outcome, S::Error> {
        self.platform.mask_interrupts();
        self.platform.enter_sleep();
        self.platform.unmask_interrupts();
        self.platform.feed();

        if !random::should_pulse(&mut self.rng) {
            return Ok(Outcome::Idle);
        }

        self.ticks.reload();
        let summary = self
            .engine
            .run(&mut self.ticks, &mut self.platform, &mut self.rng)
            .await?;
        self.ticks.halt();

        Ok(Outcome::Pulsed(summary))
    }

    /// Runs the loop forever. Only returns if the LED reports an error.
    pub async fn run(&mut self) -> Result<Infallible, S::Error> {
        loop {
            let outcome = self.run_once().await?;

            #[cfg(feature = "debug-mode")]
            defmt::debug!("Wake-up outcome: {}", outcome);
            #[cfg(not(feature = "debug-mode"))]
            let _ = outcome;
        }
    }
}
