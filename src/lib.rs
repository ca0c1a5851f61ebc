//! Firefly LED core.
//!
//! Hardware-independent part of the firefly firmware: the pulse state
//! machine, the tick notification shared with the timer interrupt, and the
//! sleep/wake scheduler loop. Everything that touches STM32 peripherals
//! lives in the firmware binary and reaches this crate through the traits
//! below.
//!
//! # Module Organization
//!
//! - [`config`] - Compiled-in pulse shape and timing constants
//! - [`random`] - Trigger decisions and jitter from the shared RNG
//! - [`tick`] - Tick flag raised from interrupt context, [`tick::TickSource`]
//! - [`pulse`] - Ramp-up / sustain / ramp-down state machine and engine
//! - [`scheduler`] - Outer sleep loop, [`scheduler::Platform`] primitives

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod pulse;
pub mod random;
pub mod scheduler;
pub mod tick;

pub use config::PulseConfig;
pub use pulse::{Phase, Pulse, PulseEngine, PulseParameters, PulseSummary};
pub use scheduler::{Outcome, Platform, Scheduler, Watchdog};
pub use tick::{TICK, TickFlag, TickSource};
