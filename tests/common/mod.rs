//! Mock hardware for host tests.
//!
//! Every mock shares one [`Recorder`], so tests can assert on the full,
//! ordered history of hardware interactions across all of them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use firefly::{Platform, TickSource, Watchdog};
use rand_core::RngCore;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Tick,
    Duty(u16),
    Feed,
    Reload,
    Halt,
    Mask,
    Sleep,
    Unmask,
}

#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<Call>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn duties(&self) -> Vec<u16> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Duty(level) => Some(*level),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: Call) -> usize {
        self.0.borrow().iter().filter(|call| **call == wanted).count()
    }
}

// ── PWM sink ──────────────────────────────────────────────────

/// PWM channel whose range equals the pulse ceiling, so every recorded
/// duty value is the pulse level itself.
pub struct MockPwm {
    rec: Recorder,
    max_duty: u16,
}

impl MockPwm {
    pub fn new(rec: &Recorder, max_duty: u16) -> Self {
        Self {
            rec: rec.clone(),
            max_duty,
        }
    }
}

impl ErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.rec.push(Call::Duty(duty));
        Ok(())
    }
}

// ── Tick source ───────────────────────────────────────────────

/// Tick source whose every period elapses immediately.
pub struct MockTicks {
    rec: Recorder,
}

impl MockTicks {
    pub fn new(rec: &Recorder) -> Self {
        Self { rec: rec.clone() }
    }
}

impl TickSource for MockTicks {
    fn reload(&mut self) {
        self.rec.push(Call::Reload);
    }

    fn halt(&mut self) {
        self.rec.push(Call::Halt);
    }

    async fn next_tick(&mut self) {
        self.rec.push(Call::Tick);
    }
}

// ── Platform ──────────────────────────────────────────────────

pub struct MockPlatform {
    rec: Recorder,
}

impl MockPlatform {
    pub fn new(rec: &Recorder) -> Self {
        Self { rec: rec.clone() }
    }
}

impl Watchdog for MockPlatform {
    fn feed(&mut self) {
        self.rec.push(Call::Feed);
    }
}

impl Platform for MockPlatform {
    fn mask_interrupts(&mut self) {
        self.rec.push(Call::Mask);
    }

    fn enter_sleep(&mut self) {
        self.rec.push(Call::Sleep);
    }

    fn unmask_interrupts(&mut self) {
        self.rec.push(Call::Unmask);
    }
}

// ── RNG ───────────────────────────────────────────────────────

/// RNG replaying a fixed script of `next_u32` values, cycling at the end.
pub struct ScriptedRng {
    values: Vec<u32>,
    pos: usize,
}

impl ScriptedRng {
    pub fn new(values: &[u32]) -> Self {
        assert!(!values.is_empty(), "script must not be empty");
        Self {
            values: values.to_vec(),
            pos: 0,
        }
    }

    /// Every draw is zero: always pulse, never jitter.
    pub fn zeros() -> Self {
        Self::new(&[0])
    }

    pub fn draws(&self) -> usize {
        self.pos
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
