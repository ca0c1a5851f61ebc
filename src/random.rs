//! Pseudo-random decisions drawn from the shared RNG.
//!
//! Every draw is reduced to the 15-bit range of a classic C `rand()`, so
//! thresholds and masks keep their familiar meaning regardless of the
//! generator behind [`RngCore`].

use rand_core::RngCore;

/// Largest value [`draw`] can return.
pub const RAND_MAX: u16 = 0x7FFF;

/// Draws below this value trigger a pulse (a 50% chance).
pub const PULSE_THRESHOLD: u16 = RAND_MAX / 2;

/// Mask applied to each half of a jitter draw.
const JITTER_MASK: u16 = 0x03;

/// Draws one value in `0..=RAND_MAX`.
pub fn draw<R: RngCore>(rng: &mut R) -> u16 {
    // The mask keeps 15 bits, so the cast is lossless.
    (rng.next_u32() & u32::from(RAND_MAX)) as u16
}

/// Coin flip deciding whether the current wake-up produces a pulse.
pub fn should_pulse<R: RngCore>(rng: &mut R) -> bool {
    draw(rng) < PULSE_THRESHOLD
}

/// Symmetric jitter in `-3..=3`, peaked at zero.
///
/// Uses two independent draws: the first is added, the second subtracted.
pub fn jitter<R: RngCore>(rng: &mut R) -> i8 {
    let up = (draw(rng) & JITTER_MASK) as i8;
    let down = (draw(rng) & JITTER_MASK) as i8;
    up - down
}
