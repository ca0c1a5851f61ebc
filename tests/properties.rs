//! Property tests for the pulse state machine.
//!
//! Runs the pure [`Pulse`] tick by tick, so every intermediate duty level
//! is observed.

use firefly::{Phase, Pulse, PulseConfig, PulseParameters};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct Trace {
    ramp_up_ticks: u32,
    sustain_ticks: u32,
    ramp_down_ticks: u32,
    sustain_writes: u32,
    last_write: Option<u16>,
}

/// Drives `pulse` to completion, checking bounds after every tick.
fn trace(mut pulse: Pulse, config: &PulseConfig) -> Trace {
    let mut trace = Trace::default();
    let limit = 4 * (u32::from(config.span()) + 1) + u32::from(pulse.params().sustain.get());

    while !pulse.is_done() {
        let phase = pulse.phase();
        let write = pulse.advance();

        assert!(
            (config.dc_min..=config.dc_max).contains(&pulse.duty()),
            "duty {} escaped [{}, {}]",
            pulse.duty(),
            config.dc_min,
            config.dc_max
        );

        match phase {
            Phase::RampUp => trace.ramp_up_ticks += 1,
            Phase::Sustain { .. } => {
                trace.sustain_ticks += 1;
                assert_eq!(pulse.duty(), config.dc_max);
                if write.is_some() {
                    trace.sustain_writes += 1;
                }
            }
            Phase::RampDown => trace.ramp_down_ticks += 1,
            Phase::Done => unreachable!("ticked a finished pulse"),
        }
        if write.is_some() {
            trace.last_write = write;
        }

        assert!(
            trace.ramp_up_ticks + trace.sustain_ticks + trace.ramp_down_ticks <= limit,
            "pulse did not terminate"
        );
    }

    trace
}

fn ceil_div(numerator: u16, denominator: u16) -> u32 {
    u32::from(numerator).div_ceil(u32::from(denominator))
}

#[test]
fn jittered_parameters_are_always_positive() {
    let firefly = PulseConfig::FIREFLY;
    let bases = [firefly.sustain, firefly.ramp_up, firefly.ramp_down];

    for base in bases {
        for jitter in -3..=3 {
            let value = PulseParameters::jittered(base, jitter).get();
            assert_eq!(i32::from(value), i32::from(base) + i32::from(jitter));
            assert!(value >= 1);
        }
    }
}

#[test]
fn small_bases_are_clamped_to_one() {
    // Bases this small would reach zero or below without the clamp.
    for base in 0..=3u16 {
        for jitter in -3..=3i8 {
            let value = PulseParameters::jittered(base, jitter).get();
            let raw = i32::from(base) + i32::from(jitter);
            assert_eq!(i32::from(value), raw.max(1));
        }
    }
}

#[test]
fn ramp_up_is_bounded_by_smallest_jittered_step() {
    let config = PulseConfig::FIREFLY;
    let smallest = PulseParameters::jittered(config.ramp_up, -3);
    let params = PulseParameters {
        ramp_up: smallest,
        ..PulseParameters::nominal(&config)
    };

    let trace = trace(Pulse::new(config, params), &config);

    assert_eq!(trace.ramp_up_ticks, ceil_div(config.span(), smallest.get()));
}

fn arb_config() -> impl Strategy<Value = PulseConfig> {
    (0u16..200, 1u16..300).prop_flat_map(|(dc_min, span)| {
        let dc_max = dc_min + span;
        (1u16..=64, 1u16..=span + 4, 1u16..=span + 4).prop_map(
            move |(sustain, ramp_up, ramp_down)| PulseConfig {
                sustain,
                ramp_up,
                ramp_down,
                dc_min,
                dc_max,
            },
        )
    })
}

proptest! {
    /// Duty stays in bounds and each phase takes exactly the expected ticks.
    #[test]
    fn pulse_phases_are_exact(config in arb_config(), jitters in prop::array::uniform3(-3i8..=3)) {
        let params = PulseParameters {
            sustain: PulseParameters::jittered(config.sustain, jitters[0]),
            ramp_up: PulseParameters::jittered(config.ramp_up, jitters[1]),
            ramp_down: PulseParameters::jittered(config.ramp_down, jitters[2]),
        };

        let trace = trace(Pulse::new(config, params), &config);

        prop_assert_eq!(trace.ramp_up_ticks, ceil_div(config.span(), params.ramp_up.get()));
        prop_assert_eq!(trace.sustain_ticks, u32::from(params.sustain.get()));
        prop_assert_eq!(trace.ramp_down_ticks, ceil_div(config.span(), params.ramp_down.get()));
        prop_assert_eq!(trace.sustain_writes, 0);
        prop_assert_eq!(trace.last_write, Some(config.dc_min));
    }

    /// Sustain is entered exactly when ramp-up lands on the ceiling.
    #[test]
    fn ramp_up_lands_exactly_on_ceiling(config in arb_config()) {
        let mut pulse = Pulse::new(config, PulseParameters::nominal(&config));
        let mut last = None;

        while pulse.phase() == Phase::RampUp {
            last = pulse.advance();
        }

        prop_assert_eq!(last, Some(config.dc_max));
        prop_assert_eq!(
            pulse.phase(),
            Phase::Sustain { remaining: PulseParameters::nominal(&config).sustain.get() }
        );
    }
}
