//! STEP/DIR/EN stepper driver
//!
//! Drives any stepper driver chip with a step/direction interface. One
//! call to [`StepPulseSink::step`] produces one rising edge on STEP,
//! held high for the configured pulse width. DIR is only rewritten when
//! the direction changes, followed by the setup time the chip needs
//! before the next edge.
//!
//! Pin errors are ignored: on the supported boards GPIO writes are
//! infallible, and the motion code has no way to recover mid-step.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use louver_core::traits::{Direction, StepPulseSink};

/// Pulse timing and pin polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseConfig {
    /// STEP high time in ns (A4988: >= 1 µs)
    pub step_pulse_ns: u32,
    /// DIR to STEP setup time in ns (A4988: >= 200 ns)
    pub dir_setup_ns: u32,
    /// Swap the meaning of DIR high/low
    pub invert_dir: bool,
    /// EN is active low (A4988, DRV8825, TMC2209)
    pub enable_active_low: bool,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            step_pulse_ns: 2_000,
            dir_setup_ns: 1_000,
            invert_dir: false,
            enable_active_low: true,
        }
    }
}

/// Step/direction driver over `embedded-hal` pins
pub struct PulseStepper<STEP, DIR, EN, D> {
    step: STEP,
    dir: DIR,
    enable: EN,
    delay: D,
    config: PulseConfig,
    /// Direction currently latched on DIR, `None` until the first step
    direction: Option<Direction>,
    enabled: bool,
}

impl<STEP, DIR, EN, D> PulseStepper<STEP, DIR, EN, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    D: DelayNs,
{
    /// Create the driver with the output de-energized and STEP low
    pub fn new(step: STEP, dir: DIR, enable: EN, delay: D, config: PulseConfig) -> Self {
        let mut stepper = Self {
            step,
            dir,
            enable,
            delay,
            config,
            direction: None,
            enabled: false,
        };
        stepper.step.set_low().ok();
        stepper.write_enable(false);
        stepper
    }

    /// Check if the driver output is energized
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn write_enable(&mut self, on: bool) {
        if on != self.config.enable_active_low {
            self.enable.set_high().ok();
        } else {
            self.enable.set_low().ok();
        }
    }

    fn write_direction(&mut self, direction: Direction) {
        let forward = direction == Direction::Forward;
        if forward != self.config.invert_dir {
            self.dir.set_high().ok();
        } else {
            self.dir.set_low().ok();
        }
        self.delay.delay_ns(self.config.dir_setup_ns);
        self.direction = Some(direction);
    }
}

impl<STEP, DIR, EN, D> StepPulseSink for PulseStepper<STEP, DIR, EN, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    D: DelayNs,
{
    fn set_enabled(&mut self, enabled: bool) {
        self.write_enable(enabled);
        self.enabled = enabled;
    }

    fn step(&mut self, direction: Direction) {
        if self.direction != Some(direction) {
            self.write_direction(direction);
        }
        self.step.set_high().ok();
        self.delay.delay_ns(self.config.step_pulse_ns);
        self.step.set_low().ok();
    }
}
