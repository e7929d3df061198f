//! Stepper driver implementations

pub mod pulse;

pub use pulse::{PulseConfig, PulseStepper};
