//! Step pulse sink trait
//!
//! Abstracts the STEP/DIR/ENABLE output stage of a stepper driver
//! (A4988, DRV8825, TMC2209 in step/dir mode, ...). The motion code never
//! touches pins directly.

/// Direction of travel along the axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward increasing step counts
    Forward,
    /// Toward decreasing step counts
    Reverse,
}

impl Direction {
    /// Position change of one step in this direction
    pub fn step_delta(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Output stage of a step/dir stepper driver
///
/// Both methods run on the control loop's hot path and must return within
/// a few microseconds: one `step` per emitted step event, no buffering.
pub trait StepPulseSink {
    /// Energize (`true`) or de-energize (`false`) the driver
    ///
    /// A de-energized motor does not hold position.
    fn set_enabled(&mut self, enabled: bool);

    /// Set the direction pin, then emit one short pulse on the step pin
    fn step(&mut self, direction: Direction);
}
