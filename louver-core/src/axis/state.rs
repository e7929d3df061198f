//! Axis state and status snapshot

use crate::motion::MotionPhase;

/// High-level axis state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisState {
    /// Driver de-energized, no motion possible
    Disabled,
    /// Energized and at rest
    Idle,
    /// Energized and travelling toward the target
    Moving,
}

impl AxisState {
    /// Check if the driver is energized
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AxisState::Disabled)
    }
}

/// Read-only snapshot of the axis, as reported by `status`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisStatus {
    /// Current position in steps
    pub position_steps: i32,
    /// Current position in mm
    pub position_mm: f32,
    /// Target position in steps
    pub target_steps: i32,
    /// High-level state
    pub state: AxisState,
    /// Auto-oscillation active
    pub auto_mode: bool,
    /// Next automatic move heads toward the upper soft limit
    pub going_forward_next: bool,
    /// Signed speed in steps/s
    pub speed_steps_per_s: f32,
    /// Motion phase of the step generator
    pub phase: MotionPhase,
}

impl AxisStatus {
    /// Check if the driver is energized
    pub fn enabled(&self) -> bool {
        self.state.is_enabled()
    }
}
