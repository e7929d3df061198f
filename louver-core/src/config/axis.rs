//! Axis configuration
//!
//! One vent axis: a stepper on a lead screw, bounded by soft limits given
//! in millimeters. Hardware variants differ only in these numbers.

use serde::{Deserialize, Serialize};

/// Millimeters of slack beyond each soft limit that a restored position
/// may sit in and still be trusted
pub const RESTORE_SLACK_MM: f32 = 10.0;

/// Axis configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConfig {
    /// Full steps per motor revolution (200 for a 1.8° motor)
    pub full_steps_per_rev: u16,
    /// Driver microstep factor
    pub microsteps: u16,
    /// Lead screw travel per revolution in mm
    pub lead_screw_pitch_mm: f32,
    /// Step rate ceiling in steps/s
    pub max_speed_steps_per_s: f32,
    /// Acceleration (and deceleration) in steps/s²
    pub acceleration_steps_per_s2: f32,
    /// Lower soft limit in mm
    pub soft_limit_min_mm: f32,
    /// Upper soft limit in mm
    pub soft_limit_max_mm: f32,
    /// Minimum displacement in steps before a new position record is written
    pub hysteresis_steps: u32,
    /// How often the persistence check runs, in ms
    pub persist_interval_ms: u32,
    /// Displacement of a single left/right jog, in steps
    pub jog_steps: u32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            full_steps_per_rev: 200,
            microsteps: 16,
            lead_screw_pitch_mm: 8.0, // T8 lead screw: 200 * 16 / 8 = 400 steps/mm
            max_speed_steps_per_s: 3000.0,
            acceleration_steps_per_s2: 2000.0,
            soft_limit_min_mm: -100.0,
            soft_limit_max_mm: 100.0,
            hysteresis_steps: 10,
            persist_interval_ms: 2000,
            jog_steps: 200,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Steps per revolution or microsteps is zero
    ZeroStepResolution,
    /// Lead screw pitch is not a positive finite number
    InvalidPitch,
    /// Maximum speed is not a positive finite number
    InvalidSpeed,
    /// Acceleration is not a positive finite number
    InvalidAcceleration,
    /// Soft limits are not finite or min > max
    InvalidSoftLimits,
    /// Soft limits do not fit in an i32 step count
    SoftLimitOverflow,
    /// Persist interval is zero
    ZeroPersistInterval,
}

impl AxisConfig {
    /// Check the configuration for values the motion code cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.full_steps_per_rev == 0 || self.microsteps == 0 {
            return Err(ConfigError::ZeroStepResolution);
        }
        if !is_positive(self.lead_screw_pitch_mm) {
            return Err(ConfigError::InvalidPitch);
        }
        if !is_positive(self.max_speed_steps_per_s) {
            return Err(ConfigError::InvalidSpeed);
        }
        if !is_positive(self.acceleration_steps_per_s2) {
            return Err(ConfigError::InvalidAcceleration);
        }
        if !self.soft_limit_min_mm.is_finite()
            || !self.soft_limit_max_mm.is_finite()
            || self.soft_limit_min_mm > self.soft_limit_max_mm
        {
            return Err(ConfigError::InvalidSoftLimits);
        }

        // Keep the slack band representable too, restored records are
        // checked against it
        let spm = self.steps_per_mm();
        let lo = (self.soft_limit_min_mm - RESTORE_SLACK_MM) * spm;
        let hi = (self.soft_limit_max_mm + RESTORE_SLACK_MM) * spm;
        if lo < i32::MIN as f32 / 2.0 || hi > i32::MAX as f32 / 2.0 {
            return Err(ConfigError::SoftLimitOverflow);
        }

        if self.persist_interval_ms == 0 {
            return Err(ConfigError::ZeroPersistInterval);
        }
        Ok(())
    }

    /// Steps per millimeter of travel
    pub fn steps_per_mm(&self) -> f32 {
        self.full_steps_per_rev as f32 * self.microsteps as f32 / self.lead_screw_pitch_mm
    }

    /// Convert millimeters to the nearest whole step
    pub fn mm_to_steps(&self, mm: f32) -> i32 {
        libm::roundf(mm * self.steps_per_mm()) as i32
    }

    /// Convert steps to millimeters
    pub fn steps_to_mm(&self, steps: i32) -> f32 {
        steps as f32 / self.steps_per_mm()
    }

    /// Soft limits in steps
    pub fn soft_limits(&self) -> SoftLimits {
        SoftLimits {
            min_steps: self.mm_to_steps(self.soft_limit_min_mm),
            max_steps: self.mm_to_steps(self.soft_limit_max_mm),
        }
    }

    /// Check whether a position (in steps) is plausible for a restored record
    ///
    /// The band is the soft-limit range widened by [`RESTORE_SLACK_MM`] on
    /// both sides, which absorbs a record written mid-move.
    pub fn is_restorable(&self, steps: i32) -> bool {
        let mm = self.steps_to_mm(steps);
        mm >= self.soft_limit_min_mm - RESTORE_SLACK_MM
            && mm <= self.soft_limit_max_mm + RESTORE_SLACK_MM
    }

    /// Persist interval in microseconds
    pub fn persist_interval_us(&self) -> u64 {
        self.persist_interval_ms as u64 * 1000
    }

    /// Apply stored tuning overrides
    pub fn with_tuning(mut self, tuning: MotionTuning) -> Self {
        self.max_speed_steps_per_s = tuning.max_speed_steps_per_s;
        self.acceleration_steps_per_s2 = tuning.acceleration_steps_per_s2;
        self
    }

    /// Current tuning values
    pub fn tuning(&self) -> MotionTuning {
        MotionTuning {
            max_speed_steps_per_s: self.max_speed_steps_per_s,
            acceleration_steps_per_s2: self.acceleration_steps_per_s2,
        }
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Soft limits of an axis in steps, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftLimits {
    /// Lowest commandable position
    pub min_steps: i32,
    /// Highest commandable position
    pub max_steps: i32,
}

impl SoftLimits {
    /// Check if a position lies within the limits
    pub fn contains(&self, steps: i32) -> bool {
        steps >= self.min_steps && steps <= self.max_steps
    }

    /// Clamp a position to the limits
    pub fn clamp(&self, steps: i32) -> i32 {
        steps.clamp(self.min_steps, self.max_steps)
    }
}

/// Speed and acceleration set at runtime
///
/// Stored to flash with postcard so live tuning survives a reboot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionTuning {
    /// Step rate ceiling in steps/s
    pub max_speed_steps_per_s: f32,
    /// Acceleration in steps/s²
    pub acceleration_steps_per_s2: f32,
}

impl MotionTuning {
    /// Check that both values are positive and finite
    pub fn is_valid(&self) -> bool {
        is_positive(self.max_speed_steps_per_s) && is_positive(self.acceleration_steps_per_s2)
    }
}
