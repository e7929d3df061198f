//! Axis controller
//!
//! Single owner of the axis: position, target, enable state, auto mode.
//! Every operation runs to completion without blocking; the only
//! hardware it touches is the [`StepPulseSink`].

use crate::config::{AxisConfig, ConfigError, MotionTuning, SoftLimits};
use crate::motion::{plan_move, MoveEstimate, StepEvent, StepGenerator, Tick};
use crate::persist::{PersistedRecord, RestoredState};
use crate::traits::StepPulseSink;

use super::state::{AxisState, AxisStatus};

/// Rejections returned to the caller of a control operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisError {
    /// Absolute target outside the soft limits
    OutOfRange,
    /// Motion requested while the driver is de-energized
    Disabled,
    /// Speed or acceleration not a positive finite number
    InvalidTuning,
}

/// Direction of a manual jog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JogDirection {
    /// Toward the lower soft limit
    Left,
    /// Toward the upper soft limit
    Right,
}

/// Something worth reporting that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisEvent {
    /// A step pulse was emitted
    Stepped(StepEvent),
    /// A move reached its target
    MoveComplete {
        /// Final position in steps
        position_steps: i32,
        /// The move was issued by auto mode
        automatic: bool,
        /// Target of the next oscillation leg, if auto mode issued one
        next_target: Option<i32>,
    },
}

/// Position state machine for one vent axis
pub struct AxisController<S: StepPulseSink> {
    config: AxisConfig,
    limits: SoftLimits,
    generator: StepGenerator,
    sink: S,
    enabled: bool,
    auto_mode: bool,
    /// The move in flight was issued by auto mode
    auto_move_in_flight: bool,
    going_forward_next: bool,
    last_persisted_steps: i32,
    next_persist_check_us: Option<u64>,
}

impl<S: StepPulseSink> AxisController<S> {
    /// Create the controller from restored (or default) state
    ///
    /// The axis starts disabled and at rest at the restored position; the
    /// driver is de-energized immediately. The restored target is not
    /// resumed.
    pub fn new(
        config: AxisConfig,
        restored: &RestoredState,
        mut sink: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        sink.set_enabled(false);

        Ok(Self {
            limits: config.soft_limits(),
            generator: StepGenerator::new(
                restored.position_steps,
                config.max_speed_steps_per_s,
                config.acceleration_steps_per_s2,
            ),
            config,
            sink,
            enabled: false,
            auto_mode: false,
            auto_move_in_flight: false,
            going_forward_next: restored.going_forward,
            last_persisted_steps: restored.position_steps,
            next_persist_check_us: None,
        })
    }

    /// Axis configuration, including live tuning
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Soft limits in steps
    pub fn limits(&self) -> SoftLimits {
        self.limits
    }

    /// Current position in steps
    pub fn position(&self) -> i32 {
        self.generator.position()
    }

    /// Target position in steps
    pub fn target(&self) -> i32 {
        self.generator.target()
    }

    /// High-level state
    pub fn state(&self) -> AxisState {
        if !self.enabled {
            AxisState::Disabled
        } else if self.generator.is_moving() {
            AxisState::Moving
        } else {
            AxisState::Idle
        }
    }

    /// Check if auto-oscillation is active
    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    /// Direction of the next automatic move (`true` = toward the upper limit)
    pub fn going_forward_next(&self) -> bool {
        self.going_forward_next
    }

    /// Step output stage
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Read-only snapshot
    pub fn status(&self) -> AxisStatus {
        let position = self.generator.position();
        AxisStatus {
            position_steps: position,
            position_mm: self.config.steps_to_mm(position),
            target_steps: self.generator.target(),
            state: self.state(),
            auto_mode: self.auto_mode,
            going_forward_next: self.going_forward_next,
            speed_steps_per_s: self.generator.speed(),
            phase: self.generator.phase(),
        }
    }

    /// Energize or de-energize the driver
    ///
    /// Disabling cancels any move without deceleration and clears auto
    /// mode. Neither direction writes a position record.
    pub fn set_enabled(&mut self, on: bool) {
        if on {
            if !self.enabled {
                self.sink.set_enabled(true);
                self.enabled = true;
            }
            return;
        }

        self.sink.set_enabled(false);
        self.enabled = false;
        self.auto_mode = false;
        self.auto_move_in_flight = false;
        self.generator.stop();
    }

    /// Start a move to an absolute position
    ///
    /// Clears auto mode. Returns the advisory duration estimate.
    pub fn request_move(&mut self, target_steps: i32) -> Result<MoveEstimate, AxisError> {
        if !self.enabled {
            return Err(AxisError::Disabled);
        }
        if !self.limits.contains(target_steps) {
            return Err(AxisError::OutOfRange);
        }

        self.auto_mode = false;
        self.auto_move_in_flight = false;
        Ok(self.start_move(target_steps))
    }

    /// Start a move relative to the current position, clamped to the soft limits
    pub fn request_relative_move(&mut self, delta_steps: i32) -> Result<MoveEstimate, AxisError> {
        let target = self
            .limits
            .clamp(self.generator.position().saturating_add(delta_steps));
        self.request_move(target)
    }

    /// Relative move in millimeters, clamped to the soft limits
    pub fn request_relative_move_mm(&mut self, delta_mm: f32) -> Result<MoveEstimate, AxisError> {
        if !delta_mm.is_finite() {
            return Err(AxisError::OutOfRange);
        }
        self.request_relative_move(self.config.mm_to_steps(delta_mm))
    }

    /// Jog by the configured increment
    pub fn jog(&mut self, direction: JogDirection) -> Result<MoveEstimate, AxisError> {
        let increment = i32::try_from(self.config.jog_steps).unwrap_or(i32::MAX);
        match direction {
            JogDirection::Left => self.request_relative_move(-increment),
            JogDirection::Right => self.request_relative_move(increment),
        }
    }

    /// Move back to the zero reference
    pub fn home(&mut self) -> Result<MoveEstimate, AxisError> {
        self.request_move(0)
    }

    /// Halt immediately: speed to zero, target to the current position
    ///
    /// Also clears auto mode so the oscillation does not restart on the
    /// next tick.
    pub fn stop(&mut self) {
        self.auto_mode = false;
        self.auto_move_in_flight = false;
        self.generator.stop();
    }

    /// Turn auto-oscillation between the soft limits on or off
    ///
    /// Turning it on while at rest issues the first leg at once; while a
    /// manual move is in flight, the first leg starts when that move
    /// completes. Turning it off lets the current leg finish.
    pub fn set_auto_mode(&mut self, on: bool) -> Result<(), AxisError> {
        if !on {
            self.auto_mode = false;
            return Ok(());
        }
        if !self.enabled {
            return Err(AxisError::Disabled);
        }
        if self.auto_mode {
            return Ok(());
        }

        self.auto_mode = true;
        if !self.generator.is_moving() {
            self.start_auto_leg();
        }
        Ok(())
    }

    /// Change the speed ceiling; applies to the move in flight too
    pub fn set_max_speed(&mut self, steps_per_s: f32) -> Result<(), AxisError> {
        if !(steps_per_s.is_finite() && steps_per_s > 0.0) {
            return Err(AxisError::InvalidTuning);
        }
        self.config.max_speed_steps_per_s = steps_per_s;
        self.generator.set_max_speed(steps_per_s);
        Ok(())
    }

    /// Change the acceleration; applies to the move in flight too
    pub fn set_acceleration(&mut self, steps_per_s2: f32) -> Result<(), AxisError> {
        if !(steps_per_s2.is_finite() && steps_per_s2 > 0.0) {
            return Err(AxisError::InvalidTuning);
        }
        self.config.acceleration_steps_per_s2 = steps_per_s2;
        self.generator.set_acceleration(steps_per_s2);
        Ok(())
    }

    /// Current speed and acceleration
    pub fn tuning(&self) -> MotionTuning {
        self.config.tuning()
    }

    /// Advance motion to `now_us`
    ///
    /// Must be called as often as possible while moving: at most one step
    /// is emitted per call, and late calls delay steps.
    pub fn on_tick(&mut self, now_us: u64) -> Option<AxisEvent> {
        if !self.enabled {
            return None;
        }

        match self.generator.tick(now_us, &mut self.sink) {
            Tick::Step(event) => Some(AxisEvent::Stepped(event)),
            Tick::Complete => {
                let automatic = self.auto_move_in_flight;
                if automatic {
                    self.going_forward_next = !self.going_forward_next;
                    self.auto_move_in_flight = false;
                }

                let next_target = if self.auto_mode {
                    Some(self.start_auto_leg())
                } else {
                    None
                };

                Some(AxisEvent::MoveComplete {
                    position_steps: self.generator.position(),
                    automatic,
                    next_target,
                })
            }
            Tick::Idle | Tick::Waiting => None,
        }
    }

    /// Produce a position record when one is due
    ///
    /// Runs its check at most once per persist interval and returns a
    /// record only when the axis has moved more than the hysteresis
    /// threshold since the last record. The caller writes it to the
    /// durable store outside the control loop.
    pub fn maybe_persist(&mut self, now_us: u64) -> Option<PersistedRecord> {
        if let Some(next) = self.next_persist_check_us {
            if now_us < next {
                return None;
            }
        }
        self.next_persist_check_us = Some(now_us.saturating_add(self.config.persist_interval_us()));

        let position = self.generator.position();
        let moved = (position as i64 - self.last_persisted_steps as i64).unsigned_abs();
        if moved <= self.config.hysteresis_steps as u64 {
            return None;
        }

        self.last_persisted_steps = position;
        Some(PersistedRecord {
            position_steps: position,
            target_steps: self.generator.target(),
            going_forward: self.going_forward_next,
        })
    }

    fn start_move(&mut self, target_steps: i32) -> MoveEstimate {
        let estimate = plan_move(
            target_steps.saturating_sub(self.generator.position()),
            self.config.max_speed_steps_per_s,
            self.config.acceleration_steps_per_s2,
        );
        self.generator.set_target(target_steps);
        estimate
    }

    fn start_auto_leg(&mut self) -> i32 {
        let target = if self.going_forward_next {
            self.limits.max_steps
        } else {
            self.limits.min_steps
        };
        self.start_move(target);
        self.auto_move_in_flight = true;
        target
    }
}
