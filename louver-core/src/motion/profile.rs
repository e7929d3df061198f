//! Tick-driven step generator
//!
//! Produces the step pulses for one axis. The velocity profile is not
//! precomputed: each tick looks at the remaining distance and the current
//! speed, decides whether to ramp up or down, and emits a step when the
//! step interval for the current speed has elapsed. This keeps moves
//! correct when the target, ceiling, or acceleration change mid-move.
//!
//! Timing precision is bounded by how often [`StepGenerator::tick`] is
//! called. At most one step is emitted per tick, so a caller ticking every
//! 1 ms caps the effective rate at 1000 steps/s whatever the ceiling says.

use crate::traits::{Direction, StepPulseSink};

/// Largest time step fed into the speed ramp, in seconds
const MAX_RAMP_DT_S: f32 = 0.01;

/// Motion phase of the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// At rest at the target
    Idle,
    /// Speed increasing toward the ceiling
    Accelerating,
    /// At the speed ceiling
    Cruising,
    /// Speed decreasing toward the target
    Decelerating,
    /// Halted by a stop or disable, deceleration skipped
    Stopped,
}

/// One emitted step pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepEvent {
    /// Direction the pulse moved the axis
    pub direction: Direction,
    /// Axis position after the step
    pub position_steps: i32,
    /// Timestamp of the pulse
    pub at_us: u64,
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Nothing to do, axis at rest
    Idle,
    /// Moving, but the next step is not due yet
    Waiting,
    /// A step pulse was emitted
    Step(StepEvent),
    /// The move just finished; reported once per move
    Complete,
}

/// Step generator for one axis
#[derive(Debug, Clone)]
pub struct StepGenerator {
    /// Current position in steps
    position: i32,
    /// Target position in steps
    target: i32,
    /// Signed speed in steps/s, sign is the direction of travel
    speed: f32,
    /// Speed ceiling in steps/s
    max_speed: f32,
    /// Acceleration in steps/s²
    acceleration: f32,
    /// Current phase
    phase: MotionPhase,
    /// A target was set and completion has not been reported yet
    completion_pending: bool,
    /// Timestamp of the previous tick while moving
    last_tick_us: Option<u64>,
    /// Scheduled time of the previous step; the next is due one interval later
    last_step_us: Option<u64>,
}

impl StepGenerator {
    /// Create a generator at rest at `position`
    pub fn new(position: i32, max_speed: f32, acceleration: f32) -> Self {
        Self {
            position,
            target: position,
            speed: 0.0,
            max_speed,
            acceleration,
            phase: MotionPhase::Idle,
            completion_pending: false,
            last_tick_us: None,
            last_step_us: None,
        }
    }

    /// Current position in steps
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Target position in steps
    pub fn target(&self) -> i32 {
        self.target
    }

    /// Signed speed in steps/s
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed ceiling in steps/s
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Acceleration in steps/s²
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Current motion phase
    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Check if a move is in progress (or awaiting its completion report)
    pub fn is_moving(&self) -> bool {
        self.position != self.target || self.completion_pending
    }

    /// Set a new target, superseding any move in progress
    ///
    /// Speed is kept when the new target lies in the current direction of
    /// travel and reset to zero otherwise. Setting the current position as
    /// target still produces one [`Tick::Complete`].
    pub fn set_target(&mut self, target: i32) {
        let remaining = target as i64 - self.position as i64;
        let reversing = (remaining > 0 && self.speed < 0.0)
            || (remaining < 0 && self.speed > 0.0)
            || remaining == 0;
        if reversing {
            self.speed = 0.0;
            self.last_step_us = None;
        }
        if self.speed == 0.0 {
            self.last_tick_us = None;
        }

        self.target = target;
        self.completion_pending = true;
        if remaining != 0 && matches!(self.phase, MotionPhase::Idle | MotionPhase::Stopped) {
            self.phase = MotionPhase::Accelerating;
        }
    }

    /// Halt immediately without deceleration; target becomes the current position
    pub fn stop(&mut self) {
        self.target = self.position;
        self.speed = 0.0;
        self.phase = MotionPhase::Stopped;
        self.completion_pending = false;
        self.last_tick_us = None;
        self.last_step_us = None;
    }

    /// Change the speed ceiling; an in-flight speed above it is clamped at once
    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = max_speed;
        if self.speed > max_speed {
            self.speed = max_speed;
        } else if self.speed < -max_speed {
            self.speed = -max_speed;
        }
    }

    /// Change the acceleration used for the rest of this and future moves
    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.acceleration = acceleration;
    }

    /// Lowest speed used while moving, in steps/s
    ///
    /// The speed reached after accelerating over a single step from rest,
    /// `sqrt(2a)`. Without a floor the ramp could settle at zero speed with
    /// steps still remaining.
    pub fn min_speed(&self) -> f32 {
        libm::sqrtf(2.0 * self.acceleration).min(self.max_speed)
    }

    /// Advance the profile to `now_us`, emitting at most one step pulse
    ///
    /// Call as often as possible. Timestamps must be non-decreasing.
    pub fn tick<S: StepPulseSink>(&mut self, now_us: u64, sink: &mut S) -> Tick {
        let remaining = self.target as i64 - self.position as i64;

        if remaining == 0 {
            self.speed = 0.0;
            self.last_tick_us = None;
            self.last_step_us = None;
            if self.phase != MotionPhase::Stopped {
                self.phase = MotionPhase::Idle;
            }
            if self.completion_pending {
                self.completion_pending = false;
                self.phase = MotionPhase::Idle;
                return Tick::Complete;
            }
            return Tick::Idle;
        }

        let direction = if remaining > 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        };

        let dt = match self.last_tick_us {
            Some(last) => (now_us.saturating_sub(last) as f32 * 1e-6).min(MAX_RAMP_DT_S),
            None => 0.0,
        };
        self.last_tick_us = Some(now_us);

        let mut speed = libm::fabsf(self.speed);
        let stopping_distance = speed * speed / (2.0 * self.acceleration);

        if remaining.unsigned_abs() as f32 <= stopping_distance {
            speed -= self.acceleration * dt;
            self.phase = MotionPhase::Decelerating;
        } else {
            speed += self.acceleration * dt;
            self.phase = MotionPhase::Accelerating;
        }

        let speed = speed.clamp(self.min_speed(), self.max_speed);
        if self.phase == MotionPhase::Accelerating && speed >= self.max_speed {
            self.phase = MotionPhase::Cruising;
        }
        self.speed = match direction {
            Direction::Forward => speed,
            Direction::Reverse => -speed,
        };

        let interval_us = libm::roundf(1e6 / speed).max(1.0) as u64;
        let step_at = match self.last_step_us {
            Some(last) => {
                let due_at = last.saturating_add(interval_us);
                if now_us < due_at {
                    return Tick::Waiting;
                }
                // Carry this tick's lateness, at most one interval
                due_at.max(now_us.saturating_sub(interval_us))
            }
            None => now_us,
        };

        sink.step(direction);
        self.position += direction.step_delta();
        self.last_step_us = Some(step_at);

        Tick::Step(StepEvent {
            direction,
            position_steps: self.position,
            at_us: now_us,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::plan_move;
    use crate::testing::RecordingSink;
    use proptest::prelude::*;

    const MAX_SPEED: f32 = 3000.0;
    const ACCEL: f32 = 2000.0;

    /// Tick until the move completes, returning the completion time
    fn run_to_completion(
        gen: &mut StepGenerator,
        sink: &mut RecordingSink,
        start_us: u64,
        period_us: u64,
        max_ticks: u64,
    ) -> Option<u64> {
        for i in 0..max_ticks {
            let now = start_us + i * period_us;
            if gen.tick(now, sink) == Tick::Complete {
                return Some(now);
            }
        }
        None
    }

    #[test]
    fn test_initial_state() {
        let gen = StepGenerator::new(42, MAX_SPEED, ACCEL);
        assert_eq!(gen.position(), 42);
        assert_eq!(gen.target(), 42);
        assert_eq!(gen.speed(), 0.0);
        assert_eq!(gen.phase(), MotionPhase::Idle);
        assert!(!gen.is_moving());
    }

    #[test]
    fn test_idle_tick_emits_nothing() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        assert_eq!(gen.tick(0, &mut sink), Tick::Idle);
        assert_eq!(gen.tick(1000, &mut sink), Tick::Idle);
        assert_eq!(sink.forward_steps + sink.reverse_steps, 0);
    }

    #[test]
    fn test_first_tick_steps_immediately() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(10);

        match gen.tick(0, &mut sink) {
            Tick::Step(event) => {
                assert_eq!(event.direction, Direction::Forward);
                assert_eq!(event.position_steps, 1);
            }
            other => panic!("expected a step, got {other:?}"),
        }
        assert_eq!(gen.phase(), MotionPhase::Accelerating);
        assert!(gen.speed() > 0.0);
    }

    #[test]
    fn test_reverse_move_reaches_target() {
        let mut gen = StepGenerator::new(500, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(-500);

        assert!(run_to_completion(&mut gen, &mut sink, 0, 100, 1_000_000).is_some());
        assert_eq!(gen.position(), -500);
        assert_eq!(sink.reverse_steps, 1000);
        assert_eq!(sink.forward_steps, 0);
        assert_eq!(gen.phase(), MotionPhase::Idle);
        assert_eq!(gen.speed(), 0.0);
    }

    #[test]
    fn test_completion_reported_once() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(3);

        assert!(run_to_completion(&mut gen, &mut sink, 0, 1000, 10_000).is_some());
        assert_eq!(gen.tick(50_000_000, &mut sink), Tick::Idle);
        assert_eq!(gen.tick(50_001_000, &mut sink), Tick::Idle);
    }

    #[test]
    fn test_target_at_current_position_completes() {
        let mut gen = StepGenerator::new(7, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(7);
        assert!(gen.is_moving());
        assert_eq!(gen.tick(0, &mut sink), Tick::Complete);
        assert!(!gen.is_moving());
        assert_eq!(sink.forward_steps + sink.reverse_steps, 0);
    }

    #[test]
    fn test_full_travel_at_1ms_ticks() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(40_000);

        let mut last = gen.position();
        let mut completed = false;
        let mut done_us = 0;
        for i in 0..200_000u64 {
            let tick = gen.tick(i * 1000, &mut sink);
            let pos = gen.position();
            assert!(pos >= last, "position went backwards at tick {i}");
            assert!(pos - last <= 1, "more than one step in a tick");
            last = pos;
            if tick == Tick::Complete {
                completed = true;
                done_us = i * 1000;
                break;
            }
        }

        assert!(completed);
        assert_eq!(gen.position(), 40_000);
        assert_eq!(sink.forward_steps, 40_000);

        // One step per tick caps the rate at 1000 steps/s, so the move
        // takes at least 40 s instead of the planned 14.8 s
        let elapsed_s = done_us as f32 * 1e-6;
        assert!(elapsed_s >= 39.99, "{elapsed_s}");
        assert!(elapsed_s < 45.0, "{elapsed_s}");

        // Further ticks are no-ops
        for i in 0..100u64 {
            assert_eq!(gen.tick(300_000_000 + i * 1000, &mut sink), Tick::Idle);
        }
        assert_eq!(gen.position(), 40_000);
        assert_eq!(sink.forward_steps, 40_000);
    }

    /// Time a full 40000-step travel at a fixed tick period
    fn full_travel_s(period_us: u64) -> f32 {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(40_000);

        let max_ticks = 30_000_000 / period_us;
        let done_us = run_to_completion(&mut gen, &mut sink, 0, period_us, max_ticks)
            .expect("move did not finish");
        assert_eq!(sink.forward_steps, 40_000);
        done_us as f32 * 1e-6
    }

    #[test]
    fn test_full_travel_duration_tracks_estimate() {
        let estimate = plan_move(40_000, MAX_SPEED, ACCEL).total_time_s;
        assert!((estimate - 14.8333).abs() < 1e-3);

        // 100 µs and 70 µs do not divide the 333 µs cruise interval
        for period_us in [10, 50, 70, 100] {
            let elapsed_s = full_travel_s(period_us);
            let error = libm::fabsf(elapsed_s - estimate) / estimate;
            assert!(error < 0.03, "{period_us} µs: {elapsed_s} vs {estimate}");
        }
    }

    #[test]
    fn test_late_ticks_keep_cruise_rate() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(40_000);

        // Reach cruise, then count steps over one second of 100 µs ticks
        let mut now = 0;
        while gen.phase() != MotionPhase::Cruising {
            gen.tick(now, &mut sink);
            now += 100;
        }
        let start = sink.forward_steps;
        for _ in 0..10_000 {
            gen.tick(now, &mut sink);
            now += 100;
        }
        let steps = sink.forward_steps - start;
        assert!((2950..=3050).contains(&steps), "{steps} steps in 1 s");
    }

    #[test]
    fn test_decelerates_before_target() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(20_000);

        let mut saw_cruise = false;
        let mut saw_decel = false;
        for i in 0..3_000_000u64 {
            match gen.tick(i * 10, &mut sink) {
                Tick::Complete => break,
                _ => match gen.phase() {
                    MotionPhase::Cruising => saw_cruise = true,
                    MotionPhase::Decelerating => saw_decel = true,
                    _ => {}
                },
            }
        }
        assert!(saw_cruise);
        assert!(saw_decel);
        assert_eq!(gen.position(), 20_000);
    }

    #[test]
    fn test_stop_halts_without_deceleration() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(10_000);
        for i in 0..100_000u64 {
            gen.tick(i * 10, &mut sink);
        }
        assert!(gen.speed() > 0.0);

        gen.stop();
        let pos = gen.position();
        assert_eq!(gen.speed(), 0.0);
        assert_eq!(gen.target(), pos);
        assert_eq!(gen.phase(), MotionPhase::Stopped);
        assert_eq!(gen.tick(2_000_000, &mut sink), Tick::Idle);
        assert_eq!(gen.position(), pos);
        assert_eq!(gen.phase(), MotionPhase::Stopped);
    }

    #[test]
    fn test_reversal_resets_speed() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(10_000);
        for i in 0..50_000u64 {
            gen.tick(i * 10, &mut sink);
        }
        assert!(gen.speed() > 0.0);

        gen.set_target(-100);
        assert_eq!(gen.speed(), 0.0);
        let before = gen.position();
        gen.tick(600_000, &mut sink);
        assert!(gen.speed() < 0.0);
        assert_eq!(gen.position(), before - 1);
    }

    #[test]
    fn test_same_direction_retarget_keeps_speed() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(10_000);
        for i in 0..50_000u64 {
            gen.tick(i * 10, &mut sink);
        }
        let speed = gen.speed();
        gen.set_target(20_000);
        assert_eq!(gen.speed(), speed);
    }

    #[test]
    fn test_lowering_ceiling_clamps_speed() {
        let mut gen = StepGenerator::new(0, MAX_SPEED, ACCEL);
        let mut sink = RecordingSink::default();
        gen.set_target(-30_000);
        for i in 0..200_000u64 {
            gen.tick(i * 10, &mut sink);
        }
        assert!(gen.speed() < -1000.0);

        gen.set_max_speed(500.0);
        assert_eq!(gen.speed(), -500.0);
        gen.tick(2_000_010, &mut sink);
        assert!(libm::fabsf(gen.speed()) <= 500.0);
    }

    #[test]
    fn test_min_speed_never_exceeds_ceiling() {
        let gen = StepGenerator::new(0, 10.0, ACCEL);
        assert_eq!(gen.min_speed(), 10.0);
        let gen = StepGenerator::new(0, MAX_SPEED, 2000.0);
        assert!((gen.min_speed() - libm::sqrtf(4000.0)).abs() < 1e-3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_speed_ceiling_and_monotonic_approach(
            start in -1_000i32..1_000,
            target in -1_000i32..1_000,
            period_us in 20u64..2_000,
            max_speed in 500.0f32..4_000.0,
            accel in 100.0f32..5_000.0,
        ) {
            let mut gen = StepGenerator::new(start, max_speed, accel);
            let mut sink = RecordingSink::default();
            gen.set_target(target);

            let forward = target >= start;
            let mut last = start;
            let mut done = false;
            // 30 s of simulated time is far beyond the slowest case
            let max_ticks = 30_000_000 / period_us;
            for i in 0..max_ticks {
                let tick = gen.tick(i * period_us, &mut sink);
                prop_assert!(libm::fabsf(gen.speed()) <= max_speed);
                let pos = gen.position();
                if forward {
                    prop_assert!(pos >= last && pos <= target);
                } else {
                    prop_assert!(pos <= last && pos >= target);
                }
                last = pos;
                if tick == Tick::Complete {
                    done = true;
                    break;
                }
            }
            prop_assert!(done);
            prop_assert_eq!(gen.position(), target);
            prop_assert_eq!(sink.net_steps(), (target - start) as i64);
        }
    }
}
