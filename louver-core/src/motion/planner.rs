//! Move duration estimates
//!
//! Closed-form timing for a move under a symmetric trapezoidal profile.
//! The estimate is advisory: it is logged when a move starts, while the
//! real step timing comes from [`super::StepGenerator`].

/// Shape of the velocity profile for a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileShape {
    /// Accelerate then decelerate, never reaching the speed ceiling
    Triangular,
    /// Accelerate, cruise at the speed ceiling, decelerate
    Trapezoidal,
}

/// Estimated duration of a move
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveEstimate {
    /// Total move time in seconds
    pub total_time_s: f32,
    /// Highest speed reached in steps/s
    pub peak_speed_steps_per_s: f32,
    /// Profile shape
    pub shape: ProfileShape,
}

/// Estimate the duration of a move of `delta_steps`
///
/// # Arguments
/// - `delta_steps`: Signed displacement; only the magnitude matters
/// - `max_speed`: Speed ceiling in steps/s
/// - `acceleration`: Acceleration in steps/s²
pub fn plan_move(delta_steps: i32, max_speed: f32, acceleration: f32) -> MoveEstimate {
    let distance = delta_steps.unsigned_abs() as f32;

    if distance == 0.0 || max_speed <= 0.0 || acceleration <= 0.0 {
        return MoveEstimate {
            total_time_s: 0.0,
            peak_speed_steps_per_s: 0.0,
            shape: ProfileShape::Triangular,
        };
    }

    let time_to_max = max_speed / acceleration;
    let steps_to_max = 0.5 * acceleration * time_to_max * time_to_max;

    if distance <= 2.0 * steps_to_max {
        let peak = libm::sqrtf(distance * acceleration);
        MoveEstimate {
            total_time_s: 2.0 * peak / acceleration,
            peak_speed_steps_per_s: peak,
            shape: ProfileShape::Triangular,
        }
    } else {
        let cruise_steps = distance - 2.0 * steps_to_max;
        MoveEstimate {
            total_time_s: 2.0 * time_to_max + cruise_steps / max_speed,
            peak_speed_steps_per_s: max_speed,
            shape: ProfileShape::Trapezoidal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_short_move_is_triangular() {
        let estimate = plan_move(4000, 3000.0, 2000.0);
        assert_eq!(estimate.shape, ProfileShape::Triangular);
        assert_close(estimate.peak_speed_steps_per_s, 2828.427);
        assert_close(estimate.total_time_s, 2.828427);
    }

    #[test]
    fn test_long_move_is_trapezoidal() {
        let estimate = plan_move(5000, 3000.0, 2000.0);
        assert_eq!(estimate.shape, ProfileShape::Trapezoidal);
        assert_close(estimate.peak_speed_steps_per_s, 3000.0);
        // 2 * 1.5 s ramps + 500 cruise steps at 3000 steps/s
        assert_close(estimate.total_time_s, 3.0 + 500.0 / 3000.0);
    }

    #[test]
    fn test_boundary_move_is_triangular() {
        // Exactly 2 * steps_to_max reaches the ceiling at the midpoint
        let estimate = plan_move(4500, 3000.0, 2000.0);
        assert_eq!(estimate.shape, ProfileShape::Triangular);
        assert_close(estimate.peak_speed_steps_per_s, 3000.0);
        assert_close(estimate.total_time_s, 3.0);
    }

    #[test]
    fn test_full_travel_estimate() {
        let estimate = plan_move(40_000, 3000.0, 2000.0);
        assert_eq!(estimate.shape, ProfileShape::Trapezoidal);
        assert_close(estimate.total_time_s, 3.0 + 35_500.0 / 3000.0);
    }

    #[test]
    fn test_direction_does_not_matter() {
        assert_eq!(
            plan_move(-5000, 3000.0, 2000.0),
            plan_move(5000, 3000.0, 2000.0)
        );
    }

    #[test]
    fn test_zero_move() {
        let estimate = plan_move(0, 3000.0, 2000.0);
        assert_eq!(estimate.total_time_s, 0.0);
        assert_eq!(estimate.peak_speed_steps_per_s, 0.0);
    }
}
