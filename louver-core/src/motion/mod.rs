//! Motion planning
//!
//! Move-time estimates and the tick-driven step generator that shapes
//! every move into an accelerate / cruise / decelerate profile.

pub mod planner;
pub mod profile;

pub use planner::{plan_move, MoveEstimate, ProfileShape};
pub use profile::{MotionPhase, StepEvent, StepGenerator, Tick};
