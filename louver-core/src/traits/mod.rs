//! Hardware abstraction traits
//!
//! These traits define the interface between the motion logic and the
//! board-specific output stage.

pub mod stepper;

pub use stepper::{Direction, StepPulseSink};
