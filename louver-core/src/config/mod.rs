//! Configuration types
//!
//! Board-agnostic axis configuration. Pin mapping lives in the firmware;
//! everything the motion code needs to know is in [`AxisConfig`].

pub mod axis;

pub use axis::*;
