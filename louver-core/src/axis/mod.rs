//! Position state machine
//!
//! Owns the high-level motion intent of the vent axis: enable/disable,
//! manual moves, automatic oscillation between the soft limits, and the
//! rate-limited hand-off of position records to the durable store.

pub mod controller;
pub mod state;

pub use controller::{AxisController, AxisError, AxisEvent, JogDirection};
pub use state::{AxisState, AxisStatus};
