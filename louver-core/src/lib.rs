//! Board-agnostic core logic for the vent controller firmware
//!
//! This crate contains everything that does not depend on a specific
//! board:
//!
//! - Axis configuration and unit conversion
//! - Step pulse sink trait (the only hardware seam on the hot path)
//! - Motion planning: move estimates and the tick-driven step generator
//! - The position state machine (enable, manual moves, auto-oscillation)
//! - Power-loss-safe position persistence
//!
//! Everything here is synchronous and single-owner. The firmware keeps
//! one [`axis::AxisController`] in its control task and calls
//! [`axis::AxisController::on_tick`] as often as it can.

#![no_std]
#![deny(unsafe_code)]

pub mod axis;
pub mod config;
pub mod motion;
pub mod persist;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
