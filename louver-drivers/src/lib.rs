//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in louver-core:
//!
//! - Step/direction/enable stepper drivers (A4988, DRV8825, TMC2209 in
//!   standalone mode)

#![no_std]
#![deny(unsafe_code)]

pub mod stepper;
