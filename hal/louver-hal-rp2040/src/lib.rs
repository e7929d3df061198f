//! RP2040-specific HAL for the vent controller firmware
//!
//! Implements the shared `louver-hal` traits on the RP2040:
//!
//! - Flash storage driver (implements `louver_hal::FlashStorage`)
//!
//! Step output uses the embassy-rp GPIO drivers directly, through their
//! `embedded-hal` implementations.

#![no_std]

pub mod flash;

// Re-export shared traits from louver-hal for convenience
pub use louver_hal::{FlashStorage as FlashStorageTrait, StorageKey};
