//! Louver Hardware Abstraction Layer
//!
//! Chip-agnostic traits shared by the core logic and the chip-specific
//! HALs. The core only ever talks to non-volatile storage through
//! [`FlashStorage`], so the same persistence code runs against the RP2040
//! flash partition on target and an in-memory map in host tests.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  louver-core / firmware      │
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │  louver-hal (this crate)     │
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │  louver-hal-rp2040           │
//! └──────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
