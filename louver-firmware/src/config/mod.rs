//! Configuration loading and parsing
//!
//! The vent configuration is embedded at build time (vent.toml) and
//! parsed by a small no_std parser. Runtime tuning from flash is layered
//! on top.

pub mod toml;
pub mod tuning;

pub use toml::{parse_config, VentConfig};
pub use tuning::{load_tuning, save_tuning};
