//! Minimal TOML parser for the vent configuration
//!
//! Handles only the subset vent.toml uses. It does NOT support the full
//! TOML spec.
//!
//! Supported:
//! - `[axis]` and `[driver]` section headers
//! - key = value pairs (integer, float, boolean)
//! - Comments (# ...), whole-line and trailing
//!
//! Unknown keys are ignored so older firmware accepts newer files.

use louver_core::config::AxisConfig;
use louver_drivers::stepper::PulseConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value does not parse as the key's type
    InvalidValue,
}

/// Everything vent.toml configures
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VentConfig {
    /// Axis geometry, motion limits and persistence policy
    pub axis: AxisConfig,
    /// Step pulse timing and pin polarity
    pub driver: PulseConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Axis,
    Driver,
}

/// Parse vent.toml into a [`VentConfig`]
///
/// Keys missing from the file keep their defaults. The result is not
/// validated; callers run [`AxisConfig::validate`].
pub fn parse_config(input: &str) -> Result<VentConfig, ParseError> {
    let mut config = VentConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header.strip_suffix(']').ok_or(ParseError::InvalidSection)?;
            section = match header.trim() {
                "axis" => Section::Axis,
                "driver" => Section::Driver,
                _ => return Err(ParseError::InvalidSection),
            };
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        match section {
            Section::Axis => apply_axis(&mut config.axis, key, value)?,
            Section::Driver => apply_driver(&mut config.driver, key, value)?,
            Section::Root => {} // Nothing lives at the root
        }
    }

    Ok(config)
}

fn apply_axis(axis: &mut AxisConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "full_steps_per_rev" => axis.full_steps_per_rev = parse_int(value)?,
        "microsteps" => axis.microsteps = parse_int(value)?,
        "lead_screw_pitch_mm" => axis.lead_screw_pitch_mm = parse_float(value)?,
        "max_speed_steps_per_s" => axis.max_speed_steps_per_s = parse_float(value)?,
        "acceleration_steps_per_s2" => axis.acceleration_steps_per_s2 = parse_float(value)?,
        "soft_limit_min_mm" => axis.soft_limit_min_mm = parse_float(value)?,
        "soft_limit_max_mm" => axis.soft_limit_max_mm = parse_float(value)?,
        "hysteresis_steps" => axis.hysteresis_steps = parse_int(value)?,
        "persist_interval_ms" => axis.persist_interval_ms = parse_int(value)?,
        "jog_steps" => axis.jog_steps = parse_int(value)?,
        _ => {} // Ignore unknown keys
    }
    Ok(())
}

fn apply_driver(driver: &mut PulseConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "step_pulse_ns" => driver.step_pulse_ns = parse_int(value)?,
        "dir_setup_ns" => driver.dir_setup_ns = parse_int(value)?,
        "invert_dir" => driver.invert_dir = parse_bool(value)?,
        "enable_active_low" => driver.enable_active_low = parse_bool(value)?,
        _ => {}
    }
    Ok(())
}

/// Drop a trailing `# comment`
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a float value; integers are accepted as well
fn parse_float(value: &str) -> Result<f32, ParseError> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}
