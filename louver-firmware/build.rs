//! Build script for louver-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates vent.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys of the [axis] table and whether they hold a float
const AXIS_KEYS: &[(&str, bool)] = &[
    ("full_steps_per_rev", false),
    ("microsteps", false),
    ("lead_screw_pitch_mm", true),
    ("max_speed_steps_per_s", true),
    ("acceleration_steps_per_s2", true),
    ("soft_limit_min_mm", true),
    ("soft_limit_max_mm", true),
    ("hysteresis_steps", false),
    ("persist_interval_ms", false),
    ("jog_steps", false),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate vent.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=vent.toml");

    let config_path = Path::new("vent.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read vent.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in vent.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_axis(&config, &mut errors);
    validate_driver(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in vent.toml", &errors);
    }

    println!("cargo:warning=vent.toml validated successfully");
}

fn validate_axis(config: &toml::Value, errors: &mut Vec<String>) {
    let axis = match config.get("axis") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[axis] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [axis] section".to_string());
            return;
        }
    };

    for &(key, is_float) in AXIS_KEYS {
        match (axis.get(key), is_float) {
            (None, _) => errors.push(format!("[axis] missing '{}'", key)),
            (Some(toml::Value::Integer(v)), false) if *v < 0 => {
                errors.push(format!("[axis] '{}' must not be negative", key))
            }
            (Some(toml::Value::Integer(_)), false) => {}
            (Some(toml::Value::Float(_)), true) | (Some(toml::Value::Integer(_)), true) => {}
            (Some(_), true) => errors.push(format!("[axis] '{}' must be a number", key)),
            (Some(_), false) => errors.push(format!("[axis] '{}' must be an integer", key)),
        }
    }

    for key in ["full_steps_per_rev", "microsteps", "persist_interval_ms"] {
        if let Some(0) = axis.get(key).and_then(toml::Value::as_integer) {
            errors.push(format!("[axis] '{}' must be greater than 0", key));
        }
    }

    for key in [
        "lead_screw_pitch_mm",
        "max_speed_steps_per_s",
        "acceleration_steps_per_s2",
    ] {
        if let Some(v) = axis.get(key).and_then(number) {
            if v <= 0.0 {
                errors.push(format!("[axis] '{}' must be greater than 0", key));
            }
        }
    }

    let min = axis.get("soft_limit_min_mm").and_then(number);
    let max = axis.get("soft_limit_max_mm").and_then(number);
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            errors.push("[axis] soft_limit_min_mm must not exceed soft_limit_max_mm".to_string());
        }
    }
}

fn validate_driver(config: &toml::Value, errors: &mut Vec<String>) {
    // [driver] is optional, defaults apply when absent
    let driver = match config.get("driver") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[driver] must be a table".to_string());
            return;
        }
        None => return,
    };

    for key in ["step_pulse_ns", "dir_setup_ns"] {
        match driver.get(key) {
            None => {}
            Some(toml::Value::Integer(v)) if (0..=u32::MAX as i64).contains(v) => {}
            Some(_) => errors.push(format!(
                "[driver] '{}' must be an integer in 0..=4294967295",
                key
            )),
        }
    }
    for key in ["invert_dir", "enable_active_low"] {
        match driver.get(key) {
            None | Some(toml::Value::Boolean(_)) => {}
            Some(_) => errors.push(format!("[driver] '{}' must be true or false", key)),
        }
    }
}

fn number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Float(v) => Some(*v),
        toml::Value::Integer(v) => Some(*v as f64),
        _ => None,
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.len() > 62 {
                    format!("{}...", &line[..59])
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
