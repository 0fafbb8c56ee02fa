//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::MachineConfig;

/// Load a machine configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
///
/// # Example
///
/// ```rust,ignore
/// use printer_motion::load_config;
///
/// let config = load_config("machine.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MachineConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse a machine configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<MachineConfig> {
    let config: MachineConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    // Fail fast: an unvalidated configuration never reaches the planner.
    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Axis, LimitPolicy};

    const MINIMAL: &str = r#"
[axes.x]
name = "X"
steps_per_mm = 80.0
max_feedrate_mm_per_sec = 300.0
max_acceleration_mm_per_sec2 = 500.0

[axes.y]
name = "Y"
steps_per_mm = 80.0
max_feedrate_mm_per_sec = 300.0
max_acceleration_mm_per_sec2 = 500.0

[axes.z]
name = "Z"
steps_per_mm = 2560.0
max_feedrate_mm_per_sec = 5.0
max_acceleration_mm_per_sec2 = 50.0

[axes.e]
name = "E"
steps_per_mm = 498.12
max_feedrate_mm_per_sec = 80.0
max_acceleration_mm_per_sec2 = 500.0

[heaters.hotend]
sample_interval_ms = 500
min_temp_c = 5.0
max_temp_c = 275.0

[heaters.hotend.control]
mode = "pid"
kp = 1.8
ki = 0.02
kd = 1.0
"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_config(MINIMAL).unwrap();
        assert!((config.axis(Axis::X).steps_per_mm - 80.0).abs() < 1e-6);
        assert!((config.axis(Axis::Z).steps_per_mm - 2560.0).abs() < 1e-3);
        // Defaults fill in the omitted sections.
        assert!((config.motion.acceleration.0 - 2000.0).abs() < 1e-6);
        assert!(config.endstops.pullups);
        assert!(config.heaters.bed.is_none());
    }

    #[test]
    fn test_parse_with_limits_and_bed() {
        let toml = format!(
            "{}\n{}",
            MINIMAL,
            r#"
[axes.x.limits]
min_mm = 0.0
max_mm = 170.0
policy = "clamp"

[heaters.bed]
sample_interval_ms = 5000
min_temp_c = 5.0
max_temp_c = 150.0

[heaters.bed.control]
mode = "bang_bang"
hysteresis_c = 2.0
"#
        );

        let config = parse_config(&toml).unwrap();
        let limits = config.axis(Axis::X).limits.as_ref().unwrap();
        assert_eq!(limits.policy, LimitPolicy::Clamp);
        assert!((limits.max.0 - 170.0).abs() < 1e-6);
        assert!(config.heaters.bed.is_some());
    }

    #[test]
    fn test_parse_rejects_invalid() {
        let toml = MINIMAL.replace("steps_per_mm = 80.0", "steps_per_mm = -80.0");
        assert!(parse_config(&toml).is_err());
    }
}
