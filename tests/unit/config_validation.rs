//! Unit tests for configuration validation through the loader.

use printer_motion::error::{ConfigError, Error};
use printer_motion::parse_config;

const VALID: &str = r#"
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
fn valid_config_loads() {
    assert!(parse_config(VALID).is_ok());
}

#[test]
fn zero_steps_per_mm_is_fatal() {
    let toml = VALID.replace("steps_per_mm = 2560.0", "steps_per_mm = 0.0");
    assert!(matches!(
        parse_config(&toml),
        Err(Error::Config(ConfigError::InvalidStepsPerMm { .. }))
    ));
}

#[test]
fn negative_feedrate_is_fatal() {
    let toml = VALID.replace(
        "max_feedrate_mm_per_sec = 5.0",
        "max_feedrate_mm_per_sec = -5.0",
    );
    assert!(matches!(
        parse_config(&toml),
        Err(Error::Config(ConfigError::InvalidMaxFeedrate { .. }))
    ));
}

#[test]
fn inverted_soft_limits_are_fatal() {
    let toml = format!(
        "{}\n[axes.x.limits]\nmin_mm = 170.0\nmax_mm = 0.0\n",
        VALID
    );
    assert!(matches!(
        parse_config(&toml),
        Err(Error::Config(ConfigError::InvalidSoftLimits { .. }))
    ));
}

#[test]
fn mintemp_at_or_above_maxtemp_is_fatal() {
    let toml = VALID.replace("min_temp_c = 5.0", "min_temp_c = 275.0");
    assert!(matches!(
        parse_config(&toml),
        Err(Error::Config(ConfigError::InvalidTemperatureBounds { .. }))
    ));
}

#[test]
fn zero_watchdog_period_is_fatal() {
    let toml = format!("{}\n[heaters.hotend.watchdog]\nperiod_ms = 0\n", VALID);
    assert!(matches!(
        parse_config(&toml),
        Err(Error::Config(ConfigError::InvalidWatchdogPeriod))
    ));
}

#[test]
fn bad_pid_clamps_are_fatal() {
    let toml = VALID.replace("kd = 1.0", "kd = 1.0\nintegral_limit = -1.0");
    assert!(matches!(
        parse_config(&toml),
        Err(Error::Config(ConfigError::InvalidIntegralLimit(_)))
    ));

    let toml = VALID.replace("kd = 1.0", "kd = 1.0\noutput_max = 1.5");
    assert!(matches!(
        parse_config(&toml),
        Err(Error::Config(ConfigError::InvalidOutputMax(_)))
    ));
}
