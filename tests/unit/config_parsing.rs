//! Unit tests for TOML configuration parsing.

use printer_motion::config::{Axis, ControlConfig, LimitPolicy, WatchdogPolicy};
use printer_motion::parse_config;

const BASE_AXES: &str = r#"
[axes.x]
name = "X"
steps_per_mm = 52.913851
max_feedrate_mm_per_sec = 300.0
max_acceleration_mm_per_sec2 = 500.0
invert_enable = true

[axes.y]
name = "Y"
steps_per_mm = 52.913851
max_feedrate_mm_per_sec = 300.0
max_acceleration_mm_per_sec2 = 500.0
invert_direction = true
invert_enable = true

[axes.z]
name = "Z"
steps_per_mm = 2560.0
max_feedrate_mm_per_sec = 5.0
max_acceleration_mm_per_sec2 = 50.0
invert_enable = true
disable_when_idle = true

[axes.e]
name = "E"
steps_per_mm = 498.120047
max_feedrate_mm_per_sec = 80.0
max_acceleration_mm_per_sec2 = 500.0
invert_direction = true
invert_enable = true
"#;

const HOTEND: &str = r#"
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
fn parse_axes_with_flags() {
    let toml = format!("{}{}", BASE_AXES, HOTEND);
    let config = parse_config(&toml).unwrap();

    assert_eq!(config.axis(Axis::X).name.as_str(), "X");
    assert!((config.axis(Axis::X).steps_per_mm - 52.913851).abs() < 1e-4);
    assert!(!config.axis(Axis::X).invert_direction);
    assert!(config.axis(Axis::Y).invert_direction);
    assert!(config.axis(Axis::Z).disable_when_idle);
    assert!(config.axis(Axis::E).invert_enable);
}

#[test]
fn parse_limit_policies() {
    for (policy_str, expected) in [("clamp", LimitPolicy::Clamp), ("reject", LimitPolicy::Reject)] {
        let toml = format!(
            "{}{}\n[axes.x.limits]\nmin_mm = 0.0\nmax_mm = 170.0\npolicy = \"{}\"\n",
            BASE_AXES, HOTEND, policy_str
        );
        let config = parse_config(&toml).unwrap();
        let limits = config.axis(Axis::X).limits.as_ref().unwrap();
        assert_eq!(limits.policy, expected);
    }
}

#[test]
fn parse_motion_defaults_and_overrides() {
    let toml = format!("{}{}", BASE_AXES, HOTEND);
    let config = parse_config(&toml).unwrap();
    // Omitted [motion] falls back to the stock tuning.
    assert!((config.motion.acceleration.0 - 2000.0).abs() < 1e-6);
    assert!((config.motion.retract_acceleration.0 - 7000.0).abs() < 1e-6);
    assert!((config.motion.max_xy_jerk.0 - 20.0).abs() < 1e-6);

    let toml = format!(
        "{}{}\n[motion]\nacceleration_mm_per_sec2 = 1500.0\nretract_acceleration_mm_per_sec2 = 5000.0\nmax_xy_jerk_mm_per_sec = 15.0\nmax_z_jerk_mm_per_sec = 0.4\n",
        BASE_AXES, HOTEND
    );
    let config = parse_config(&toml).unwrap();
    assert!((config.motion.acceleration.0 - 1500.0).abs() < 1e-6);
    assert!((config.motion.max_xy_jerk.0 - 15.0).abs() < 1e-6);
}

#[test]
fn parse_pid_control_with_defaults() {
    let toml = format!("{}{}", BASE_AXES, HOTEND);
    let config = parse_config(&toml).unwrap();

    match &config.heaters.hotend.control {
        ControlConfig::Pid {
            kp,
            ki,
            kd,
            integral_limit,
            output_max,
        } => {
            assert!((kp - 1.8).abs() < 1e-6);
            assert!((ki - 0.02).abs() < 1e-6);
            assert!((kd - 1.0).abs() < 1e-6);
            // Defaults: integral drive clamp 220/255, full output.
            assert!((integral_limit - 220.0 / 255.0).abs() < 1e-6);
            assert!((output_max - 1.0).abs() < 1e-6);
        }
        other => panic!("expected PID control, got {:?}", other),
    }
}

#[test]
fn parse_watchdog_policies() {
    for (policy_str, expected) in [
        ("restart_on_each_raise", WatchdogPolicy::RestartOnEachRaise),
        ("first_raise_only", WatchdogPolicy::FirstRaiseOnly),
    ] {
        let toml = format!(
            "{}{}\n[heaters.hotend.watchdog]\nperiod_ms = 5000\npolicy = \"{}\"\n",
            BASE_AXES, HOTEND, policy_str
        );
        let config = parse_config(&toml).unwrap();
        let watchdog = config.heaters.hotend.watchdog.as_ref().unwrap();
        assert_eq!(watchdog.policy, expected);
        assert_eq!(watchdog.period_ms, 5000);
        // min_rise default
        assert!((watchdog.min_rise.0 - 2.0).abs() < 1e-6);
    }
}

#[test]
fn parse_rejects_garbage() {
    assert!(parse_config("not toml at all [").is_err());
    assert!(parse_config("[axes.x]\nname = \"X\"\n").is_err());
}
