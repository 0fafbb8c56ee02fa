//! Heater configuration.
//!
//! Each heater (hotend, bed) carries its own sampling cadence, safety bounds,
//! control strategy, and optional heating watchdog. The strategy is selected
//! here at load time; the thermal state machine never branches on which one
//! is in use.

use serde::Deserialize;

use super::units::Celsius;

/// Control strategy selection and tuning, from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ControlConfig {
    /// Closed-loop PID with clamped-integral anti-windup.
    Pid {
        /// Proportional gain (output fraction per °C of error).
        kp: f32,
        /// Integral gain (output fraction per °C·s of accumulated error).
        ki: f32,
        /// Derivative gain (output fraction per °C/s of error rate).
        kd: f32,
        /// Clamp on the accumulated integral term, in output units.
        #[serde(default = "default_integral_limit")]
        integral_limit: f32,
        /// Ceiling on the drive output, as a fraction of full power.
        #[serde(default = "default_output_max")]
        output_max: f32,
    },
    /// On/off control with hysteresis.
    BangBang {
        /// Half-width of the hysteresis band in °C.
        #[serde(rename = "hysteresis_c", default = "default_hysteresis")]
        hysteresis: Celsius,
    },
}

// PID_INTEGRAL_DRIVE_MAX / PID_MAX of the original electronics, as a fraction
// of full drive.
fn default_integral_limit() -> f32 {
    220.0 / 255.0
}

fn default_output_max() -> f32 {
    1.0
}

fn default_hysteresis() -> Celsius {
    Celsius(2.0)
}

/// When the heating watchdog re-arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum WatchdogPolicy {
    /// Re-arm whenever a command raises the target.
    #[default]
    RestartOnEachRaise,
    /// Arm only on the first raise of a heating episode; later raises while
    /// already heating do not reset the window.
    FirstRaiseOnly,
}

/// Heating watchdog configuration.
///
/// Protects against a disconnected or failed sensor falsely reporting no
/// change: if the measured temperature has not risen by `min_rise` within
/// `period_ms` of a target raise, the target is forced back to zero.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchdogConfig {
    /// Window after a target raise in which a rise must be observed.
    pub period_ms: u32,

    /// Minimum rise that counts as the heater responding.
    #[serde(rename = "min_rise_c", default = "default_min_rise")]
    pub min_rise: Celsius,

    /// Re-arm policy.
    #[serde(default)]
    pub policy: WatchdogPolicy,
}

fn default_min_rise() -> Celsius {
    Celsius(2.0)
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            period_ms: 5_000,
            min_rise: default_min_rise(),
            policy: WatchdogPolicy::default(),
        }
    }
}

/// Complete per-heater configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct HeaterConfig {
    /// Control loop sampling interval in milliseconds.
    pub sample_interval_ms: u32,

    /// Temperature below which the heater faults (thermistor short/failure
    /// protection).
    #[serde(rename = "min_temp_c")]
    pub min_temp: Celsius,

    /// Temperature above which the heater faults.
    #[serde(rename = "max_temp_c")]
    pub max_temp: Celsius,

    /// Band around the target within which the heater reports Regulating.
    #[serde(rename = "regulation_band_c", default = "default_regulation_band")]
    pub regulation_band: Celsius,

    /// Exponential smoothing window for noisy readings; `None` disables.
    /// A value of `n` averages roughly the last `n` samples.
    #[serde(default)]
    pub smoothing_samples: Option<u16>,

    /// Control strategy and tuning.
    pub control: ControlConfig,

    /// Optional heating watchdog.
    #[serde(default)]
    pub watchdog: Option<WatchdogConfig>,
}

fn default_regulation_band() -> Celsius {
    Celsius(3.0)
}

impl HeaterConfig {
    /// A hotend profile matching the original electronics: 500 ms checks,
    /// 5–275 °C safe window, PID drive.
    pub fn hotend_defaults() -> Self {
        Self {
            sample_interval_ms: 500,
            min_temp: Celsius(5.0),
            max_temp: Celsius(275.0),
            regulation_band: default_regulation_band(),
            smoothing_samples: None,
            control: ControlConfig::Pid {
                kp: 1.8,
                ki: 0.02,
                kd: 1.0,
                integral_limit: default_integral_limit(),
                output_max: default_output_max(),
            },
            watchdog: Some(WatchdogConfig::default()),
        }
    }

    /// A heated-bed profile: slow 5 s checks, bang-bang drive.
    pub fn bed_defaults() -> Self {
        Self {
            sample_interval_ms: 5_000,
            min_temp: Celsius(5.0),
            max_temp: Celsius(150.0),
            regulation_band: default_regulation_band(),
            smoothing_samples: None,
            control: ControlConfig::BangBang {
                hysteresis: default_hysteresis(),
            },
            watchdog: None,
        }
    }
}
