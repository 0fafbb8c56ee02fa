//! Configuration validation.
//!
//! A configuration that fails any check here must never start motion or
//! heating; callers treat the error as fatal at load.

use crate::error::{ConfigError, Error, Result};

use super::axis::{Axis, AxisConfig};
use super::heater::{ControlConfig, HeaterConfig};
use super::MachineConfig;

/// Validate a machine configuration.
///
/// Checks:
/// - Per-axis scales, feedrates, and accelerations are positive
/// - Soft limits are well-formed (min < max)
/// - Motion tunables (accelerations, jerk, minimum feedrate) are sane
/// - Heater temperature bounds, sampling cadence, and control tuning are sane
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    for axis in Axis::ALL {
        validate_axis(axis, config.axis(axis))?;
    }

    let motion = &config.motion;
    if motion.acceleration.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            motion.acceleration.0,
        )));
    }
    if motion.retract_acceleration.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            motion.retract_acceleration.0,
        )));
    }
    if motion.max_xy_jerk.0 < 0.0 {
        return Err(Error::Config(ConfigError::InvalidJerk(motion.max_xy_jerk.0)));
    }
    if motion.max_z_jerk.0 < 0.0 {
        return Err(Error::Config(ConfigError::InvalidJerk(motion.max_z_jerk.0)));
    }
    if motion.min_feedrate.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMinFeedrate(
            motion.min_feedrate.0,
        )));
    }

    validate_heater(&config.heaters.hotend)?;
    if let Some(bed) = &config.heaters.bed {
        validate_heater(bed)?;
    }

    Ok(())
}

fn validate_axis(axis: Axis, config: &AxisConfig) -> Result<()> {
    if config.steps_per_mm <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerMm {
            axis,
            value: config.steps_per_mm,
        }));
    }

    if config.max_feedrate.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxFeedrate {
            axis,
            value: config.max_feedrate.0,
        }));
    }

    if config.max_acceleration.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxAcceleration {
            axis,
            value: config.max_acceleration.0,
        }));
    }

    if let Some(ref limits) = config.limits {
        if !limits.is_valid() {
            return Err(Error::Config(ConfigError::InvalidSoftLimits {
                min: limits.min.0,
                max: limits.max.0,
            }));
        }
    }

    Ok(())
}

fn validate_heater(config: &HeaterConfig) -> Result<()> {
    if config.min_temp.0 >= config.max_temp.0 {
        return Err(Error::Config(ConfigError::InvalidTemperatureBounds {
            min: config.min_temp.0,
            max: config.max_temp.0,
        }));
    }

    if config.sample_interval_ms == 0 {
        return Err(Error::Config(ConfigError::InvalidSampleInterval));
    }

    if config.regulation_band.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidRegulationBand(
            config.regulation_band.0,
        )));
    }

    match &config.control {
        ControlConfig::Pid {
            integral_limit,
            output_max,
            ..
        } => {
            if *integral_limit <= 0.0 {
                return Err(Error::Config(ConfigError::InvalidIntegralLimit(
                    *integral_limit,
                )));
            }
            if *output_max <= 0.0 || *output_max > 1.0 {
                return Err(Error::Config(ConfigError::InvalidOutputMax(*output_max)));
            }
        }
        ControlConfig::BangBang { hysteresis } => {
            if hysteresis.0 < 0.0 {
                return Err(Error::Config(ConfigError::InvalidHysteresis(hysteresis.0)));
            }
        }
    }

    if let Some(watchdog) = &config.watchdog {
        if watchdog.period_ms == 0 {
            return Err(Error::Config(ConfigError::InvalidWatchdogPeriod));
        }
    }

    Ok(())
}
