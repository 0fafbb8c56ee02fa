//! Machine configuration — root configuration structure and derived
//! planner constraints.

use serde::Deserialize;

use super::axis::{Axis, AxisConfig, NUM_AXES};
use super::heater::HeaterConfig;
use super::limits::StepLimits;
use super::units::{MmPerSec, MmPerSecSquared};

/// The four axis configurations, named as in the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct AxesConfig {
    /// X carriage.
    pub x: AxisConfig,
    /// Y carriage.
    pub y: AxisConfig,
    /// Z axis.
    pub z: AxisConfig,
    /// Extruder.
    pub e: AxisConfig,
}

impl AxesConfig {
    /// Get an axis configuration by axis.
    pub fn axis(&self, axis: Axis) -> &AxisConfig {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::E => &self.e,
        }
    }
}

/// Machine-wide motion tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct MotionSettings {
    /// Cruise acceleration for coordinated moves, mm/s².
    #[serde(rename = "acceleration_mm_per_sec2")]
    pub acceleration: MmPerSecSquared,

    /// Acceleration for extruder-only moves (retracts), mm/s².
    #[serde(rename = "retract_acceleration_mm_per_sec2")]
    pub retract_acceleration: MmPerSecSquared,

    /// Maximum instantaneous velocity change at a junction, applied jointly
    /// to the X/Y plane, mm/s.
    #[serde(rename = "max_xy_jerk_mm_per_sec")]
    pub max_xy_jerk: MmPerSec,

    /// Maximum instantaneous velocity change on Z at a junction, mm/s.
    #[serde(rename = "max_z_jerk_mm_per_sec")]
    pub max_z_jerk: MmPerSec,

    /// Floor for planned junction and exit speeds, mm/s. Keeps the step
    /// timing math away from zero rates.
    #[serde(rename = "min_feedrate_mm_per_sec", default = "default_min_feedrate")]
    pub min_feedrate: MmPerSec,

    /// Travel moves estimated to finish within this many milliseconds hint
    /// the thermal tick to stay off the bus (scheduling hint only).
    #[serde(default)]
    pub travel_check_suppression_ms: Option<u32>,
}

fn default_min_feedrate() -> MmPerSec {
    MmPerSec(0.2)
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            acceleration: MmPerSecSquared(2000.0),
            retract_acceleration: MmPerSecSquared(7000.0),
            max_xy_jerk: MmPerSec(20.0),
            max_z_jerk: MmPerSec(0.4),
            min_feedrate: default_min_feedrate(),
            travel_check_suppression_ms: Some(1_000),
        }
    }
}

/// Heater set: hotend always present, bed optional.
#[derive(Debug, Clone, Deserialize)]
pub struct HeaterSet {
    /// Hotend heater.
    pub hotend: HeaterConfig,
    /// Heated bed, if fitted.
    #[serde(default)]
    pub bed: Option<HeaterConfig>,
}

/// Endstop wiring options.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EndstopSettings {
    /// Enable internal pull-ups on endstop inputs (mechanical switches wired
    /// between signal and ground need these). Applied by the HAL layer when
    /// constructing the input pins.
    #[serde(default = "default_true")]
    pub pullups: bool,

    /// Invert the electrical sense of all endstop inputs.
    #[serde(default)]
    pub inverting: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EndstopSettings {
    fn default() -> Self {
        Self {
            pullups: true,
            inverting: false,
        }
    }
}

/// Root configuration structure from TOML.
///
/// Immutable after load: validated once by
/// [`validate_config`](super::validate_config), then only read. There is no
/// mutation API; the step-timing path never coordinates with configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Per-axis configurations.
    pub axes: AxesConfig,

    /// Machine-wide motion tunables.
    #[serde(default)]
    pub motion: MotionSettings,

    /// Heater configurations.
    pub heaters: HeaterSet,

    /// Endstop wiring.
    #[serde(default)]
    pub endstops: EndstopSettings,
}

impl MachineConfig {
    /// Get an axis configuration by axis.
    #[inline]
    pub fn axis(&self, axis: Axis) -> &AxisConfig {
        self.axes.axis(axis)
    }
}

/// Derived per-axis parameters computed once from a validated
/// [`MachineConfig`] and used for all motion planning.
#[derive(Debug, Clone)]
pub struct PlannerConstraints {
    /// Steps per mm, per axis.
    pub steps_per_mm: [f32; NUM_AXES],

    /// Maximum feedrate in mm/s, per axis.
    pub max_feedrate: [f32; NUM_AXES],

    /// Maximum acceleration in mm/s², per axis.
    pub max_acceleration: [f32; NUM_AXES],

    /// Soft limits in steps, per axis (if configured).
    pub step_limits: [Option<StepLimits>; NUM_AXES],

    /// Cruise acceleration, mm/s².
    pub acceleration: f32,

    /// Extruder-only acceleration, mm/s².
    pub retract_acceleration: f32,

    /// Joint X/Y junction jerk limit, mm/s.
    pub max_xy_jerk: f32,

    /// Z junction jerk limit, mm/s.
    pub max_z_jerk: f32,

    /// Floor for planned speeds, mm/s.
    pub min_feedrate: f32,

    /// Travel-move thermal suppression window, ms.
    pub travel_check_suppression_ms: Option<u32>,
}

impl PlannerConstraints {
    /// Compute planner constraints from a validated configuration.
    pub fn from_config(config: &MachineConfig) -> Self {
        let mut steps_per_mm = [0.0; NUM_AXES];
        let mut max_feedrate = [0.0; NUM_AXES];
        let mut max_acceleration = [0.0; NUM_AXES];
        let mut step_limits = [None; NUM_AXES];

        for axis in Axis::ALL {
            let ac = config.axis(axis);
            let i = axis.index();
            steps_per_mm[i] = ac.steps_per_mm;
            max_feedrate[i] = ac.max_feedrate.0;
            max_acceleration[i] = ac.max_acceleration.0;
            step_limits[i] = ac
                .limits
                .as_ref()
                .map(|l| StepLimits::from_soft_limits(l, ac.steps_per_mm));
        }

        Self {
            steps_per_mm,
            max_feedrate,
            max_acceleration,
            step_limits,
            acceleration: config.motion.acceleration.0,
            retract_acceleration: config.motion.retract_acceleration.0,
            max_xy_jerk: config.motion.max_xy_jerk.0,
            max_z_jerk: config.motion.max_z_jerk.0,
            min_feedrate: config.motion.min_feedrate.0,
            travel_check_suppression_ms: config.motion.travel_check_suppression_ms,
        }
    }
}
