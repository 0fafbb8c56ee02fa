//! Per-axis configuration.

use heapless::String;
use serde::Deserialize;

use super::limits::SoftLimits;
use super::units::{MmPerSec, MmPerSecSquared};

/// Number of motion axes (X, Y, Z, E — the order of every per-axis array).
pub const NUM_AXES: usize = 4;

/// Motion axis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// X carriage.
    X,
    /// Y carriage.
    Y,
    /// Z axis (vertical).
    Z,
    /// Extruder.
    E,
}

impl Axis {
    /// All axes in array order.
    pub const ALL: [Axis; NUM_AXES] = [Axis::X, Axis::Y, Axis::Z, Axis::E];

    /// Index into per-axis arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::E => 3,
        }
    }

    /// Whether this axis lies in the XY plane (shares the planar jerk limit).
    #[inline]
    pub const fn is_planar(self) -> bool {
        matches!(self, Axis::X | Axis::Y)
    }
}

/// Complete per-axis configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Conversion factor from millimeters to motor steps.
    pub steps_per_mm: f32,

    /// Maximum feedrate in mm per second.
    #[serde(rename = "max_feedrate_mm_per_sec")]
    pub max_feedrate: MmPerSec,

    /// Maximum acceleration in mm per second squared.
    #[serde(rename = "max_acceleration_mm_per_sec2")]
    pub max_acceleration: MmPerSecSquared,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Enable pin is active low.
    #[serde(default)]
    pub invert_enable: bool,

    /// Disable the motor driver whenever the queue drains.
    #[serde(default)]
    pub disable_when_idle: bool,

    /// Optional software travel limits.
    #[serde(default)]
    pub limits: Option<SoftLimits>,
}
