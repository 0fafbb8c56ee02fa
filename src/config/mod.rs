//! Configuration module for printer-motion.
//!
//! Provides types for loading and validating the machine configuration from
//! TOML files (with the `std` feature) or pre-parsed data. The configuration
//! is immutable after load: validated once, then only read.

mod axis;
mod heater;
mod limits;
#[cfg(feature = "std")]
mod loader;
mod machine;
pub mod units;
mod validation;

pub use axis::{Axis, AxisConfig, NUM_AXES};
pub use heater::{ControlConfig, HeaterConfig, WatchdogConfig, WatchdogPolicy};
pub use limits::{LimitPolicy, SoftLimits, StepLimits};
pub use machine::{
    AxesConfig, EndstopSettings, HeaterSet, MachineConfig, MotionSettings, PlannerConstraints,
};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Celsius, Millimeters, MmPerSec, MmPerSecSquared, Steps, UnitExt};
