//! Error types for printer-motion.
//!
//! Provides unified error handling across configuration, motion planning, and
//! step output. Thermal faults are modelled as heater *states*, not errors
//! (see [`crate::thermal::HeaterState`]); sensor failures surface through
//! [`crate::thermal::SensorError`].

use core::fmt;

use crate::config::Axis;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all printer-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error (fatal at load).
    Config(ConfigError),
    /// Motion planning error (recoverable; see variants).
    Planner(PlannerError),
    /// Step/direction/enable output error.
    Step(StepError),
    /// Internal invariant violation (fatal — indicates a defect, not a
    /// runtime condition; callers must halt motion rather than continue).
    Invariant(InvariantError),
}

/// Configuration-related errors.
///
/// Any of these is fatal at load time: the system must not start motion or
/// heating with an invalid configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Steps-per-mm must be > 0
    InvalidStepsPerMm {
        /// Offending axis
        axis: Axis,
        /// Configured value
        value: f32,
    },
    /// Per-axis max feedrate must be > 0
    InvalidMaxFeedrate {
        /// Offending axis
        axis: Axis,
        /// Configured value
        value: f32,
    },
    /// Per-axis max acceleration must be > 0
    InvalidMaxAcceleration {
        /// Offending axis
        axis: Axis,
        /// Configured value
        value: f32,
    },
    /// Cruise or retract acceleration must be > 0
    InvalidAcceleration(f32),
    /// Jerk limits must be >= 0
    InvalidJerk(f32),
    /// Minimum planned feedrate must be > 0
    InvalidMinFeedrate(f32),
    /// Invalid soft limits (min must be < max)
    InvalidSoftLimits {
        /// Minimum limit value in mm
        min: f32,
        /// Maximum limit value in mm
        max: f32,
    },
    /// MINTEMP must be below MAXTEMP
    InvalidTemperatureBounds {
        /// Configured minimum safe temperature
        min: f32,
        /// Configured maximum safe temperature
        max: f32,
    },
    /// Heater sampling interval must be > 0 ms
    InvalidSampleInterval,
    /// PID integral clamp must be > 0
    InvalidIntegralLimit(f32),
    /// PID output ceiling must be in (0, 1]
    InvalidOutputMax(f32),
    /// Bang-bang hysteresis must be >= 0
    InvalidHysteresis(f32),
    /// Regulation band must be > 0
    InvalidRegulationBand(f32),
    /// Watchdog period must be > 0 ms
    InvalidWatchdogPeriod,
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motion planning errors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlannerError {
    /// Block queue is full — backpressure. The move was not accepted and
    /// planner state is unchanged; the caller retries the identical request.
    QueueFull,
    /// Target exceeds soft limits and the axis policy is `Reject`.
    TargetOutOfBounds {
        /// Offending axis
        axis: Axis,
        /// Requested target in mm
        target: f32,
        /// Axis minimum in mm
        min: f32,
        /// Axis maximum in mm
        max: f32,
    },
}

/// Step output errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepError {
    /// A step/direction/enable pin operation failed.
    PinError,
}

/// Internal invariant violations.
///
/// These must never occur for a valid configuration and input; they indicate
/// a defect in this library or memory corruption, and the only safe response
/// is to halt motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvariantError {
    /// A block's per-axis step count exceeds its dominant-axis count.
    StepCountMismatch,
    /// A queue slot inside the live region was empty.
    QueueSlotEmpty,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Planner(e) => write!(f, "Planner error: {}", e),
            Error::Step(e) => write!(f, "Step output error: {}", e),
            Error::Invariant(e) => write!(f, "Invariant violation: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepsPerMm { axis, value } => {
                write!(f, "Invalid steps/mm for {:?}: {}. Must be > 0", axis, value)
            }
            ConfigError::InvalidMaxFeedrate { axis, value } => {
                write!(f, "Invalid max feedrate for {:?}: {}. Must be > 0", axis, value)
            }
            ConfigError::InvalidMaxAcceleration { axis, value } => {
                write!(f, "Invalid max acceleration for {:?}: {}. Must be > 0", axis, value)
            }
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidJerk(v) => write!(f, "Invalid jerk limit: {}. Must be >= 0", v),
            ConfigError::InvalidMinFeedrate(v) => {
                write!(f, "Invalid minimum feedrate: {}. Must be > 0", v)
            }
            ConfigError::InvalidSoftLimits { min, max } => {
                write!(f, "Invalid soft limits: min ({}) must be < max ({})", min, max)
            }
            ConfigError::InvalidTemperatureBounds { min, max } => {
                write!(f, "Invalid temperature bounds: min ({}) must be < max ({})", min, max)
            }
            ConfigError::InvalidSampleInterval => {
                write!(f, "Heater sample interval must be > 0 ms")
            }
            ConfigError::InvalidIntegralLimit(v) => {
                write!(f, "Invalid PID integral limit: {}. Must be > 0", v)
            }
            ConfigError::InvalidOutputMax(v) => {
                write!(f, "Invalid PID output max: {}. Must be in (0, 1]", v)
            }
            ConfigError::InvalidHysteresis(v) => {
                write!(f, "Invalid bang-bang hysteresis: {}. Must be >= 0", v)
            }
            ConfigError::InvalidRegulationBand(v) => {
                write!(f, "Invalid regulation band: {}. Must be > 0", v)
            }
            ConfigError::InvalidWatchdogPeriod => write!(f, "Watchdog period must be > 0 ms"),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::QueueFull => write!(f, "Block queue full — retry the move"),
            PlannerError::TargetOutOfBounds { axis, target, min, max } => {
                write!(
                    f,
                    "Target {} on {:?} exceeds travel limits [{}, {}]",
                    target, axis, min, max
                )
            }
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantError::StepCountMismatch => {
                write!(f, "Per-axis step count exceeds dominant-axis count")
            }
            InvariantError::QueueSlotEmpty => write!(f, "Live queue slot was empty"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<PlannerError> for Error {
    fn from(e: PlannerError) -> Self {
        Error::Planner(e)
    }
}

impl From<StepError> for Error {
    fn from(e: StepError) -> Self {
        Error::Step(e)
    }
}

impl From<InvariantError> for Error {
    fn from(e: InvariantError) -> Self {
        Error::Invariant(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for PlannerError {}

#[cfg(feature = "std")]
impl std::error::Error for StepError {}

#[cfg(feature = "std")]
impl std::error::Error for InvariantError {}
