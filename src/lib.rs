//! # printer-motion
//!
//! Configuration-driven 3D printer motion planning and thermal control with
//! embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Configuration-driven**: axes, limits, and heaters defined in TOML
//! - **Lookahead planner**: trapezoidal velocity profiles with jerk-limited
//!   junction speeds, reconciled across the queued moves
//! - **Bresenham interpolation**: synchronized multi-axis step emission with
//!   per-axis error bounded below one step
//! - **Bounded block queue**: preallocated ring, single producer / single
//!   consumer, backpressure instead of data loss
//! - **Safe heating**: PID or bang-bang regulation behind one interface,
//!   MINTEMP/MAXTEMP cutoffs, heating watchdog
//! - **embedded-hal 1.0**: `OutputPin` for STEP/DIR/ENABLE, `InputPin` for
//!   endstops, `DelayNs` for pulse timing
//! - **no_std compatible**: the core never allocates
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use printer_motion::{
//!     AxisStates, BlockQueue, EndstopSnapshot, MotionPlanner, StepInterpolator,
//! };
//! use printer_motion::config::UnitExt;
//!
//! let config = printer_motion::load_config("machine.toml")?;
//!
//! let mut planner = MotionPlanner::new(&config);
//! let mut queue: BlockQueue = BlockQueue::new();
//! let mut interpolator = StepInterpolator::new(&config);
//! let axes = AxisStates::new();
//!
//! // Foreground: feed moves, retrying on backpressure.
//! planner.plan_move(&mut queue, [10.0.mm(), 10.0.mm(), 0.0.mm(), 0.0.mm()],
//!                   50.0.mm_per_sec())?;
//!
//! // Step timer context: one tick per step event.
//! let result = interpolator.tick(&mut queue, &axes, &EndstopSnapshot::CLEAR,
//!                                &mut outputs)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod stepper;
pub mod thermal;

// Re-exports for ergonomic API
pub use config::{validate_config, Axis, MachineConfig, NUM_AXES};
pub use error::{Error, Result};
pub use motion::{BlockQueue, Direction, MotionBlock, MotionPlanner, StepInterpolator, TickResult};
pub use stepper::{AxisPins, AxisStates, Endstop, EndstopSnapshot, MotionOutputs};
pub use thermal::{ControlStrategy, Heater, HeaterState};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Celsius, Millimeters, MmPerSec, MmPerSecSquared, Steps};
