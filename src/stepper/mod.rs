//! Stepper output layer: axis runtime state, step/direction/enable outputs,
//! and endstop inputs.

mod axis;
mod endstop;
mod outputs;

pub use axis::{AxisState, AxisStates};
pub use endstop::{read_endstops, Endstop, EndstopSnapshot};
pub use outputs::{AxisPins, MachinePins, MotionOutputs};

#[cfg(test)]
pub(crate) use outputs::recording::RecordingOutputs;
