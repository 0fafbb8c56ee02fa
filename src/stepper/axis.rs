//! Per-axis runtime state.
//!
//! Executed positions are the authoritative machine coordinates, mutated
//! only by the interpolator as pulses are emitted. All fields are atomics so
//! status readers in other execution contexts never observe a torn value;
//! reads are eventually consistent at block boundaries, which is all the
//! planner needs.

use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::config::{Axis, Steps, NUM_AXES};
use crate::motion::Direction;

/// Runtime state for one axis.
#[derive(Debug, Default)]
pub struct AxisState {
    position_steps: AtomicI32,
    enabled: AtomicBool,
    dir_positive: AtomicBool,
}

impl AxisState {
    /// Executed position in steps.
    #[inline]
    pub fn position(&self) -> Steps {
        Steps(self.position_steps.load(Ordering::Acquire))
    }

    /// Overwrite the executed position (homing / halt recovery).
    #[inline]
    pub fn set_position(&self, steps: Steps) {
        self.position_steps.store(steps.0, Ordering::Release);
    }

    /// Advance the position by one emitted step.
    #[inline]
    pub(crate) fn apply_step(&self, direction: Direction) {
        self.position_steps
            .fetch_add(direction.sign(), Ordering::AcqRel);
    }

    /// Whether the motor driver is enabled.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Last commanded direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        if self.dir_positive.load(Ordering::Acquire) {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    #[inline]
    pub(crate) fn set_direction(&self, direction: Direction) {
        self.dir_positive
            .store(direction == Direction::Positive, Ordering::Release);
    }
}

/// Runtime state for all axes.
#[derive(Debug, Default)]
pub struct AxisStates {
    axes: [AxisState; NUM_AXES],
}

impl AxisStates {
    /// Create all-zero axis states.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of one axis.
    #[inline]
    pub fn axis(&self, axis: Axis) -> &AxisState {
        &self.axes[axis.index()]
    }

    /// Executed positions of all axes.
    pub fn positions(&self) -> [Steps; NUM_AXES] {
        let mut out = [Steps(0); NUM_AXES];
        for axis in Axis::ALL {
            out[axis.index()] = self.axis(axis).position();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_step_moves_position() {
        let states = AxisStates::new();
        let x = states.axis(Axis::X);

        x.apply_step(Direction::Positive);
        x.apply_step(Direction::Positive);
        x.apply_step(Direction::Negative);
        assert_eq!(x.position(), Steps(1));
    }

    #[test]
    fn test_direction_roundtrip() {
        let state = AxisState::default();
        state.set_direction(Direction::Negative);
        assert_eq!(state.direction(), Direction::Negative);
        state.set_direction(Direction::Positive);
        assert_eq!(state.direction(), Direction::Positive);
    }
}
