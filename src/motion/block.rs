//! Motion blocks — the unit of work between planner and interpolator.
//!
//! A block describes one linear move as per-axis step counts plus a
//! trapezoidal velocity profile over the dominant axis's step events.

use libm::{ceilf, sqrtf};

use crate::config::{Axis, NUM_AXES};

/// Direction of travel along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward increasing coordinates.
    #[default]
    Positive,
    /// Toward decreasing coordinates.
    Negative,
}

impl Direction {
    /// Get direction from a signed step delta.
    #[inline]
    pub fn from_delta(delta: i32) -> Self {
        if delta >= 0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }
}

/// One planned linear move.
///
/// Speeds are in mm/s along the move vector; phase boundaries are indices
/// into the dominant axis's step events. Invariant:
/// `accelerate_until <= decelerate_after <= step_event_count`, so the three
/// phases always sum exactly to `step_event_count`.
#[derive(Debug, Clone, Copy)]
pub struct MotionBlock {
    /// Unsigned step count per axis.
    pub steps: [u32; NUM_AXES],

    /// Direction bit per axis, fixed for the whole block.
    pub directions: [Direction; NUM_AXES],

    /// Step count of the dominant axis — the number of step events the
    /// interpolator emits for this block.
    pub step_event_count: u32,

    /// Length of the move vector in mm.
    pub distance_mm: f32,

    /// Signed unit direction vector in mm space.
    pub unit: [f32; NUM_AXES],

    /// Speed entering the block, mm/s.
    pub entry_speed: f32,

    /// Cruise speed, mm/s.
    pub nominal_speed: f32,

    /// Speed leaving the block, mm/s.
    pub exit_speed: f32,

    /// Junction ceiling on `entry_speed` from jerk limiting; lookahead
    /// reconciliation may plan any entry at or below this.
    pub max_entry_speed: f32,

    /// Acceleration used for this block, mm/s².
    pub acceleration: f32,

    /// Step event index where acceleration ends.
    pub accelerate_until: u32,

    /// Step event index where deceleration begins.
    pub decelerate_after: u32,

    /// Whether the cruise phase actually reaches `nominal_speed`; false for
    /// triangle profiles.
    pub nominal_reached: bool,

    /// True when only the extruder moves (retract/prime).
    pub extruder_only: bool,

    /// Hint that the thermal tick may skip while this block executes.
    pub suppress_thermal_hint: bool,
}

impl MotionBlock {
    /// Step events per mm of travel for this block.
    #[inline]
    pub fn events_per_mm(&self) -> f32 {
        self.step_event_count as f32 / self.distance_mm
    }

    /// Dominant axis of this block.
    pub fn dominant_axis(&self) -> Axis {
        let mut dominant = Axis::X;
        for axis in Axis::ALL {
            if self.steps[axis.index()] > self.steps[dominant.index()] {
                dominant = axis;
            }
        }
        dominant
    }

    /// Estimated execution time in milliseconds (cruise-speed approximation,
    /// used only for the thermal suppression hint).
    pub fn estimated_duration_ms(&self) -> u32 {
        if self.nominal_speed <= 0.0 {
            return u32::MAX;
        }
        (self.distance_mm / self.nominal_speed * 1000.0) as u32
    }

    /// Recompute the trapezoid phase boundaries from the current
    /// `entry_speed`, `nominal_speed`, and `exit_speed`.
    ///
    /// If accelerate and decelerate phases together would overrun the block,
    /// the profile degrades to a triangle: a reduced peak speed is chosen so
    /// both ramps meet exactly within `step_event_count`.
    pub fn compute_trapezoid(&mut self) {
        let k = self.events_per_mm();
        let accel = self.acceleration;

        let accel_events = ceilf(
            acceleration_distance(self.entry_speed, self.nominal_speed, accel) * k,
        ) as i64;
        let decel_events = ceilf(
            acceleration_distance(self.exit_speed, self.nominal_speed, accel) * k,
        ) as i64;
        let total = self.step_event_count as i64;

        let mut accel_events = accel_events.max(0);
        let mut decel_events = decel_events.max(0);

        if accel_events + decel_events > total {
            // Triangle: find where the ramps intersect.
            let meet_mm = intersection_distance(
                self.entry_speed,
                self.exit_speed,
                accel,
                self.distance_mm,
            );
            accel_events = (ceilf(meet_mm * k) as i64).clamp(0, total);
            decel_events = total - accel_events;
            self.nominal_reached = false;
        } else {
            self.nominal_reached = accel_events + decel_events < total;
        }

        self.accelerate_until = accel_events as u32;
        self.decelerate_after = (total - decel_events) as u32;

        debug_assert!(self.accelerate_until <= self.decelerate_after);
        debug_assert!(self.decelerate_after <= self.step_event_count);
    }
}

/// Distance needed to change speed from `initial` to `target` at `accel`,
/// in mm. `v² = v₀² + 2·a·d`, solved for d.
#[inline]
pub(crate) fn acceleration_distance(initial: f32, target: f32, accel: f32) -> f32 {
    if accel <= 0.0 {
        return 0.0;
    }
    ((target * target) - (initial * initial)) / (2.0 * accel)
}

/// Distance from block start at which an acceleration ramp from
/// `entry` meets a deceleration ramp down to `exit`, for a block of length
/// `distance`: `(2·a·d + v_exit² − v_entry²) / (4·a)`.
#[inline]
pub(crate) fn intersection_distance(entry: f32, exit: f32, accel: f32, distance: f32) -> f32 {
    if accel <= 0.0 {
        return 0.0;
    }
    (2.0 * accel * distance + exit * exit - entry * entry) / (4.0 * accel)
}

/// Highest speed reachable over `distance` when arriving at `target_speed`,
/// decelerating at `accel`: `sqrt(v_target² + 2·a·d)`.
#[inline]
pub(crate) fn max_allowable_speed(accel: f32, target_speed: f32, distance: f32) -> f32 {
    sqrtf(target_speed * target_speed + 2.0 * accel * distance)
}
