//! Motion planning — converts move requests into queued motion blocks.
//!
//! The planner owns the *planned* position (where the machine will be once
//! the queue drains), derives per-axis step deltas by rounding the absolute
//! target position, clamps the requested feedrate against per-axis limits,
//! caps junction speeds against the jerk limits, and reconciles entry/exit
//! speeds across the queued, not-yet-started blocks.

use libm::{fabsf, sqrtf};

use crate::config::{Axis, MachineConfig, Millimeters, MmPerSec, PlannerConstraints, NUM_AXES};
use crate::error::{Error, InvariantError, Result};

use super::block::{max_allowable_speed, Direction, MotionBlock};
use super::queue::BlockQueue;

/// Motion planner: single producer for the block queue.
#[derive(Debug, Clone)]
pub struct MotionPlanner {
    constraints: PlannerConstraints,

    /// Planned position in whole steps. Always `round(target × steps_per_mm)`
    /// of the absolute target, so rounding error never accumulates: lifetime
    /// drift stays below one step per axis.
    planned_steps: [i32; NUM_AXES],

    /// Planned position in mm (carries the sub-step residual).
    planned_mm: [f32; NUM_AXES],

    /// Unit vector of the most recently planned move, for junction limiting.
    prev_unit: [f32; NUM_AXES],

    /// Nominal speed of the most recently planned move.
    prev_nominal: f32,
}

impl MotionPlanner {
    /// Create a planner from a validated configuration, positioned at origin.
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            constraints: PlannerConstraints::from_config(config),
            planned_steps: [0; NUM_AXES],
            planned_mm: [0.0; NUM_AXES],
            prev_unit: [0.0; NUM_AXES],
            prev_nominal: 0.0,
        }
    }

    /// The derived planning constraints.
    #[inline]
    pub fn constraints(&self) -> &PlannerConstraints {
        &self.constraints
    }

    /// Planned position per axis (where the machine will be once the queue
    /// drains), in mm.
    pub fn planned_position(&self) -> [Millimeters; NUM_AXES] {
        let mut out = [Millimeters(0.0); NUM_AXES];
        for (slot, mm) in out.iter_mut().zip(self.planned_mm.iter()) {
            *slot = Millimeters(*mm);
        }
        out
    }

    /// Re-synchronize the planned position (after homing, or after a halt
    /// when the caller has re-read the executed position). Must only be
    /// called with the queue empty.
    pub fn set_position(&mut self, position: [Millimeters; NUM_AXES]) {
        for axis in Axis::ALL {
            let i = axis.index();
            self.planned_mm[i] = position[i].0;
            self.planned_steps[i] =
                libm::roundf(position[i].0 * self.constraints.steps_per_mm[i]) as i32;
        }
        self.prev_nominal = 0.0;
        self.prev_unit = [0.0; NUM_AXES];
    }

    /// Plan a linear move to `target` at `feedrate` and append it to the
    /// queue.
    ///
    /// Returns `Ok(true)` when a block was appended, `Ok(false)` for a no-op
    /// request (zero step delta — the sub-step residual is still carried
    /// forward). On [`crate::error::PlannerError::QueueFull`] the planner
    /// state is unchanged and the caller retries the identical request.
    pub fn plan_move<const N: usize>(
        &mut self,
        queue: &mut BlockQueue<N>,
        target: [Millimeters; NUM_AXES],
        feedrate: MmPerSec,
    ) -> Result<bool> {
        let c = &self.constraints;

        // Software endstops: clamp or reject before anything else.
        let mut clamped = [0.0f32; NUM_AXES];
        for axis in Axis::ALL {
            let i = axis.index();
            clamped[i] = match &c.step_limits[i] {
                None => target[i].0,
                Some(limits) => {
                    let soft_min = limits.min_steps as f32 / c.steps_per_mm[i];
                    let soft_max = limits.max_steps as f32 / c.steps_per_mm[i];
                    if target[i].0 >= soft_min && target[i].0 <= soft_max {
                        target[i].0
                    } else {
                        match limits.policy {
                            crate::config::LimitPolicy::Clamp => {
                                target[i].0.clamp(soft_min, soft_max)
                            }
                            crate::config::LimitPolicy::Reject => {
                                return Err(Error::Planner(
                                    crate::error::PlannerError::TargetOutOfBounds {
                                        axis,
                                        target: target[i].0,
                                        min: soft_min,
                                        max: soft_max,
                                    },
                                ));
                            }
                        }
                    }
                }
            };
        }

        // Per-axis deltas in whole steps, rounding the absolute position.
        let mut target_steps = [0i32; NUM_AXES];
        let mut steps = [0u32; NUM_AXES];
        let mut directions = [Direction::Positive; NUM_AXES];
        let mut step_event_count = 0u32;
        for i in 0..NUM_AXES {
            target_steps[i] = libm::roundf(clamped[i] * c.steps_per_mm[i]) as i32;
            let delta = target_steps[i] - self.planned_steps[i];
            steps[i] = delta.unsigned_abs();
            directions[i] = Direction::from_delta(delta);
            step_event_count = step_event_count.max(steps[i]);
        }

        if step_event_count == 0 {
            // Sub-step request: remember the residual, emit nothing.
            self.planned_mm = clamped;
            return Ok(false);
        }

        // Move geometry.
        let mut delta_mm = [0.0f32; NUM_AXES];
        for i in 0..NUM_AXES {
            delta_mm[i] = clamped[i] - self.planned_mm[i];
        }
        let xyz_sq = delta_mm[0] * delta_mm[0]
            + delta_mm[1] * delta_mm[1]
            + delta_mm[2] * delta_mm[2];
        let extruder_only = steps[0] == 0 && steps[1] == 0 && steps[2] == 0;
        let distance = if extruder_only {
            fabsf(delta_mm[Axis::E.index()])
        } else {
            sqrtf(xyz_sq)
        };
        if !(distance > 0.0) {
            // Steps without distance: planner accumulator corruption.
            return Err(Error::Invariant(InvariantError::StepCountMismatch));
        }

        let mut unit = [0.0f32; NUM_AXES];
        for i in 0..NUM_AXES {
            unit[i] = delta_mm[i] / distance;
        }

        // Clamp the requested feedrate: per-axis limits scaled by each
        // axis's share of the move, then the acceleration-implied cap.
        let mut nominal = feedrate.0.max(c.min_feedrate);
        for i in 0..NUM_AXES {
            let component = fabsf(unit[i]);
            if component > 1e-6 {
                nominal = nominal.min(c.max_feedrate[i] / component);
            }
        }

        // Block acceleration: retract acceleration for extruder-only moves,
        // limited so no axis exceeds its own ceiling.
        let mut acceleration = if extruder_only {
            c.retract_acceleration
        } else {
            c.acceleration
        };
        for i in 0..NUM_AXES {
            let component = fabsf(unit[i]);
            if component > 1e-6 {
                acceleration = acceleration.min(c.max_acceleration[i] / component);
            }
        }

        nominal = nominal.min(sqrtf(2.0 * acceleration * distance));
        nominal = nominal.max(c.min_feedrate);

        // Junction speed against the previous *replannable* block. When no
        // pending block can still change, the predecessor exits at the
        // minimum planned speed and so must we enter at it.
        let has_replannable_prev = queue.len() > queue.first_replannable_offset();
        let max_entry_speed = if has_replannable_prev {
            let smaller = nominal.min(self.prev_nominal);
            let mut junction = smaller;
            let dx = unit[0] - self.prev_unit[0];
            let dy = unit[1] - self.prev_unit[1];
            let dz = unit[2] - self.prev_unit[2];
            // Planar jerk applies to the joint XY velocity change; Z has its
            // own limit. Colinear junctions impose no reduction.
            let xy_delta = sqrtf(dx * dx + dy * dy);
            if xy_delta > 1e-6 {
                junction = junction.min(c.max_xy_jerk / xy_delta);
            }
            let z_delta = fabsf(dz);
            if z_delta > 1e-6 {
                junction = junction.min(c.max_z_jerk / z_delta);
            }
            junction.max(c.min_feedrate)
        } else {
            c.min_feedrate
        };

        let entry_speed = max_entry_speed
            .min(max_allowable_speed(acceleration, c.min_feedrate, distance));

        let mut block = MotionBlock {
            steps,
            directions,
            step_event_count,
            distance_mm: distance,
            unit,
            entry_speed,
            nominal_speed: nominal,
            // The newest block must always be able to stop.
            exit_speed: c.min_feedrate,
            max_entry_speed,
            acceleration,
            accelerate_until: 0,
            decelerate_after: step_event_count,
            nominal_reached: false,
            extruder_only,
            suppress_thermal_hint: false,
        };
        block.compute_trapezoid();

        if let Some(window_ms) = c.travel_check_suppression_ms {
            let non_printing = steps[Axis::E.index()] == 0 || extruder_only;
            block.suppress_thermal_hint =
                non_printing && block.estimated_duration_ms() <= window_ms;
        }

        queue.push(block).map_err(Error::Planner)?;

        // Commit planner state only after the block is accepted.
        self.planned_steps = target_steps;
        self.planned_mm = clamped;
        self.prev_unit = unit;
        self.prev_nominal = nominal;

        self.recalculate(queue);

        Ok(true)
    }

    /// Reconcile entry/exit speeds across the queued, not-yet-started blocks
    /// and rebuild their trapezoids.
    ///
    /// Reverse pass: each block's entry is capped by the speed from which it
    /// can decelerate to its successor's entry within its own length.
    /// Forward pass: each block's entry is capped by what its predecessor can
    /// accelerate to. Both passes only ever lower speeds, so they terminate
    /// at the first unchanged profile.
    fn recalculate<const N: usize>(&self, queue: &mut BlockQueue<N>) {
        let floor = queue.first_replannable_offset();
        let len = queue.len();
        if len == 0 || floor >= len {
            return;
        }

        // Reverse pass (skip the first replannable block — its entry is
        // fixed by whatever precedes it).
        let mut idx = len - 1;
        while idx > floor {
            let next_entry = match queue.get(idx) {
                Some(b) => b.entry_speed,
                None => return,
            };
            let prev = match queue.get(idx - 1) {
                Some(b) => *b,
                None => return,
            };
            // `idx`'s entry already final; lower `idx - 1`'s entry if it
            // cannot shed enough speed within its own distance.
            let reachable =
                max_allowable_speed(prev.acceleration, next_entry, prev.distance_mm);
            let capped = prev.max_entry_speed.min(reachable);
            if capped < prev.entry_speed {
                if let Some(b) = queue.get_mut(idx - 1) {
                    b.entry_speed = capped;
                }
            }
            idx -= 1;
        }

        // Forward pass.
        for i in floor..len.saturating_sub(1) {
            let (prev_entry, prev_accel, prev_dist) = match queue.get(i) {
                Some(b) => (b.entry_speed, b.acceleration, b.distance_mm),
                None => return,
            };
            let reachable = max_allowable_speed(prev_accel, prev_entry, prev_dist);
            if let Some(next) = queue.get_mut(i + 1) {
                if reachable < next.entry_speed {
                    next.entry_speed = reachable;
                }
            }
        }

        // Rebuild trapezoids with reconciled exits.
        for i in floor..len {
            let exit = if i + 1 < len {
                match queue.get(i + 1) {
                    Some(next) => next.entry_speed,
                    None => return,
                }
            } else {
                self.constraints.min_feedrate
            };
            if let Some(block) = queue.get_mut(i) {
                block.exit_speed = exit;
                block.compute_trapezoid();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::test_config;
    use crate::config::UnitExt;

    fn planner_and_queue() -> (MotionPlanner, BlockQueue<16>) {
        (MotionPlanner::new(&test_config()), BlockQueue::new())
    }

    fn pos(x: f32, y: f32, z: f32, e: f32) -> [Millimeters; NUM_AXES] {
        [x.mm(), y.mm(), z.mm(), e.mm()]
    }

    #[test]
    fn test_simple_move_step_count() {
        let (mut planner, mut queue) = planner_and_queue();

        // 100 mm at 80 steps/mm = 8000 steps, below the acceleration cap.
        let appended = planner
            .plan_move(&mut queue, pos(100.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec())
            .unwrap();
        assert!(appended);

        let block = queue.front().unwrap();
        assert_eq!(block.step_event_count, 8000);
        assert_eq!(block.steps[Axis::X.index()], 8000);
        assert!(block.nominal_reached);
        assert!(block.decelerate_after > block.accelerate_until);
    }

    #[test]
    fn test_zero_distance_is_noop() {
        let (mut planner, mut queue) = planner_and_queue();
        let appended = planner
            .plan_move(&mut queue, pos(0.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec())
            .unwrap();
        assert!(!appended);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sub_step_residual_carries_forward() {
        let (mut planner, mut queue) = planner_and_queue();

        // 80 steps/mm: 0.004 mm rounds to zero steps; three of them in a row
        // accumulate to 0.012 mm ≈ 1 step.
        for (i, target_x) in [0.004f32, 0.008, 0.012].iter().enumerate() {
            let appended = planner
                .plan_move(&mut queue, pos(*target_x, 0.0, 0.0, 0.0), 10.0.mm_per_sec())
                .unwrap();
            if i < 2 {
                assert!(!appended, "request {} should round to zero steps", i);
            } else {
                assert!(appended);
            }
        }
        assert_eq!(queue.front().unwrap().step_event_count, 1);
    }

    #[test]
    fn test_no_drift_across_many_moves() {
        let (mut planner, mut queue) = planner_and_queue();

        // 0.3 mm at 80 steps/mm is 24 exact steps, but 0.1 mm increments
        // round to 8 each; absolute rounding keeps totals exact.
        let mut total_steps = 0i64;
        for i in 1..=1000 {
            let target = i as f32 * 0.1;
            planner
                .plan_move(&mut queue, pos(target, 0.0, 0.0, 0.0), 50.0.mm_per_sec())
                .ok();
            while let Some(block) = queue.front() {
                total_steps +=
                    block.steps[Axis::X.index()] as i64 * block.directions[Axis::X.index()].sign() as i64;
                queue.pop_front();
            }
        }
        // 100 mm * 80 steps/mm exactly.
        assert_eq!(total_steps, 8000);
    }

    #[test]
    fn test_feedrate_clamped_by_axis_limit() {
        let (mut planner, mut queue) = planner_and_queue();

        // Z max feedrate is 5 mm/s; a pure Z move at 100 mm/s must clamp.
        planner
            .plan_move(&mut queue, pos(0.0, 0.0, 50.0, 0.0), 100.0.mm_per_sec())
            .unwrap();
        let block = queue.front().unwrap();
        assert!(block.nominal_speed <= 5.0 + 1e-3);
    }

    #[test]
    fn test_extruder_only_uses_retract_acceleration() {
        let (mut planner, mut queue) = planner_and_queue();

        planner
            .plan_move(&mut queue, pos(0.0, 0.0, 0.0, 4.0), 40.0.mm_per_sec())
            .unwrap();
        let block = queue.front().unwrap();
        assert!(block.extruder_only);
        // Capped by the E axis's own 500 mm/s² ceiling, not the cruise value.
        assert!((block.acceleration - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_colinear_junction_keeps_speed() {
        let (mut planner, mut queue) = planner_and_queue();

        planner
            .plan_move(&mut queue, pos(50.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec())
            .unwrap();
        planner
            .plan_move(&mut queue, pos(100.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec())
            .unwrap();

        let first = *queue.get(0).unwrap();
        let second = *queue.get(1).unwrap();
        // Exit of the first equals entry of the second: no deceleration at a
        // straight-through junction.
        assert!((first.exit_speed - second.entry_speed).abs() < 1e-3);
        assert!(second.entry_speed > 40.0);
    }

    #[test]
    fn test_right_angle_junction_respects_jerk() {
        let (mut planner, mut queue) = planner_and_queue();

        // Two moves at 90°: X then Y, both asking for 100 mm/s; planar jerk
        // limit is 20 mm/s.
        planner
            .plan_move(&mut queue, pos(100.0, 0.0, 0.0, 0.0), 100.0.mm_per_sec())
            .unwrap();
        planner
            .plan_move(&mut queue, pos(100.0, 100.0, 0.0, 0.0), 100.0.mm_per_sec())
            .unwrap();

        let second = *queue.get(1).unwrap();
        assert!(second.entry_speed <= 20.0 + 1e-3);
        // The joint XY velocity change at the junction stays within the limit.
        let first = *queue.get(0).unwrap();
        let v = first.exit_speed.max(second.entry_speed);
        let dvx = v * (second.unit[0] - first.unit[0]);
        let dvy = v * (second.unit[1] - first.unit[1]);
        assert!(sqrtf(dvx * dvx + dvy * dvy) <= 20.0 * 1.05);
    }

    #[test]
    fn test_target_clamped_to_travel_bounds() {
        let (mut planner, mut queue) = planner_and_queue();

        // X travel is 170 mm with Clamp policy.
        planner
            .plan_move(&mut queue, pos(400.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec())
            .unwrap();
        let block = queue.front().unwrap();
        assert_eq!(block.step_event_count, 170 * 80);
        let planned = planner.planned_position();
        assert!((planned[Axis::X.index()].0 - 170.0).abs() < 1e-3);
    }

    #[test]
    fn test_target_rejected_when_policy_rejects() {
        let config = {
            let mut c = test_config();
            if let Some(l) = c.axes.x.limits.as_mut() {
                l.policy = crate::config::LimitPolicy::Reject;
            }
            c
        };
        let mut planner = MotionPlanner::new(&config);
        let mut queue: BlockQueue<16> = BlockQueue::new();

        let result = planner.plan_move(&mut queue, pos(400.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec());
        assert!(matches!(
            result,
            Err(Error::Planner(crate::error::PlannerError::TargetOutOfBounds {
                axis: Axis::X,
                ..
            }))
        ));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_full_leaves_planner_unchanged() {
        let (mut planner, _) = planner_and_queue();
        let mut queue: BlockQueue<2> = BlockQueue::new();

        planner
            .plan_move(&mut queue, pos(10.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec())
            .unwrap();
        let before = planner.planned_position();

        let result = planner.plan_move(&mut queue, pos(20.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec());
        assert!(matches!(
            result,
            Err(Error::Planner(crate::error::PlannerError::QueueFull))
        ));
        let after = planner.planned_position();
        assert_eq!(before[0].0, after[0].0);

        // Draining the queue lets the identical request through.
        queue.pop_front();
        assert!(planner
            .plan_move(&mut queue, pos(20.0, 0.0, 0.0, 0.0), 50.0.mm_per_sec())
            .unwrap());
    }

    #[test]
    fn test_acceleration_bound_on_entry_speeds() {
        let (mut planner, mut queue) = planner_and_queue();

        // A long fast move followed by a very short colinear one: the short
        // block's entry must be low enough to stop within its own length.
        planner
            .plan_move(&mut queue, pos(100.0, 0.0, 0.0, 0.0), 200.0.mm_per_sec())
            .unwrap();
        planner
            .plan_move(&mut queue, pos(100.5, 0.0, 0.0, 0.0), 200.0.mm_per_sec())
            .unwrap();

        let last = *queue.get(1).unwrap();
        let min_feedrate = planner.constraints().min_feedrate;
        let stoppable =
            max_allowable_speed(last.acceleration, min_feedrate, last.distance_mm);
        assert!(last.entry_speed <= stoppable + 1e-3);

        // And the first block's exit matches it exactly.
        let first = *queue.get(0).unwrap();
        assert!((first.exit_speed - last.entry_speed).abs() < 1e-3);
    }
}
