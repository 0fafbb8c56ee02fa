//! Step interpolation — executes queued blocks as synchronized pulses.
//!
//! One call to [`StepInterpolator::tick`] is one step event on the dominant
//! axis. Non-dominant axes follow by Bresenham error accumulation, so every
//! axis's emitted count matches its planned count exactly when the block
//! finishes. The returned interval tells the timer layer when to fire the
//! next tick; it follows the block's trapezoid and is maintained
//! incrementally (one multiply-add and one square root per tick, never a
//! recomputation from the phase origin).
//!
//! The tick path performs no allocation and takes no lock.

use libm::sqrtf;

use crate::config::{Axis, MachineConfig, NUM_AXES};
use crate::error::{Error, InvariantError, Result};
use crate::stepper::{AxisStates, EndstopSnapshot, MotionOutputs};

use super::block::MotionBlock;
use super::queue::BlockQueue;

/// Outcome of one interpolator tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickResult {
    /// No block queued; nothing emitted.
    Idle,
    /// A step event was emitted; fire the next tick after `interval_ns`.
    Stepped {
        /// Nanoseconds until the next tick.
        interval_ns: u32,
    },
    /// The step event completed the current block. The next tick starts the
    /// following block, continuing at the reconciled junction speed.
    BlockComplete {
        /// Nanoseconds until the next tick.
        interval_ns: u32,
    },
    /// A hardware endstop asserted against the direction of travel: the
    /// block was aborted, the queue flushed, and the interpolator latched
    /// halted until [`StepInterpolator::clear_halt`].
    Halted {
        /// Axis whose endstop asserted.
        axis: Axis,
    },
}

/// Execution state for the block at the queue head.
#[derive(Debug, Clone, Copy)]
struct ExecState {
    block: MotionBlock,
    dominant: Axis,
    /// Step events emitted so far.
    events_done: u32,
    /// Bresenham numerators; `accumulator / step_event_count` is the
    /// fractional error, kept in [0, 1) at all times.
    accumulators: [u32; NUM_AXES],
    /// Squared dominant-axis event rate, (events/s)².
    rate_sq: f32,
    nominal_rate_sq: f32,
    exit_rate_sq: f32,
    /// Added to (subtracted from) `rate_sq` per event while accelerating
    /// (decelerating): `2 · a · events_per_mm`.
    rate_delta: f32,
}

/// Real-time consumer of the block queue.
#[derive(Debug)]
pub struct StepInterpolator {
    exec: Option<ExecState>,
    disable_when_idle: [bool; NUM_AXES],
    halted: bool,
}

impl StepInterpolator {
    /// Create an interpolator from a validated configuration.
    pub fn new(config: &MachineConfig) -> Self {
        let mut disable_when_idle = [false; NUM_AXES];
        for axis in Axis::ALL {
            disable_when_idle[axis.index()] = config.axis(axis).disable_when_idle;
        }
        Self {
            exec: None,
            disable_when_idle,
            halted: false,
        }
    }

    /// Whether a block is currently executing.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.exec.is_some()
    }

    /// Whether the interpolator is latched halted (endstop or emergency
    /// stop).
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether the executing block hints the thermal tick to stay off.
    #[inline]
    pub fn thermal_check_suppressed(&self) -> bool {
        self.exec
            .map(|e| e.block.suppress_thermal_hint)
            .unwrap_or(false)
    }

    /// Emergency stop: abort the executing block, flush the queue, latch
    /// halted. Executed positions keep whatever was emitted; the caller
    /// re-syncs the planner before resuming.
    pub fn halt<const N: usize>(&mut self, queue: &mut BlockQueue<N>) {
        self.exec = None;
        queue.clear();
        self.halted = true;
    }

    /// Re-arm after a halt.
    pub fn clear_halt(&mut self) {
        self.halted = false;
    }

    /// Execute one step event.
    ///
    /// Call from the step timer context. Returns the interval to the next
    /// tick; the timer layer reprograms itself with it.
    pub fn tick<O: MotionOutputs, const N: usize>(
        &mut self,
        queue: &mut BlockQueue<N>,
        axes: &AxisStates,
        endstops: &EndstopSnapshot,
        outputs: &mut O,
    ) -> Result<TickResult> {
        if self.halted {
            return Ok(TickResult::Idle);
        }

        if self.exec.is_none() && !self.begin_next(queue, axes, outputs)? {
            self.disable_idle_axes(axes, outputs)?;
            return Ok(TickResult::Idle);
        }
        let exec = match self.exec.as_mut() {
            Some(exec) => exec,
            None => return Ok(TickResult::Idle),
        };

        let steps = exec.block.steps;
        let directions = exec.block.directions;
        let total = exec.block.step_event_count;
        let accelerate_until = exec.block.accelerate_until;
        let decelerate_after = exec.block.decelerate_after;
        let dominant = exec.dominant;

        // Endstop guard: only an axis moving toward its switch aborts.
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let i = axis.index();
            if endstops.is_triggered(axis)
                && steps[i] > 0
                && directions[i] == super::block::Direction::Negative
            {
                self.exec = None;
                queue.clear();
                self.halted = true;
                return Ok(TickResult::Halted { axis });
            }
        }

        // Bresenham: the dominant axis steps every event; the others step
        // when their accumulated fraction crosses one whole step.
        for axis in Axis::ALL {
            let i = axis.index();
            if axis == dominant || steps[i] == 0 {
                continue;
            }
            exec.accumulators[i] += steps[i];
            if exec.accumulators[i] >= total {
                exec.accumulators[i] -= total;
                outputs.step(axis)?;
                axes.axis(axis).apply_step(directions[i]);
            }
        }
        outputs.step(dominant)?;
        axes.axis(dominant).apply_step(directions[dominant.index()]);

        exec.events_done += 1;
        let done = exec.events_done;

        // Trapezoid-following rate, maintained incrementally.
        if done <= accelerate_until {
            exec.rate_sq = (exec.rate_sq + exec.rate_delta).min(exec.nominal_rate_sq);
        } else if done > decelerate_after {
            exec.rate_sq = (exec.rate_sq - exec.rate_delta).max(exec.exit_rate_sq);
        } else {
            exec.rate_sq = exec.nominal_rate_sq;
        }
        let interval_ns = (1_000_000_000.0 / sqrtf(exec.rate_sq)) as u32;

        if done >= total {
            self.exec = None;
            queue.pop_front();
            return Ok(TickResult::BlockComplete { interval_ns });
        }

        Ok(TickResult::Stepped { interval_ns })
    }

    /// Adopt the block at the queue head: latch directions, enable drivers,
    /// derive event rates. Returns false when the queue is empty.
    fn begin_next<O: MotionOutputs, const N: usize>(
        &mut self,
        queue: &mut BlockQueue<N>,
        axes: &AxisStates,
        outputs: &mut O,
    ) -> Result<bool> {
        if queue.is_empty() {
            return Ok(false);
        }
        let block = queue
            .begin_front()
            .ok_or(Error::Invariant(InvariantError::QueueSlotEmpty))?;

        let mut dominant = Axis::X;
        for axis in Axis::ALL {
            let i = axis.index();
            if block.steps[i] > block.steps[dominant.index()] {
                dominant = axis;
            }
            if block.steps[i] > block.step_event_count {
                return Err(Error::Invariant(InvariantError::StepCountMismatch));
            }
            if block.steps[i] > 0 {
                let state = axes.axis(axis);
                if state.direction() != block.directions[i] || !state.enabled() {
                    outputs.set_direction(axis, block.directions[i])?;
                    state.set_direction(block.directions[i]);
                }
                if !state.enabled() {
                    outputs.set_enabled(axis, true)?;
                    state.set_enabled(true);
                }
            }
        }

        let k = block.events_per_mm();
        let entry_rate = block.entry_speed * k;
        let nominal_rate = block.nominal_speed * k;
        let exit_rate = block.exit_speed * k;

        self.exec = Some(ExecState {
            block,
            dominant,
            events_done: 0,
            accumulators: [0; NUM_AXES],
            rate_sq: entry_rate * entry_rate,
            nominal_rate_sq: nominal_rate * nominal_rate,
            exit_rate_sq: exit_rate * exit_rate,
            rate_delta: 2.0 * block.acceleration * k,
        });
        Ok(true)
    }

    fn disable_idle_axes<O: MotionOutputs>(
        &self,
        axes: &AxisStates,
        outputs: &mut O,
    ) -> Result<()> {
        for axis in Axis::ALL {
            let i = axis.index();
            if self.disable_when_idle[i] && axes.axis(axis).enabled() {
                outputs.set_enabled(axis, false)?;
                axes.axis(axis).set_enabled(false);
            }
        }
        Ok(())
    }
}
