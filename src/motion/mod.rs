//! Motion module for printer-motion.
//!
//! Move requests flow planner → block queue → interpolator; the planner is
//! the queue's only producer and the interpolator its only consumer.

mod block;
mod interpolator;
mod planner;
mod queue;

pub use block::{Direction, MotionBlock};
pub use interpolator::{StepInterpolator, TickResult};
pub use planner::MotionPlanner;
pub use queue::{BlockQueue, DEFAULT_QUEUE_CAPACITY};
