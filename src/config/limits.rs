//! Software travel limit configuration and types.

use serde::Deserialize;

use super::units::Millimeters;

/// Policy for handling travel limit violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Reject moves that would exceed limits.
    #[default]
    Reject,
    /// Clamp target to nearest limit.
    Clamp,
}

/// Software travel limits in millimeters (from configuration).
#[derive(Debug, Clone, Deserialize)]
pub struct SoftLimits {
    /// Minimum allowed position in mm.
    #[serde(rename = "min_mm")]
    pub min: Millimeters,

    /// Maximum allowed position in mm.
    #[serde(rename = "max_mm")]
    pub max: Millimeters,

    /// What to do when a target exceeds the limits.
    #[serde(default)]
    pub policy: LimitPolicy,
}

impl SoftLimits {
    /// Create new soft limits.
    pub fn new(min: Millimeters, max: Millimeters, policy: LimitPolicy) -> Self {
        Self { min, max, policy }
    }

    /// Check if limits are valid (min < max).
    pub fn is_valid(&self) -> bool {
        self.min.0 < self.max.0
    }

    /// Check if a position is within limits.
    pub fn contains(&self, position: Millimeters) -> bool {
        position.0 >= self.min.0 && position.0 <= self.max.0
    }

    /// Apply the limit policy to a target position.
    ///
    /// Returns `Some(position)` if valid or clamped, `None` if rejected.
    pub fn apply(&self, target: Millimeters) -> Option<Millimeters> {
        if self.contains(target) {
            Some(target)
        } else {
            match self.policy {
                LimitPolicy::Reject => None,
                LimitPolicy::Clamp => {
                    if target.0 < self.min.0 {
                        Some(self.min)
                    } else {
                        Some(self.max)
                    }
                }
            }
        }
    }
}

/// Soft limits converted to steps (for runtime use).
#[derive(Debug, Clone, Copy)]
pub struct StepLimits {
    /// Minimum position in steps.
    pub min_steps: i32,
    /// Maximum position in steps.
    pub max_steps: i32,
    /// Limit policy.
    pub policy: LimitPolicy,
}

impl StepLimits {
    /// Create step limits from soft limits and a steps-per-mm ratio.
    pub fn from_soft_limits(soft: &SoftLimits, steps_per_mm: f32) -> Self {
        Self {
            min_steps: (soft.min.0 * steps_per_mm) as i32,
            max_steps: (soft.max.0 * steps_per_mm) as i32,
            policy: soft.policy,
        }
    }

    /// Check if a position is within limits.
    pub fn contains(&self, steps: i32) -> bool {
        steps >= self.min_steps && steps <= self.max_steps
    }
}
