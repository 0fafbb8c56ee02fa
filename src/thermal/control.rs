//! Heater control strategies.
//!
//! Both strategies drive the same interface; the heater state machine picks
//! one at configuration load and never branches on which. Outputs are a
//! drive fraction in `0.0..=1.0` — the firmware layer maps that onto PWM or
//! time-proportioned on/off as the hardware allows.

use crate::config::{Celsius, ControlConfig};

/// A closed-loop control law computing heater drive from measured and target
/// temperature.
pub trait ControlStrategy {
    /// Compute the drive fraction for one sampling tick. `dt` is the tick
    /// period in seconds.
    fn update(&mut self, current: Celsius, target: Celsius, dt: f32) -> f32;

    /// Discard accumulated state (integral, hysteresis memory).
    fn reset(&mut self);
}

/// PID control with clamped-integral anti-windup.
#[derive(Debug, Clone)]
pub struct PidControl {
    kp: f32,
    ki: f32,
    kd: f32,
    /// Clamp on the integral term, in output units. Bounds windup when the
    /// heater cannot reach the target.
    integral_limit: f32,
    /// Ceiling on the drive output.
    output_max: f32,
    integral: f32,
    prev_error: f32,
    /// False until the first sample; suppresses a derivative kick.
    primed: bool,
}

impl PidControl {
    /// Create a PID law from gains and clamps.
    pub fn new(kp: f32, ki: f32, kd: f32, integral_limit: f32, output_max: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral_limit,
            output_max,
            integral: 0.0,
            prev_error: 0.0,
            primed: false,
        }
    }

    /// Current integral term (for status reporting).
    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }
}

impl ControlStrategy for PidControl {
    fn update(&mut self, current: Celsius, target: Celsius, dt: f32) -> f32 {
        let error = target.0 - current.0;

        self.integral = (self.integral + self.ki * error * dt)
            .clamp(-self.integral_limit, self.integral_limit);

        let derivative = if self.primed && dt > 0.0 {
            (error - self.prev_error) / dt
        } else {
            0.0
        };
        self.prev_error = error;
        self.primed = true;

        let output = self.kp * error + self.integral + self.kd * derivative;
        output.clamp(0.0, self.output_max)
    }

    fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.primed = false;
    }
}

/// On/off control with hysteresis: full drive below `target - hysteresis`,
/// off above `target + hysteresis`, previous state inside the band.
#[derive(Debug, Clone)]
pub struct BangBangControl {
    hysteresis: f32,
    on: bool,
}

impl BangBangControl {
    /// Create a bang-bang law with the given half-band.
    pub fn new(hysteresis: Celsius) -> Self {
        Self {
            hysteresis: hysteresis.0,
            on: false,
        }
    }
}

impl ControlStrategy for BangBangControl {
    fn update(&mut self, current: Celsius, target: Celsius, _dt: f32) -> f32 {
        if current.0 < target.0 - self.hysteresis {
            self.on = true;
        } else if current.0 > target.0 + self.hysteresis {
            self.on = false;
        }
        if self.on {
            1.0
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.on = false;
    }
}

/// Runtime-selected control law, chosen once at configuration load.
#[derive(Debug, Clone)]
pub enum ControlLaw {
    /// PID control.
    Pid(PidControl),
    /// Bang-bang control.
    BangBang(BangBangControl),
}

impl ControlLaw {
    /// Build the law selected by the configuration.
    pub fn from_config(config: &ControlConfig) -> Self {
        match config {
            ControlConfig::Pid {
                kp,
                ki,
                kd,
                integral_limit,
                output_max,
            } => ControlLaw::Pid(PidControl::new(*kp, *ki, *kd, *integral_limit, *output_max)),
            ControlConfig::BangBang { hysteresis } => {
                ControlLaw::BangBang(BangBangControl::new(*hysteresis))
            }
        }
    }
}

impl ControlStrategy for ControlLaw {
    fn update(&mut self, current: Celsius, target: Celsius, dt: f32) -> f32 {
        match self {
            ControlLaw::Pid(pid) => pid.update(current, target, dt),
            ControlLaw::BangBang(bb) => bb.update(current, target, dt),
        }
    }

    fn reset(&mut self) {
        match self {
            ControlLaw::Pid(pid) => pid.reset(),
            ControlLaw::BangBang(bb) => bb.reset(),
        }
    }
}
