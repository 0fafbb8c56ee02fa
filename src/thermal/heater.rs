//! Heater state machine with safety cutoffs and heating watchdog.
//!
//! Temperatures arrive already converted to °C (thermistor tables live
//! outside this core); timestamps are caller-supplied milliseconds and may
//! wrap. The drive output is a fraction in `0.0..=1.0`.

use crate::config::{Celsius, HeaterConfig, WatchdogPolicy};

use super::control::{ControlLaw, ControlStrategy};

/// Why a heater latched into Fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultReason {
    /// Measured temperature fell below the configured minimum — typically a
    /// shorted or disconnected thermistor.
    BelowMinTemp,
    /// Measured temperature exceeded the configured maximum.
    AboveMaxTemp,
}

/// Heater lifecycle state, exposed for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaterState {
    /// No target set; output off.
    Idle,
    /// Target set, temperature outside the regulation band.
    Heating,
    /// Temperature within the regulation band of the target.
    Regulating,
    /// Safety cutoff tripped; output forced off until an explicit new target
    /// command re-arms the heater.
    Fault(FaultReason),
}

/// Errors reading a temperature sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Open circuit (disconnected sensor).
    OpenCircuit,
    /// Short circuit.
    ShortCircuit,
    /// Reading outside the sensor's plausible range.
    OutOfRange,
}

/// Trait for temperature sensors.
///
/// Implementations wrap the ADC path and its conversion tables; this core
/// only ever sees °C.
pub trait TemperatureSensor {
    /// Read the current temperature.
    fn read_celsius(&mut self) -> Result<Celsius, SensorError>;
}

/// Armed watchdog: a rise must be observed before the window closes.
#[derive(Debug, Clone, Copy)]
struct WatchdogArm {
    armed_at_ms: u32,
    baseline: Celsius,
}

/// One heater's closed-loop controller and state machine.
#[derive(Debug, Clone)]
pub struct Heater {
    config: HeaterConfig,
    control: ControlLaw,
    state: HeaterState,
    target: Celsius,
    /// Last (smoothed) measurement, for status and watchdog baselines.
    measured: Celsius,
    smoothed: Option<f32>,
    watchdog: Option<WatchdogArm>,
    output: f32,
    last_sample_ms: Option<u32>,
}

impl Heater {
    /// Create a heater from its validated configuration.
    pub fn new(config: HeaterConfig) -> Self {
        let control = ControlLaw::from_config(&config.control);
        Self {
            config,
            control,
            state: HeaterState::Idle,
            target: Celsius(0.0),
            measured: Celsius(0.0),
            smoothed: None,
            watchdog: None,
            output: 0.0,
            last_sample_ms: None,
        }
    }

    /// Current state, for status reporting.
    #[inline]
    pub fn state(&self) -> HeaterState {
        self.state
    }

    /// Current target temperature.
    #[inline]
    pub fn target(&self) -> Celsius {
        self.target
    }

    /// Most recent (smoothed) measurement.
    #[inline]
    pub fn measured(&self) -> Celsius {
        self.measured
    }

    /// Current drive output in `0.0..=1.0`.
    #[inline]
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Whether the next `update` at `now_ms` would take a fresh sample.
    pub fn is_due(&self, now_ms: u32) -> bool {
        match self.last_sample_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.config.sample_interval_ms,
        }
    }

    /// Command a new target temperature.
    ///
    /// This is the only way out of Fault: an explicit fresh command re-arms
    /// the heater. Raising the target arms the watchdog according to its
    /// policy.
    pub fn set_target(&mut self, target: Celsius, now_ms: u32) {
        let target = Celsius(target.0.max(0.0));
        let raising = target.0 > self.target.0;

        if matches!(self.state, HeaterState::Fault(_)) {
            // Re-arm from Fault with clean control state.
            self.control.reset();
        }

        if raising {
            if let Some(wd) = &self.config.watchdog {
                let rearm = match wd.policy {
                    WatchdogPolicy::RestartOnEachRaise => true,
                    WatchdogPolicy::FirstRaiseOnly => self.watchdog.is_none(),
                };
                if rearm {
                    self.watchdog = Some(WatchdogArm {
                        armed_at_ms: now_ms,
                        baseline: self.measured,
                    });
                }
            }
        }

        self.target = target;
        if target.0 <= 0.0 {
            self.state = HeaterState::Idle;
            self.watchdog = None;
            self.output = 0.0;
            self.control.reset();
        } else {
            self.state = HeaterState::Heating;
        }
    }

    /// Run one control tick.
    ///
    /// Call at any cadence; samples are taken no more often than the
    /// configured interval, and the cached output is returned in between.
    /// The returned drive is also what the safety logic forced (0.0 in
    /// Fault/Idle).
    pub fn update(&mut self, now_ms: u32, raw: Celsius) -> f32 {
        if !self.is_due(now_ms) {
            return self.output;
        }
        let dt = match self.last_sample_ms {
            None => self.config.sample_interval_ms as f32 / 1000.0,
            Some(last) => now_ms.wrapping_sub(last) as f32 / 1000.0,
        };
        self.last_sample_ms = Some(now_ms);

        let measured = self.smooth(raw);
        self.measured = measured;

        // Hard safety cutoff: outside the safe window the output goes off
        // and stays off until an explicit new target command.
        if measured.0 < self.config.min_temp.0 {
            self.fault(FaultReason::BelowMinTemp);
            return 0.0;
        }
        if measured.0 > self.config.max_temp.0 {
            self.fault(FaultReason::AboveMaxTemp);
            return 0.0;
        }

        if matches!(self.state, HeaterState::Fault(_)) {
            self.output = 0.0;
            return 0.0;
        }

        // Watchdog: no observed rise within the window reverts the target.
        if let (Some(arm), Some(wd)) = (self.watchdog, self.config.watchdog.as_ref()) {
            if now_ms.wrapping_sub(arm.armed_at_ms) >= wd.period_ms {
                if measured.0 < arm.baseline.0 + wd.min_rise.0 {
                    self.target = Celsius(0.0);
                    self.state = HeaterState::Idle;
                    self.watchdog = None;
                    self.output = 0.0;
                    self.control.reset();
                    return 0.0;
                }
                self.watchdog = None;
            }
        }

        if self.target.0 <= 0.0 {
            self.state = HeaterState::Idle;
            self.output = 0.0;
            return 0.0;
        }

        self.output = self.control.update(measured, self.target, dt);
        let error = self.target.0 - measured.0;
        self.state = if error.abs() <= self.config.regulation_band.0 {
            HeaterState::Regulating
        } else {
            HeaterState::Heating
        };
        self.output
    }

    fn fault(&mut self, reason: FaultReason) {
        self.state = HeaterState::Fault(reason);
        self.output = 0.0;
        self.watchdog = None;
        self.control.reset();
    }

    /// Exponential smoothing over roughly `smoothing_samples` readings.
    fn smooth(&mut self, raw: Celsius) -> Celsius {
        match self.config.smoothing_samples {
            None | Some(0) | Some(1) => Celsius(raw.0),
            Some(n) => {
                let smoothed = match self.smoothed {
                    None => raw.0,
                    Some(prev) => prev + (raw.0 - prev) / n as f32,
                };
                self.smoothed = Some(smoothed);
                Celsius(smoothed)
            }
        }
    }
}
