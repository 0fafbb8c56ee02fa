//! Step/direction/enable output abstraction.
//!
//! The interpolator drives motion through [`MotionOutputs`]; firmware wires
//! it to real pins through [`AxisPins`] (embedded-hal 1.0 `OutputPin`s),
//! tests through a recording mock.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::Axis;
use crate::error::StepError;
use crate::motion::Direction;

/// Logical step/direction/enable outputs for all axes, polarity already
/// resolved.
pub trait MotionOutputs {
    /// Latch the direction for an axis. Called once per block per moving
    /// axis, before any step pulse of that block.
    fn set_direction(&mut self, axis: Axis, direction: Direction) -> Result<(), StepError>;

    /// Emit one step pulse on an axis.
    fn step(&mut self, axis: Axis) -> Result<(), StepError>;

    /// Enable or disable an axis's motor driver.
    fn set_enabled(&mut self, axis: Axis, enabled: bool) -> Result<(), StepError>;
}

/// Driver for one axis's STEP/DIR/ENABLE pins.
///
/// Generic over embedded-hal 1.0 pin types; polarity comes from the axis
/// configuration (`invert_direction`, `invert_enable`).
pub struct AxisPins<STEP, DIR, EN, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    step_pin: STEP,
    dir_pin: DIR,
    enable_pin: EN,
    delay: DELAY,
    invert_direction: bool,
    invert_enable: bool,
    /// Step pulse width in microseconds (most drivers need 1–10 µs).
    pulse_width_us: u32,
}

impl<STEP, DIR, EN, DELAY> AxisPins<STEP, DIR, EN, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    /// Create a pin driver with a 2 µs pulse width.
    pub fn new(
        step_pin: STEP,
        dir_pin: DIR,
        enable_pin: EN,
        delay: DELAY,
        invert_direction: bool,
        invert_enable: bool,
    ) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin,
            delay,
            invert_direction,
            invert_enable,
            pulse_width_us: 2,
        }
    }

    /// Override the step pulse width.
    pub fn with_pulse_width_us(mut self, width: u32) -> Self {
        self.pulse_width_us = width;
        self
    }

    /// Set the direction pin.
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), StepError> {
        let pin_high = match direction {
            Direction::Positive => !self.invert_direction,
            Direction::Negative => self.invert_direction,
        };
        if pin_high {
            self.dir_pin.set_high().map_err(|_| StepError::PinError)
        } else {
            self.dir_pin.set_low().map_err(|_| StepError::PinError)
        }
    }

    /// Emit one step pulse.
    pub fn step(&mut self) -> Result<(), StepError> {
        self.step_pin.set_high().map_err(|_| StepError::PinError)?;
        self.delay.delay_us(self.pulse_width_us);
        self.step_pin.set_low().map_err(|_| StepError::PinError)
    }

    /// Drive the enable pin, honoring its polarity.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), StepError> {
        let pin_high = enabled != self.invert_enable;
        if pin_high {
            self.enable_pin.set_high().map_err(|_| StepError::PinError)
        } else {
            self.enable_pin.set_low().map_err(|_| StepError::PinError)
        }
    }
}

/// [`MotionOutputs`] over four [`AxisPins`] drivers.
pub struct MachinePins<X, Y, Z, E> {
    /// X axis pins.
    pub x: X,
    /// Y axis pins.
    pub y: Y,
    /// Z axis pins.
    pub z: Z,
    /// Extruder pins.
    pub e: E,
}

macro_rules! dispatch_axis {
    ($self:ident, $axis:ident, $method:ident $(, $arg:expr)*) => {
        match $axis {
            Axis::X => $self.x.$method($($arg),*),
            Axis::Y => $self.y.$method($($arg),*),
            Axis::Z => $self.z.$method($($arg),*),
            Axis::E => $self.e.$method($($arg),*),
        }
    };
}

impl<XS, XD, XE, XDel, YS, YD, YE, YDel, ZS, ZD, ZE, ZDel, ES, ED, EE, EDel> MotionOutputs
    for MachinePins<
        AxisPins<XS, XD, XE, XDel>,
        AxisPins<YS, YD, YE, YDel>,
        AxisPins<ZS, ZD, ZE, ZDel>,
        AxisPins<ES, ED, EE, EDel>,
    >
where
    XS: OutputPin,
    XD: OutputPin,
    XE: OutputPin,
    XDel: DelayNs,
    YS: OutputPin,
    YD: OutputPin,
    YE: OutputPin,
    YDel: DelayNs,
    ZS: OutputPin,
    ZD: OutputPin,
    ZE: OutputPin,
    ZDel: DelayNs,
    ES: OutputPin,
    ED: OutputPin,
    EE: OutputPin,
    EDel: DelayNs,
{
    fn set_direction(&mut self, axis: Axis, direction: Direction) -> Result<(), StepError> {
        dispatch_axis!(self, axis, set_direction, direction)
    }

    fn step(&mut self, axis: Axis) -> Result<(), StepError> {
        dispatch_axis!(self, axis, step)
    }

    fn set_enabled(&mut self, axis: Axis, enabled: bool) -> Result<(), StepError> {
        dispatch_axis!(self, axis, set_enabled, enabled)
    }
}
