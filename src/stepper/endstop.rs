//! Hardware endstop inputs.
//!
//! Endstops are read by the firmware layer and handed to the interpolator as
//! a [`EndstopSnapshot`] per tick; polarity (pull-up wiring, inversion) is
//! resolved here so the motion core only ever sees logical "triggered".

use embedded_hal::digital::InputPin;

use crate::config::{Axis, EndstopSettings};
use crate::error::StepError;

/// One endstop switch with its electrical sense.
pub struct Endstop<PIN: InputPin> {
    pin: PIN,
    inverting: bool,
}

impl<PIN: InputPin> Endstop<PIN> {
    /// Wrap an input pin. With `pullups` wiring (switch to ground), an
    /// untriggered switch reads high, so the electrical sense is inverted
    /// unless the configuration says otherwise.
    pub fn new(pin: PIN, settings: &EndstopSettings) -> Self {
        Self {
            pin,
            // Pull-up wiring reads low when the switch closes; `inverting`
            // flips that for normally-closed switches.
            inverting: settings.pullups != settings.inverting,
        }
    }

    /// Whether the switch is asserted, polarity resolved.
    pub fn is_triggered(&mut self) -> Result<bool, StepError> {
        let level = self.pin.is_high().map_err(|_| StepError::PinError)?;
        Ok(level != self.inverting)
    }

    /// Release the underlying pin.
    pub fn release(self) -> PIN {
        self.pin
    }
}

/// Logical endstop state for the three motion axes (X, Y, Z), sampled once
/// per interpolator tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndstopSnapshot {
    /// Triggered flags in axis order X, Y, Z.
    pub triggered: [bool; 3],
}

impl EndstopSnapshot {
    /// No endstop asserted.
    pub const CLEAR: Self = Self {
        triggered: [false; 3],
    };

    /// Whether the endstop for `axis` is asserted (always false for E).
    #[inline]
    pub fn is_triggered(&self, axis: Axis) -> bool {
        match axis {
            Axis::X | Axis::Y | Axis::Z => self.triggered[axis.index()],
            Axis::E => false,
        }
    }
}

/// Read the three motion-axis endstops into a snapshot.
pub fn read_endstops<X, Y, Z>(
    x: &mut Endstop<X>,
    y: &mut Endstop<Y>,
    z: &mut Endstop<Z>,
) -> Result<EndstopSnapshot, StepError>
where
    X: InputPin,
    Y: InputPin,
    Z: InputPin,
{
    Ok(EndstopSnapshot {
        triggered: [x.is_triggered()?, y.is_triggered()?, z.is_triggered()?],
    })
}
