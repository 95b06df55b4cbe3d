//! Button and sensor sampling

use crate::platform::GpioInterface;
use miles_drop_core::fsm::SensorInputs;
use miles_drop_core::input::ButtonLevels;

/// Which inputs are wired active-low
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPolarity {
    /// All four buttons (pull-up wiring)
    pub buttons_active_low: bool,
    /// Carrier limit switch
    pub limit_active_low: bool,
    /// Altitude sensor output
    pub altitude_active_low: bool,
}

impl Default for InputPolarity {
    fn default() -> Self {
        Self {
            buttons_active_low: true,
            limit_active_low: false,
            altitude_active_low: false,
        }
    }
}

/// Input lines sampled every control cycle
pub struct InputPins<P: GpioInterface> {
    /// Power / arm button
    pub power: P,
    /// Next-protocol button
    pub next: P,
    /// Side-toggle button
    pub side: P,
    /// Manual fire button
    pub fire: P,
    /// Carrier limit switch
    pub limit: P,
    /// Altitude threshold input
    pub altitude: P,
}

/// Polarity-corrected view of the input pins
pub struct InputBank<P: GpioInterface> {
    pins: InputPins<P>,
    polarity: InputPolarity,
}

impl<P: GpioInterface> InputBank<P> {
    /// Create a bank
    pub fn new(pins: InputPins<P>, polarity: InputPolarity) -> Self {
        Self { pins, polarity }
    }

    /// Active polarity
    pub fn polarity(&self) -> InputPolarity {
        self.polarity
    }

    /// Button levels, `true` = pressed
    pub fn buttons(&self) -> ButtonLevels {
        let low = self.polarity.buttons_active_low;
        ButtonLevels {
            power: active(&self.pins.power, low),
            next: active(&self.pins.next, low),
            side: active(&self.pins.side, low),
            fire: active(&self.pins.fire, low),
        }
    }

    /// Sensor levels
    pub fn sensors(&self) -> SensorInputs {
        SensorInputs {
            limit_pressed: active(&self.pins.limit, self.polarity.limit_active_low),
            altitude_reached: active(&self.pins.altitude, self.polarity.altitude_active_low),
        }
    }
}

fn active<P: GpioInterface>(pin: &P, active_low: bool) -> bool {
    pin.read() != active_low
}
