//! GPIO interface trait

use crate::platform::Result;

/// GPIO pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioMode {
    /// Input mode (high impedance)
    Input,
    /// Input mode with pull-up resistor
    InputPullUp,
    /// Input mode with pull-down resistor
    InputPullDown,
    /// Output mode (push-pull)
    OutputPushPull,
}

impl GpioMode {
    /// True for the output modes
    pub fn is_output(self) -> bool {
        matches!(self, GpioMode::OutputPushPull)
    }
}

/// GPIO interface trait
///
/// Used for the emitter line (output) and for the buttons, limit switch,
/// altitude and self-sense lines (inputs). Levels are raw electrical levels;
/// polarity is applied by the caller.
///
/// # Safety Invariants
///
/// - Only one owner per GPIO pin instance
/// - No concurrent access to the same GPIO pin from multiple contexts
pub trait GpioInterface {
    /// Set GPIO pin high (logic level 1)
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::InvalidMode)` if the pin
    /// is not configured as an output.
    fn set_high(&mut self) -> Result<()>;

    /// Set GPIO pin low (logic level 0)
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::InvalidMode)` if the pin
    /// is not configured as an output.
    fn set_low(&mut self) -> Result<()>;

    /// Read GPIO pin state
    ///
    /// Returns `true` if the pin is high. Valid in both input and output modes.
    fn read(&self) -> bool;

    /// Current pin mode
    fn mode(&self) -> GpioMode;
}
