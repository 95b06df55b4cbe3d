//! RP2350 GPIO implementation

use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{GpioInterface, GpioMode},
    Result,
};
use embassy_rp::gpio::{Input, Output, Pull};

/// Push-pull output pin
pub struct Rp2350Output<'d> {
    pin: Output<'d>,
}

impl<'d> Rp2350Output<'d> {
    /// Wrap an Embassy output (should be created at the idle level)
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl GpioInterface for Rp2350Output<'_> {
    fn set_high(&mut self) -> Result<()> {
        self.pin.set_high();
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        self.pin.set_low();
        Ok(())
    }

    fn read(&self) -> bool {
        self.pin.is_set_high()
    }

    fn mode(&self) -> GpioMode {
        GpioMode::OutputPushPull
    }
}

/// Input pin
pub struct Rp2350Input<'d> {
    pin: Input<'d>,
    mode: GpioMode,
}

impl<'d> Rp2350Input<'d> {
    /// Wrap an Embassy input configured with `pull`
    pub fn new(pin: Input<'d>, pull: Pull) -> Self {
        let mode = match pull {
            Pull::Up => GpioMode::InputPullUp,
            Pull::Down => GpioMode::InputPullDown,
            Pull::None => GpioMode::Input,
        };
        Self { pin, mode }
    }
}

impl GpioInterface for Rp2350Input<'_> {
    fn set_high(&mut self) -> Result<()> {
        Err(PlatformError::Gpio(GpioError::InvalidMode))
    }

    fn set_low(&mut self) -> Result<()> {
        Err(PlatformError::Gpio(GpioError::InvalidMode))
    }

    fn read(&self) -> bool {
        self.pin.is_high()
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
