//! RP2350 platform implementation (Raspberry Pi Pico 2 W)
//!
//! Thin wrappers over `embassy-rp` peripherals implementing the platform
//! traits. All operations are blocking; the control loop is the only caller.

mod flash;
mod gpio;
mod timer;

pub use flash::{Rp2350Flash, FLASH_SIZE};
pub use gpio::{Rp2350Input, Rp2350Output};
pub use timer::Rp2350Timer;
