//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod flash;
pub mod gpio;
pub mod timer;

// Re-export trait interfaces
pub use flash::FlashInterface;
pub use gpio::{GpioInterface, GpioMode};
pub use timer::TimerInterface;
