//! Platform abstraction layer
//!
//! Hardware access for the drop controller. Everything above this module
//! talks to GPIO, timers and flash through the traits in [`traits`].

pub mod error;
pub mod traits;

// Platform implementations (feature-gated)
#[cfg(feature = "pico2_w")]
pub mod rp2350;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{FlashInterface, GpioInterface, GpioMode, TimerInterface};
