//! Timer interface trait

use crate::platform::Result;

/// Timer interface trait
///
/// Microsecond delays for bit timing and a monotonic clock for the control
/// loop and the confirmation window.
///
/// # Safety Invariants
///
/// - Microsecond-level precision required
/// - Monotonic time source (never goes backwards)
pub trait TimerInterface {
    /// Block for at least `us` microseconds
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Block for at least `ms` milliseconds
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_ms(&mut self, ms: u32) -> Result<()>;

    /// Monotonic timestamp in microseconds since platform initialization
    fn now_us(&self) -> u64;

    /// Monotonic timestamp in milliseconds since platform initialization
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
