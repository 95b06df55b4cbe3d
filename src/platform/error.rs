//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// GPIO operation failed
    Gpio(GpioError),
    /// Timer operation failed
    Timer(TimerError),
    /// Flash operation failed
    Flash(FlashError),
    /// Platform initialization failed
    InitializationFailed,
    /// Invalid configuration provided
    InvalidConfig,
}

/// GPIO-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Invalid mode for operation
    InvalidMode,
    /// Pin could not be driven
    HardwareError,
}

/// Timer-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Timer overflow
    Overflow,
    /// Invalid duration
    InvalidDuration,
}

/// Flash-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Erase operation failed
    EraseFailed,
    /// Write operation failed
    WriteFailed,
    /// Read operation failed
    ReadFailed,
    /// Invalid address (out of bounds, firmware region or misaligned)
    InvalidAddress,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Gpio(e) => write!(f, "GPIO error: {:?}", e),
            PlatformError::Timer(e) => write!(f, "Timer error: {:?}", e),
            PlatformError::Flash(e) => write!(f, "Flash error: {:?}", e),
            PlatformError::InitializationFailed => write!(f, "Platform initialization failed"),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

impl From<GpioError> for PlatformError {
    fn from(error: GpioError) -> Self {
        PlatformError::Gpio(error)
    }
}

impl From<TimerError> for PlatformError {
    fn from(error: TimerError) -> Self {
        PlatformError::Timer(error)
    }
}

impl From<FlashError> for PlatformError {
    fn from(error: FlashError) -> Self {
        PlatformError::Flash(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_display() {
        assert_eq!(
            format!("{}", PlatformError::from(FlashError::InvalidAddress)),
            "Flash error: InvalidAddress"
        );
        assert_eq!(
            format!("{}", PlatformError::InitializationFailed),
            "Platform initialization failed"
        );
    }
}
