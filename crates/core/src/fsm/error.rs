//! Fire sequence errors

use crate::traits::TransmitError;
use core::fmt;

/// Errors raised while executing the fire transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireError {
    /// Selected protocol is not in the registry; nothing was transmitted and
    /// the machine stays in ARMED_IR_FLASH
    UnknownProtocol {
        /// Selected id
        id: u8,
    },
    /// Transmitter faulted mid-frame; the shot is counted and the machine
    /// moves on to EXPENDED
    Transmit(TransmitError),
}

impl fmt::Display for FireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireError::UnknownProtocol { id } => {
                write!(f, "Fire aborted: protocol {} not in registry", id)
            }
            FireError::Transmit(e) => write!(f, "Transmission fault: {}", e),
        }
    }
}

impl From<TransmitError> for FireError {
    fn from(e: TransmitError) -> Self {
        FireError::Transmit(e)
    }
}
