//! Frame transmitter abstraction
//!
//! The state machine hands each encoded frame to a [`FrameTransmitter`]. The
//! firmware crate implements it on top of the emitter GPIO and a microsecond
//! timer; [`MockTransmitter`] is available for host tests.

use crate::protocol::Frame;
use core::fmt;

/// Outcome of the self-sense window after a transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationResult {
    /// Self-sense input was observed active inside the window
    pub confirmed: bool,
    /// Time of the detection, or of the window close when not confirmed (µs)
    pub timestamp_us: u64,
}

impl ConfirmationResult {
    /// Detection at `timestamp_us`
    pub fn confirmed_at(timestamp_us: u64) -> Self {
        Self {
            confirmed: true,
            timestamp_us,
        }
    }

    /// Window closed at `timestamp_us` without detection
    pub fn not_confirmed(timestamp_us: u64) -> Self {
        Self {
            confirmed: false,
            timestamp_us,
        }
    }
}

/// Hardware faults during a transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitError {
    /// Emitter output line could not be driven
    Output,
    /// Delay timer failed
    Timer,
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmitError::Output => write!(f, "emitter output fault"),
            TransmitError::Timer => write!(f, "transmit timer fault"),
        }
    }
}

/// Blocking frame transmitter
///
/// `transmit` must send the whole frame and run the confirmation window
/// before returning; it is never interrupted by the control cycle.
pub trait FrameTransmitter {
    /// Send `frame` and sample the self-sense window
    fn transmit(&mut self, frame: &Frame) -> Result<ConfirmationResult, TransmitError>;
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Transmitter recording what it was asked to send
///
/// Returns a scripted confirmation outcome and advances its own clock by a
/// fixed frame duration on every call.
#[derive(Debug, Clone, Default)]
pub struct MockTransmitter {
    /// Number of frames sent
    pub sent: u32,
    /// Last frame sent
    pub last_frame: Option<Frame>,
    /// Outcome reported for the next transmissions
    pub confirm: bool,
    /// Fault reported instead of a result
    pub fault: Option<TransmitError>,
    clock_us: u64,
}

impl MockTransmitter {
    /// Mock confirming every frame
    pub fn confirming() -> Self {
        Self {
            confirm: true,
            ..Self::default()
        }
    }

    /// Mock never confirming
    pub fn silent() -> Self {
        Self::default()
    }

    /// Mock failing every transmission with `fault`
    pub fn failing(fault: TransmitError) -> Self {
        Self {
            fault: Some(fault),
            ..Self::default()
        }
    }
}

impl FrameTransmitter for MockTransmitter {
    fn transmit(&mut self, frame: &Frame) -> Result<ConfirmationResult, TransmitError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        self.sent += 1;
        self.last_frame = Some(*frame);
        self.clock_us += 5_500;

        Ok(if self.confirm {
            ConfirmationResult::confirmed_at(self.clock_us)
        } else {
            ConfirmationResult::not_confirmed(self.clock_us + 12_000)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FrameEncoder, ProtocolRegistry, Side};

    fn frame() -> Frame {
        let registry = ProtocolRegistry::builtin();
        FrameEncoder::default().encode(registry.get(0).unwrap(), Side::Blufor)
    }

    #[test]
    fn mock_records_frames() {
        let mut tx = MockTransmitter::confirming();
        let result = tx.transmit(&frame()).unwrap();
        assert!(result.confirmed);
        assert_eq!(tx.sent, 1);
        assert_eq!(tx.last_frame, Some(frame()));
    }

    #[test]
    fn mock_silent_reports_not_confirmed() {
        let mut tx = MockTransmitter::silent();
        assert!(!tx.transmit(&frame()).unwrap().confirmed);
    }

    #[test]
    fn mock_failing_sends_nothing() {
        let mut tx = MockTransmitter::failing(TransmitError::Output);
        assert_eq!(tx.transmit(&frame()), Err(TransmitError::Output));
        assert_eq!(tx.sent, 0);
    }
}
