//! IR emitter driver
//!
//! Sends a frame bit by bit on the emitter line, then watches the self-sense
//! input for a short confirmation window.
//!
//! # Frame timing
//!
//! ```text
//!          lead-in   bin 0 (1)        bin 1 (0)        bin 2 (1)
//! line  ___________|‾‾‾‾‾‾‾|________|________________|‾‾‾‾‾‾‾|________ ...
//!                  <pulse ><        bin             >
//! ```
//!
//! After the last bin the line is forced idle and the self-sense input is
//! polled without sleeping until it reads active or the window closes.

use crate::platform::{GpioInterface, PlatformError, TimerInterface};
use core::fmt;
use miles_drop_core::protocol::Frame;
use miles_drop_core::traits::{ConfirmationResult, FrameTransmitter, TransmitError};

/// Idle time before the first bin (µs)
pub const LEAD_IN_US: u32 = 10;

/// Default bin duration (µs)
pub const DEFAULT_BIN_US: u32 = 500;

/// Default pulse width (µs)
pub const DEFAULT_PULSE_US: u32 = 250;

/// Default confirmation window (ms)
pub const DEFAULT_CONFIRM_MS: u32 = 12;

/// Rejected emitter calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// Bin duration is zero
    ZeroBin,
    /// Pulse width is zero
    ZeroPulse,
    /// Pulse does not fit in its bin
    PulseExceedsBin {
        /// Pulse width (µs)
        pulse_us: u32,
        /// Bin duration (µs)
        bin_us: u32,
    },
    /// Confirmation window is zero
    ZeroWindow,
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingError::ZeroBin => write!(f, "bin duration must be non-zero"),
            TimingError::ZeroPulse => write!(f, "pulse width must be non-zero"),
            TimingError::PulseExceedsBin { pulse_us, bin_us } => {
                write!(f, "pulse {} us exceeds bin {} us", pulse_us, bin_us)
            }
            TimingError::ZeroWindow => write!(f, "confirmation window must be non-zero"),
        }
    }
}

/// Validated emitter timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterTiming {
    bin_us: u32,
    pulse_us: u32,
    confirm_window_us: u32,
}

impl EmitterTiming {
    /// 500 µs bins, 250 µs pulses, 12 ms window
    pub const DEFAULT: Self = Self {
        bin_us: DEFAULT_BIN_US,
        pulse_us: DEFAULT_PULSE_US,
        confirm_window_us: DEFAULT_CONFIRM_MS * 1000,
    };

    /// Validate a calibration
    pub fn new(bin_us: u32, pulse_us: u32, confirm_ms: u32) -> Result<Self, TimingError> {
        if bin_us == 0 {
            return Err(TimingError::ZeroBin);
        }
        if pulse_us == 0 {
            return Err(TimingError::ZeroPulse);
        }
        if pulse_us > bin_us {
            return Err(TimingError::PulseExceedsBin { pulse_us, bin_us });
        }
        if confirm_ms == 0 {
            return Err(TimingError::ZeroWindow);
        }
        Ok(Self {
            bin_us,
            pulse_us,
            confirm_window_us: confirm_ms.saturating_mul(1000),
        })
    }

    /// Bin duration (µs)
    pub fn bin_us(&self) -> u32 {
        self.bin_us
    }

    /// Pulse width (µs)
    pub fn pulse_us(&self) -> u32 {
        self.pulse_us
    }

    /// Confirmation window (µs)
    pub fn confirm_window_us(&self) -> u32 {
        self.confirm_window_us
    }

    /// Emission time for `bits` bins including the lead-in (µs)
    pub fn frame_duration_us(&self, bits: usize) -> u64 {
        LEAD_IN_US as u64 + bits as u64 * self.bin_us as u64
    }
}

impl Default for EmitterTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// IR emitter with self-sense confirmation
///
/// `O` drives the emitter (high = emitting), `S` is the self-sense input and
/// `T` provides bit delays and the confirmation clock.
pub struct IrEmitter<O, S, T>
where
    O: GpioInterface,
    S: GpioInterface,
    T: TimerInterface,
{
    output: O,
    sense: S,
    timer: T,
    timing: EmitterTiming,
    sense_active_low: bool,
}

impl<O, S, T> IrEmitter<O, S, T>
where
    O: GpioInterface,
    S: GpioInterface,
    T: TimerInterface,
{
    /// Create an emitter; the line is driven idle immediately
    pub fn new(
        mut output: O,
        sense: S,
        timer: T,
        timing: EmitterTiming,
        sense_active_low: bool,
    ) -> Self {
        if output.set_low().is_err() {
            crate::log_warn!("Emitter line could not be forced idle");
        }
        Self {
            output,
            sense,
            timer,
            timing,
            sense_active_low,
        }
    }

    /// Active timing
    pub fn timing(&self) -> &EmitterTiming {
        &self.timing
    }

    /// Self-sense reads active
    pub fn sense_active(&self) -> bool {
        self.sense.read() != self.sense_active_low
    }

    fn emit(&mut self, frame: &Frame) -> Result<(), TransmitError> {
        let bin = self.timing.bin_us;
        let pulse = self.timing.pulse_us;

        self.output.set_low().map_err(transmit_fault)?;
        self.timer.delay_us(LEAD_IN_US).map_err(transmit_fault)?;

        for &bit in frame.bits() {
            if bit == 1 {
                self.output.set_high().map_err(transmit_fault)?;
                self.timer.delay_us(pulse).map_err(transmit_fault)?;
                self.output.set_low().map_err(transmit_fault)?;
                if bin > pulse {
                    self.timer.delay_us(bin - pulse).map_err(transmit_fault)?;
                }
            } else {
                self.timer.delay_us(bin).map_err(transmit_fault)?;
            }
        }
        Ok(())
    }

    fn confirm(&mut self) -> ConfirmationResult {
        let window = self.timing.confirm_window_us as u64;
        let opened = self.timer.now_us();

        loop {
            let active = self.sense_active();
            let now = self.timer.now_us();
            if active {
                return ConfirmationResult::confirmed_at(now);
            }
            if now.saturating_sub(opened) >= window {
                return ConfirmationResult::not_confirmed(now);
            }
        }
    }
}

impl<O, S, T> FrameTransmitter for IrEmitter<O, S, T>
where
    O: GpioInterface,
    S: GpioInterface,
    T: TimerInterface,
{
    fn transmit(&mut self, frame: &Frame) -> Result<ConfirmationResult, TransmitError> {
        let emitted = self.emit(frame);
        let idle = self.output.set_low().map_err(transmit_fault);
        emitted?;
        idle?;
        Ok(self.confirm())
    }
}

fn transmit_fault(e: PlatformError) -> TransmitError {
    match e {
        PlatformError::Timer(_) => TransmitError::Timer,
        _ => TransmitError::Output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockGpio, MockTimer};
    use miles_drop_core::protocol::{FrameEncoder, ProtocolRegistry, Side};

    fn frame(id: u8, side: Side) -> Frame {
        let registry = ProtocolRegistry::builtin();
        FrameEncoder::default().encode(registry.get(id).unwrap(), side)
    }

    struct Rig {
        output: MockGpio,
        sense: MockGpio,
        timer: MockTimer,
        emitter: IrEmitter<MockGpio, MockGpio, MockTimer>,
    }

    fn rig(timer: MockTimer, sense_active_low: bool) -> Rig {
        let output = MockGpio::new_output().with_clock(timer.clock());
        let sense = MockGpio::new_input().with_clock(timer.clock());
        let emitter = IrEmitter::new(
            output.clone(),
            sense.clone(),
            timer.clone(),
            EmitterTiming::DEFAULT,
            sense_active_low,
        );
        Rig {
            output,
            sense,
            timer,
            emitter,
        }
    }

    #[test]
    fn test_bit_timing() {
        let mut r = rig(MockTimer::new(), false);
        // Static active sense ends the window on the first sample
        r.sense.set_input_state(true);

        let f = frame(0, Side::Blufor);
        r.emitter.transmit(&f).unwrap();

        let mut expected = Vec::new();
        for (i, &bit) in f.bits().iter().enumerate() {
            if bit == 1 {
                let start = LEAD_IN_US as u64 + i as u64 * 500;
                expected.push((start, true));
                expected.push((start + 250, false));
            }
        }
        assert_eq!(r.output.edges(), expected);
        assert_eq!(r.timer.clock().now_us(), 10 + 11 * 500);
        assert!(!r.output.read());
    }

    #[test]
    fn test_confirmed_at_first_active_sample() {
        let mut r = rig(MockTimer::new(), false);
        r.sense.set_input_state(true);

        let result = r.emitter.transmit(&frame(1, Side::Opfor)).unwrap();
        assert!(result.confirmed);
        assert_eq!(result.timestamp_us, 5_510);
    }

    #[test]
    fn test_not_confirmed_when_sense_silent() {
        let mut r = rig(MockTimer::auto_advancing(1), false);

        let result = r.emitter.transmit(&frame(0, Side::Blufor)).unwrap();
        assert!(!result.confirmed);
        assert!(result.timestamp_us >= 5_510 + 12_000);
    }

    #[test]
    fn test_sense_during_emission_does_not_confirm() {
        let mut r = rig(MockTimer::auto_advancing(1), false);
        r.sense.set_high_window(100, 5_000);

        let result = r.emitter.transmit(&frame(0, Side::Blufor)).unwrap();
        assert!(!result.confirmed);
    }

    #[test]
    fn test_sense_inside_window_confirms() {
        let mut r = rig(MockTimer::auto_advancing(1), false);
        r.sense.set_high_window(8_000, 8_100);

        let result = r.emitter.transmit(&frame(2, Side::Blufor)).unwrap();
        assert!(result.confirmed);
        assert!((8_000..8_100).contains(&result.timestamp_us));
    }

    #[test]
    fn test_sense_after_window_does_not_confirm() {
        let mut r = rig(MockTimer::auto_advancing(1), false);
        r.sense.set_high_window(5_510 + 13_000, 40_000);

        let result = r.emitter.transmit(&frame(0, Side::Blufor)).unwrap();
        assert!(!result.confirmed);
    }

    #[test]
    fn test_active_low_sense() {
        let mut r = rig(MockTimer::new(), true);
        r.sense.set_input_state(false);
        assert!(r.emitter.sense_active());

        let result = r.emitter.transmit(&frame(0, Side::Blufor)).unwrap();
        assert!(result.confirmed);
    }

    #[test]
    fn test_output_fault() {
        let mut r = rig(MockTimer::new(), false);
        r.output.set_write_failure(true);

        assert_eq!(
            r.emitter.transmit(&frame(0, Side::Blufor)),
            Err(TransmitError::Output)
        );
    }

    #[test]
    fn test_timer_fault_leaves_line_idle() {
        let mut timer = MockTimer::new();
        timer.fail_delays = true;
        let mut r = rig(timer, false);

        assert_eq!(
            r.emitter.transmit(&frame(0, Side::Blufor)),
            Err(TransmitError::Timer)
        );
        assert!(!r.output.read());
    }

    #[test]
    fn test_timing_validation() {
        assert_eq!(EmitterTiming::new(0, 0, 12), Err(TimingError::ZeroBin));
        assert_eq!(EmitterTiming::new(500, 0, 12), Err(TimingError::ZeroPulse));
        assert_eq!(
            EmitterTiming::new(500, 600, 12),
            Err(TimingError::PulseExceedsBin {
                pulse_us: 600,
                bin_us: 500
            })
        );
        assert_eq!(EmitterTiming::new(500, 250, 0), Err(TimingError::ZeroWindow));

        let timing = EmitterTiming::new(400, 400, 20).unwrap();
        assert_eq!(timing.confirm_window_us(), 20_000);
        assert_eq!(timing.frame_duration_us(11), 10 + 11 * 400);
    }

    #[test]
    fn test_default_timing() {
        assert_eq!(EmitterTiming::default(), EmitterTiming::new(500, 250, 12).unwrap());
    }
}
