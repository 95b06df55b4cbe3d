//! RP2350 Timer implementation
//!
//! Backed by the Embassy time driver (64-bit microsecond timer).

use crate::platform::{traits::TimerInterface, Result};
use embassy_time::{block_for, Duration, Instant};

/// RP2350 Timer implementation
///
/// Delays busy-wait on the time driver so bit timing is never stretched by
/// the executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rp2350Timer;

impl Rp2350Timer {
    /// Create a timer (the time driver is started by `embassy_rp::init`)
    pub fn new() -> Self {
        Self
    }
}

impl TimerInterface for Rp2350Timer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        block_for(Duration::from_micros(us as u64));
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        block_for(Duration::from_millis(ms as u64));
        Ok(())
    }

    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}
