//! Mock Timer implementation for testing

use crate::platform::{error::TimerError, traits::TimerInterface, Result};
use core::cell::Cell;
use std::rc::Rc;

/// Simulated monotonic clock shared between mocks
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now_us: Rc<Cell<u64>>,
}

impl MockClock {
    /// Clock starting at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now_us(&self) -> u64 {
        self.now_us.get()
    }

    /// Jump to `us`
    pub fn set(&self, us: u64) {
        self.now_us.set(us);
    }

    /// Move forward by `us`
    pub fn advance(&self, us: u64) {
        self.now_us.set(self.now_us.get().wrapping_add(us));
    }
}

/// Mock Timer implementation
///
/// Delays advance the simulated clock instead of sleeping. With
/// `auto_advance_us` set, every `now_us` read also advances the clock so
/// that polling loops waiting on a deadline terminate.
#[derive(Debug, Clone, Default)]
pub struct MockTimer {
    clock: MockClock,
    auto_advance_us: u64,
    /// Make every delay fail
    pub fail_delays: bool,
    delays: Rc<Cell<u32>>,
}

impl MockTimer {
    /// Create a new mock timer at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Timer advancing by `step_us` on every clock read
    pub fn auto_advancing(step_us: u64) -> Self {
        Self {
            auto_advance_us: step_us,
            ..Self::default()
        }
    }

    /// Timer driven by an existing clock
    pub fn with_clock(mut self, clock: MockClock) -> Self {
        self.clock = clock;
        self
    }

    /// Handle on the simulated clock
    pub fn clock(&self) -> MockClock {
        self.clock.clone()
    }

    /// Number of successful delay calls
    pub fn delay_count(&self) -> u32 {
        self.delays.get()
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        if self.fail_delays {
            return Err(TimerError::InvalidDuration.into());
        }
        self.clock.advance(us as u64);
        self.delays.set(self.delays.get() + 1);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    fn now_us(&self) -> u64 {
        let now = self.clock.now_us();
        self.clock.advance(self.auto_advance_us);
        now
    }
}
