//! Mock GPIO implementation for testing

use super::timer::MockClock;
use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{GpioInterface, GpioMode},
    Result,
};
use core::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

/// Mock GPIO implementation
///
/// Clones share the pin: a test keeps one clone to drive an input or to
/// inspect an output after handing the other to a driver.
#[derive(Debug, Clone)]
pub struct MockGpio {
    level: Rc<Cell<bool>>,
    mode: GpioMode,
    clock: Option<MockClock>,
    window: Rc<Cell<Option<(u64, u64)>>>,
    edges: Rc<RefCell<Vec<(u64, bool)>>>,
    /// Make every write fail
    fail_writes: Rc<Cell<bool>>,
}

impl MockGpio {
    fn with_mode(mode: GpioMode) -> Self {
        Self {
            level: Rc::new(Cell::new(false)),
            mode,
            clock: None,
            window: Rc::new(Cell::new(None)),
            edges: Rc::new(RefCell::new(Vec::new())),
            fail_writes: Rc::new(Cell::new(false)),
        }
    }

    /// Create a new mock GPIO in output mode (low)
    pub fn new_output() -> Self {
        Self::with_mode(GpioMode::OutputPushPull)
    }

    /// Create a new mock GPIO in input mode (low)
    pub fn new_input() -> Self {
        Self::with_mode(GpioMode::Input)
    }

    /// Timestamp writes and scheduled input windows with `clock`
    pub fn with_clock(mut self, clock: MockClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the input level (simulating an external signal)
    pub fn set_input_state(&self, high: bool) {
        self.level.set(high);
    }

    /// Read high while the clock is inside `[start_us, end_us)`
    ///
    /// Requires [`MockGpio::with_clock`]; outside the window the static
    /// level applies.
    pub fn set_high_window(&self, start_us: u64, end_us: u64) {
        self.window.set(Some((start_us, end_us)));
    }

    /// Make writes fail with a hardware error
    pub fn set_write_failure(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Level changes written so far as `(time_us, level)`
    ///
    /// Time is 0 when no clock is attached.
    pub fn edges(&self) -> Vec<(u64, bool)> {
        self.edges.borrow().clone()
    }

    /// Number of low → high transitions written
    pub fn rising_edges(&self) -> usize {
        self.edges.borrow().iter().filter(|(_, high)| *high).count()
    }

    fn write(&mut self, high: bool) -> Result<()> {
        if !self.mode.is_output() {
            return Err(PlatformError::Gpio(GpioError::InvalidMode));
        }
        if self.fail_writes.get() {
            return Err(PlatformError::Gpio(GpioError::HardwareError));
        }
        if self.level.get() != high {
            let now = self.clock.as_ref().map_or(0, |c| c.now_us());
            self.edges.borrow_mut().push((now, high));
        }
        self.level.set(high);
        Ok(())
    }
}

impl GpioInterface for MockGpio {
    fn set_high(&mut self) -> Result<()> {
        self.write(true)
    }

    fn set_low(&mut self) -> Result<()> {
        self.write(false)
    }

    fn read(&self) -> bool {
        if let (Some(clock), Some((start, end))) = (&self.clock, self.window.get()) {
            let now = clock.now_us();
            if (start..end).contains(&now) {
                return true;
            }
        }
        self.level.get()
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
