//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Shared state
//!
//! [`MockTimer`] and [`MockGpio`] hand out clones that share their state, so a
//! test can keep a probe on a pin or on the clock after moving the original
//! into a driver.

#![cfg(any(test, feature = "mock"))]

mod flash;
mod gpio;
mod timer;

pub use flash::MockFlash;
pub use gpio::MockGpio;
pub use timer::{MockClock, MockTimer};
