//! Firmware core
//!
//! Logging macros and the control loop that ties the platform, the devices
//! and the `miles_drop_core` state machine together.

pub mod control;
pub mod logging;
