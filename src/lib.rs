#![cfg_attr(not(test), no_std)]

//! miles_drop - MILES IR drop controller for Raspberry Pi Pico 2 W
//!
//! Firmware library around `miles_drop_core`: platform abstraction, device
//! drivers, flash-backed parameters and the 5 ms control loop.

#[cfg(all(feature = "mock", not(test)))]
extern crate std;

// Platform abstraction layer (GPIO, timer, flash)
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Flash parameter storage
pub mod parameters;

// Logging and control loop
pub mod core;
